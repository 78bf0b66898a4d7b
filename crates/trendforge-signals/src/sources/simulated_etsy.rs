//! Simulated Etsy buyer-intent source.
//!
//! Heuristic scoring from known high-converting keyword patterns, seasonal
//! relevance, and product-type modifiers. No scraping, no network.

use async_trait::async_trait;
use trendforge_core::SourceReading;

use super::SignalSource;
use crate::error::SignalError;

pub const SOURCE_NAME: &str = "simulated_etsy";

/// Known high-converting keywords and their base buyer-intent scores.
const HOT_KEYWORDS: &[(&str, f64)] = &[
    ("daily planner", 90.0),
    ("budget tracker", 88.0),
    ("habit tracker", 85.0),
    ("weekly planner", 82.0),
    ("meal planner", 80.0),
    ("fitness tracker", 78.0),
    ("goal planner", 75.0),
    ("study planner", 73.0),
    ("digital stickers", 70.0),
    ("bullet journal", 68.0),
];

/// Per-month keyword modifiers that lift seasonal matches.
const SEASONAL_PATTERNS: &[(u32, &[&str])] = &[
    (1, &["new year", "goal", "resolution", "planner", "budget"]),
    (2, &["valentine", "love", "february"]),
    (3, &["spring", "cleaning", "declutter"]),
    (4, &["easter", "spring", "tax"]),
    (5, &["mother", "graduation", "spring"]),
    (6, &["summer", "wedding", "father"]),
    (7, &["summer", "vacation", "travel"]),
    (8, &["back to school", "student", "college"]),
    (9, &["fall", "autumn", "organization"]),
    (10, &["halloween", "fall", "october"]),
    (11, &["thanksgiving", "gratitude", "holiday prep"]),
    (12, &["christmas", "holiday", "gift", "new year prep"]),
];

pub(crate) fn seasonal_terms(month: u32) -> &'static [&'static str] {
    SEASONAL_PATTERNS
        .iter()
        .find(|(m, _)| *m == month)
        .map_or(&[], |(_, terms)| terms)
}

pub struct SimulatedEtsySource {
    seasonal: &'static [&'static str],
}

impl SimulatedEtsySource {
    #[must_use]
    pub fn new(month: u32) -> Self {
        Self {
            seasonal: seasonal_terms(month),
        }
    }

    fn base_score(keyword: &str) -> Option<f64> {
        HOT_KEYWORDS
            .iter()
            .find(|(hot, _)| keyword.contains(hot) || hot.contains(keyword))
            .map(|&(_, score)| score)
    }

    fn score(&self, keyword: &str) -> (f64, u32) {
        let (base, sample_size) = match Self::base_score(keyword) {
            Some(base) => (base, 36),
            // Unknown keywords get a bounded random estimate, like any
            // provider's noisy long tail.
            None => (rand::random_range(30.0..=60.0), 12),
        };

        let seasonal_multiplier = if self.seasonal.iter().any(|term| keyword.contains(term)) {
            1.2
        } else {
            1.0
        };

        let type_modifier = if ["template", "printable", "spreadsheet"]
            .iter()
            .any(|t| keyword.contains(t))
        {
            1.15
        } else if ["tracker", "planner", "journal"]
            .iter()
            .any(|t| keyword.contains(t))
        {
            1.1
        } else {
            1.0
        };

        let value = (base * seasonal_multiplier * type_modifier).min(100.0);
        (value, sample_size)
    }
}

#[async_trait]
impl SignalSource for SimulatedEtsySource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self, keyword: &str) -> Result<SourceReading, SignalError> {
        let (value, sample_size) = self.score(keyword);
        Ok(SourceReading {
            source: SOURCE_NAME.to_string(),
            value,
            baseline_min: 0.0,
            baseline_max: 100.0,
            sample_size,
        })
    }
}
