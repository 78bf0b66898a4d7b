//! Simulated Pinterest search-growth source.
//!
//! Category alignment plus an aesthetic-term bonus; visual platforms favor
//! those keywords heavily.

use async_trait::async_trait;
use trendforge_core::SourceReading;

use super::simulated_etsy::seasonal_terms;
use super::SignalSource;
use crate::error::SignalError;

pub const SOURCE_NAME: &str = "simulated_pinterest";

/// Trending category base scores.
const CATEGORIES: &[(&str, f64)] = &[
    ("productivity", 85.0),
    ("organization", 82.0),
    ("minimalist", 78.0),
    ("aesthetic", 75.0),
    ("self care", 72.0),
    ("wellness", 70.0),
];

const AESTHETIC_TERMS: &[&str] = &["minimalist", "aesthetic", "cute", "boho", "modern", "pastel"];

pub struct SimulatedPinterestSource {
    seasonal: &'static [&'static str],
}

impl SimulatedPinterestSource {
    #[must_use]
    pub fn new(month: u32) -> Self {
        Self {
            seasonal: seasonal_terms(month),
        }
    }

    fn score(&self, keyword: &str) -> (f64, u32) {
        let category_base = CATEGORIES
            .iter()
            .filter(|(category, _)| keyword.contains(category))
            .map(|&(_, score)| score)
            .fold(0.0_f64, f64::max);

        let (base, sample_size) = if category_base > 0.0 {
            (category_base, 30)
        } else {
            (rand::random_range(35.0..=65.0), 10)
        };

        let aesthetic_bonus = if AESTHETIC_TERMS.iter().any(|t| keyword.contains(t)) {
            15.0
        } else {
            0.0
        };

        let seasonal_multiplier = if self.seasonal.iter().any(|term| keyword.contains(term)) {
            1.15
        } else {
            1.0
        };

        let value = ((base + aesthetic_bonus) * seasonal_multiplier).min(100.0);
        (value, sample_size)
    }
}

#[async_trait]
impl SignalSource for SimulatedPinterestSource {
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
