//! Domain model shared across the workspace.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Classification of a trend derived from `(score, velocity)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendCategory {
    Emerging,
    Spiking,
    Stable,
}

impl std::fmt::Display for TrendCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendCategory::Emerging => write!(f, "emerging"),
            TrendCategory::Spiking => write!(f, "spiking"),
            TrendCategory::Stable => write!(f, "stable"),
        }
    }
}

impl std::str::FromStr for TrendCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emerging" => Ok(TrendCategory::Emerging),
            "spiking" => Ok(TrendCategory::Spiking),
            "stable" => Ok(TrendCategory::Stable),
            other => Err(CoreError::InvalidCategory(other.to_string())),
        }
    }
}

/// Banded label backed by a `confidence_score` in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLabel::Low => write!(f, "low"),
            ConfidenceLabel::Medium => write!(f, "medium"),
            ConfidenceLabel::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for ConfidenceLabel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ConfidenceLabel::Low),
            "medium" => Ok(ConfidenceLabel::Medium),
            "high" => Ok(ConfidenceLabel::High),
            other => Err(CoreError::InvalidConfidence(other.to_string())),
        }
    }
}

/// Template family applied when a product draft is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Planner,
    Tracker,
    Generic,
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductKind::Planner => write!(f, "planner"),
            ProductKind::Tracker => write!(f, "tracker"),
            ProductKind::Generic => write!(f, "generic"),
        }
    }
}

impl std::str::FromStr for ProductKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planner" => Ok(ProductKind::Planner),
            "tracker" => Ok(ProductKind::Tracker),
            "generic" => Ok(ProductKind::Generic),
            other => Err(CoreError::InvalidKind(other.to_string())),
        }
    }
}

/// Product lifecycle status. Transitions are forward-only:
/// `Draft -> Published` or `Draft -> Failed`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Draft,
    Published,
    Failed,
}

impl ProductStatus {
    /// Whether `next` is a legal forward transition from `self`.
    #[must_use]
    pub fn can_transition_to(self, next: ProductStatus) -> bool {
        matches!(
            (self, next),
            (ProductStatus::Draft, ProductStatus::Published)
                | (ProductStatus::Draft, ProductStatus::Failed)
        )
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Draft => write!(f, "draft"),
            ProductStatus::Published => write!(f, "published"),
            ProductStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProductStatus::Draft),
            "published" => Ok(ProductStatus::Published),
            "failed" => Ok(ProductStatus::Failed),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

/// A marketplace/marketing platform the dispatcher can publish to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Etsy,
    Pinterest,
}

impl Platform {
    /// Parse an operator platform selection: `"etsy"`, `"pinterest"`, or
    /// `"both"`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPlatform`] for any other input.
    pub fn parse_selection(s: &str) -> Result<Vec<Platform>, CoreError> {
        match s {
            "etsy" => Ok(vec![Platform::Etsy]),
            "pinterest" => Ok(vec![Platform::Pinterest]),
            "both" => Ok(vec![Platform::Etsy, Platform::Pinterest]),
            other => Err(CoreError::InvalidPlatform(other.to_string())),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Etsy => write!(f, "etsy"),
            Platform::Pinterest => write!(f, "pinterest"),
        }
    }
}

/// One provider's raw metric for a keyword, with enough context to
/// normalize it against the provider's own historical range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReading {
    /// Source name, e.g. `simulated_etsy` or `search_interest`.
    pub source: String,
    /// Raw interest value as reported by the provider.
    pub value: f64,
    /// Lower bound of the provider's historical range.
    pub baseline_min: f64,
    /// Upper bound of the provider's historical range (provider ceiling).
    pub baseline_max: f64,
    /// Number of historical observations behind the baseline.
    pub sample_size: u32,
}

impl SourceReading {
    /// A reading normalized against the default 0-100 provider ceiling.
    #[must_use]
    pub fn new(source: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            value,
            baseline_min: 0.0,
            baseline_max: 100.0,
            sample_size: 1,
        }
    }
}
