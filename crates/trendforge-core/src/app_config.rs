use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Tunables for the aggregation/classification engine. All thresholds are
/// operator-facing configuration, not hard-wired constants.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Per-source weight overrides; unlisted sources weigh 1.0.
    pub source_weights: HashMap<String, f64>,
    /// Velocity above which a trend is classified `spiking` (percent).
    pub velocity_spike_pct: f64,
    /// Velocity below which a trend is considered collapsing (percent).
    pub velocity_collapse_pct: f64,
    /// Collapsing trends below this score are dropped instead of kept stable.
    pub collapse_score_floor: f64,
    /// Confidence score at or above which the label is `high`.
    pub confidence_high: f64,
    /// Confidence score at or above which the label is `medium`.
    pub confidence_medium: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            source_weights: HashMap::new(),
            velocity_spike_pct: 30.0,
            velocity_collapse_pct: -30.0,
            collapse_score_floor: 40.0,
            confidence_high: 0.75,
            confidence_medium: 0.45,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub log_level: String,
    pub keywords_path: PathBuf,
    pub aggregator: AggregatorConfig,
    pub source_timeout_secs: u64,
    pub collaborator_max_retries: u32,
    pub collaborator_backoff_base_ms: u64,
    pub search_interest_url: Option<String>,
    pub sheets_bridge_url: Option<String>,
    pub artifact_base_url: String,
    pub etsy_api_key: Option<String>,
    pub etsy_access_token: Option<String>,
    pub etsy_shop_id: Option<String>,
    pub etsy_price_cents: i64,
    pub pinterest_access_token: Option<String>,
    pub pinterest_board_id: Option<String>,
    pub publish_max_concurrency: usize,
    pub research_schedule: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("keywords_path", &self.keywords_path)
            .field("aggregator", &self.aggregator)
            .field("source_timeout_secs", &self.source_timeout_secs)
            .field("collaborator_max_retries", &self.collaborator_max_retries)
            .field(
                "collaborator_backoff_base_ms",
                &self.collaborator_backoff_base_ms,
            )
            .field("search_interest_url", &self.search_interest_url)
            .field("sheets_bridge_url", &self.sheets_bridge_url)
            .field("artifact_base_url", &self.artifact_base_url)
            .field(
                "etsy_api_key",
                &self.etsy_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "etsy_access_token",
                &self.etsy_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("etsy_shop_id", &self.etsy_shop_id)
            .field("etsy_price_cents", &self.etsy_price_cents)
            .field(
                "pinterest_access_token",
                &self.pinterest_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("pinterest_board_id", &self.pinterest_board_id)
            .field("publish_max_concurrency", &self.publish_max_concurrency)
            .field("research_schedule", &self.research_schedule)
            .finish()
    }
}
