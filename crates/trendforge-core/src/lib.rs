use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod keywords;
pub mod model;

pub use app_config::{AggregatorConfig, AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use keywords::{load_keywords, KeywordsFile};
pub use model::{
    ConfidenceLabel, Platform, ProductKind, ProductStatus, SourceReading, TrendCategory,
};

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read keywords file {path}: {source}")]
    KeywordsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse keywords file: {0}")]
    KeywordsFileParse(#[from] serde_yaml::Error),
    #[error("{0}")]
    Validation(String),
}

/// Errors produced by the core data model (enum parsing, reading validation).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid trend category: {0}")]
    InvalidCategory(String),
    #[error("invalid confidence label: {0}")]
    InvalidConfidence(String),
    #[error("invalid product status: {0}")]
    InvalidStatus(String),
    #[error("invalid product kind: {0}")]
    InvalidKind(String),
    #[error("invalid platform selection: {0}")]
    InvalidPlatform(String),
}
