//! Signal source abstractions.
//!
//! Each source yields one raw per-keyword reading; collection continues
//! past individual source failures and timeouts so a single hung provider
//! never stalls a research run.

mod search_interest;
mod simulated_etsy;
mod simulated_pinterest;

pub use search_interest::SearchInterestSource;
pub use simulated_etsy::SimulatedEtsySource;
pub use simulated_pinterest::SimulatedPinterestSource;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use trendforge_core::{AppConfig, SourceReading};

use crate::error::SignalError;
use crate::retry::retry_with_backoff;

/// A provider of raw per-keyword trend metrics.
///
/// Implementations are selected by configuration and treated polymorphically
/// by the collector; they must not panic on unknown keywords.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Stable source name, used for weighting and in trend explanations.
    fn name(&self) -> &str;

    /// Fetch this provider's reading for one keyword.
    async fn fetch(&self, keyword: &str) -> Result<SourceReading, SignalError>;
}

/// Per-call bounds applied to every source fetch.
#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl From<&AppConfig> for CollectOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.source_timeout_secs,
            max_retries: config.collaborator_max_retries,
            backoff_base_ms: config.collaborator_backoff_base_ms,
        }
    }
}

/// Collect readings for one keyword from every configured source.
///
/// Each fetch is bounded by the per-source timeout and retried with backoff
/// on transient failures. A source that still fails is skipped with a
/// warning; the caller treats an empty result as insufficient data.
pub async fn collect_readings(
    sources: &[Box<dyn SignalSource>],
    keyword: &str,
    options: CollectOptions,
) -> Vec<SourceReading> {
    let mut readings = Vec::with_capacity(sources.len());

    for source in sources {
        let result = retry_with_backoff(
            options.max_retries,
            options.backoff_base_ms,
            SignalError::is_transient,
            || fetch_bounded(source.as_ref(), keyword, options.timeout_secs),
        )
        .await;

        match result {
            Ok(reading) => {
                tracing::debug!(
                    keyword,
                    source = source.name(),
                    value = reading.value,
                    "collected signal reading"
                );
                readings.push(reading);
            }
            Err(e) => {
                tracing::warn!(
                    keyword,
                    source = source.name(),
                    error = %e,
                    "source fetch failed — excluding from aggregation"
                );
            }
        }
    }

    readings
}

async fn fetch_bounded(
    source: &dyn SignalSource,
    keyword: &str,
    timeout_secs: u64,
) -> Result<SourceReading, SignalError> {
    match tokio::time::timeout(Duration::from_secs(timeout_secs), source.fetch(keyword)).await {
        Ok(result) => result,
        Err(_) => Err(SignalError::Timeout {
            source_name: source.name().to_string(),
            timeout_secs,
        }),
    }
}

/// Build the configured source set.
///
/// The two simulated providers are always present; the HTTP-backed
/// search-interest source joins when its endpoint is configured.
#[must_use]
pub fn build_sources(config: &AppConfig) -> Vec<Box<dyn SignalSource>> {
    let month = Utc::now().month();
    let mut sources: Vec<Box<dyn SignalSource>> = vec![
        Box::new(SimulatedEtsySource::new(month)),
        Box::new(SimulatedPinterestSource::new(month)),
    ];

    if let Some(url) = &config.search_interest_url {
        sources.push(Box::new(SearchInterestSource::new(
            url.clone(),
            config.source_timeout_secs,
        )));
    }

    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSource {
        name: &'static str,
        value: f64,
    }

    #[async_trait]
    impl SignalSource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _keyword: &str) -> Result<SourceReading, SignalError> {
            Ok(SourceReading::new(self.name, self.value))
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SignalSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self, _keyword: &str) -> Result<SourceReading, SignalError> {
            Err(SignalError::Api("always down".to_string()))
        }
    }

    struct HangingSource;

    #[async_trait]
    impl SignalSource for HangingSource {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn fetch(&self, _keyword: &str) -> Result<SourceReading, SignalError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("the collector's timeout fires first");
        }
    }

    fn options() -> CollectOptions {
        CollectOptions {
            timeout_secs: 1,
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    #[tokio::test]
    async fn collects_from_every_healthy_source() {
        let sources: Vec<Box<dyn SignalSource>> = vec![
            Box::new(StaticSource { name: "a", value: 80.0 }),
            Box::new(StaticSource { name: "b", value: 60.0 }),
        ];
        let readings = collect_readings(&sources, "daily planner", options()).await;
        assert_eq!(readings.len(), 2);
    }

    #[tokio::test]
    async fn failed_source_is_skipped_not_fatal() {
        let sources: Vec<Box<dyn SignalSource>> = vec![
            Box::new(FailingSource),
            Box::new(StaticSource { name: "b", value: 60.0 }),
        ];
        let readings = collect_readings(&sources, "daily planner", options()).await;
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].source, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn hung_source_is_excluded_after_timeout() {
        let sources: Vec<Box<dyn SignalSource>> = vec![
            Box::new(HangingSource),
            Box::new(StaticSource { name: "b", value: 60.0 }),
        ];
        let readings = collect_readings(&sources, "daily planner", options()).await;
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].source, "b");
    }

    #[tokio::test]
    async fn all_sources_failing_yields_empty() {
        let sources: Vec<Box<dyn SignalSource>> = vec![Box::new(FailingSource)];
        let readings = collect_readings(&sources, "daily planner", options()).await;
        assert!(readings.is_empty());
    }
}
