//! HTTP-backed search-interest source.
//!
//! Thin client over a search-interest index collaborator: one GET per
//! keyword, JSON out. The provider reports its own baseline range and
//! sample size so the aggregator can normalize against it.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use trendforge_core::SourceReading;

use super::SignalSource;
use crate::error::SignalError;

pub const SOURCE_NAME: &str = "search_interest";

#[derive(Debug, Deserialize)]
struct InterestResponse {
    interest: f64,
    #[serde(default)]
    baseline_min: f64,
    #[serde(default = "default_baseline_max")]
    baseline_max: f64,
    #[serde(default = "default_sample_size")]
    sample_size: u32,
    #[serde(default)]
    error: Option<String>,
}

fn default_baseline_max() -> f64 {
    100.0
}

fn default_sample_size() -> u32 {
    1
}

pub struct SearchInterestSource {
    client: reqwest::Client,
    base_url: String,
}

impl SearchInterestSource {
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialised, which only happens
    /// in broken build environments.
    #[must_use]
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self { client, base_url }
    }

    fn interest_url(&self, keyword: &str) -> String {
        let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC);
        format!(
            "{}/interest?keyword={encoded}",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SignalSource for SearchInterestSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self, keyword: &str) -> Result<SourceReading, SignalError> {
        let response = self
            .client
            .get(self.interest_url(keyword))
            .send()
            .await?
            .error_for_status()?;

        let body: InterestResponse = response.json().await?;

        if let Some(message) = body.error {
            return Err(SignalError::Api(message));
        }

        Ok(SourceReading {
            source: SOURCE_NAME.to_string(),
            value: body.interest,
            baseline_min: body.baseline_min,
            baseline_max: body.baseline_max,
            sample_size: body.sample_size,
        })
    }
}
