//! Artifact rendering collaborator boundary.
//!
//! The factory hands a tabular template to a renderer and gets back the
//! artifact's public URL. The spreadsheet backend itself (Sheets bridge) is
//! outside this repository; a deterministic local renderer stands in when
//! no bridge is configured.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use trendforge_core::ProductKind;

/// What a renderer needs to materialize one artifact.
#[derive(Debug, Clone)]
pub struct ArtifactSpec {
    pub name: String,
    pub kind: ProductKind,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sheets bridge error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl RenderError {
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            RenderError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            RenderError::Api { status, .. } => *status >= 500,
        }
    }
}

/// Renders a product artifact and returns its shareable URL.
#[async_trait]
pub trait ArtifactRenderer: Send + Sync {
    async fn render(&self, spec: &ArtifactSpec) -> Result<String, RenderError>;
}

#[derive(Debug, Deserialize)]
struct RenderResponse {
    url: String,
}

/// HTTP-backed renderer talking to the external sheets bridge.
pub struct HttpSheetsRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSheetsRenderer {
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
}

#[async_trait]
impl ArtifactRenderer for HttpSheetsRenderer {
    async fn render(&self, spec: &ArtifactSpec) -> Result<String, RenderError> {
        let url = format!("{}/render", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({
                "name": spec.name,
                "kind": spec.kind,
                "rows": spec.rows,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RenderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: RenderResponse = response.json().await?;
        Ok(body.url)
    }
}

/// Deterministic stand-in renderer for local runs and tests: no I/O, the
/// artifact URL is derived from the product name alone.
pub struct LocalArtifactRenderer {
    base_url: String,
}

impl LocalArtifactRenderer {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

#[async_trait]
impl ArtifactRenderer for LocalArtifactRenderer {
    async fn render(&self, spec: &ArtifactSpec) -> Result<String, RenderError> {
        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            slug(&spec.name)
        ))
    }
}

/// URL-safe slug from a product name.
fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else if c == ' ' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
