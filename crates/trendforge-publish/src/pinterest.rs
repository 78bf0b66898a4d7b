//! Pinterest API v5 client: pin creation for marketing a product draft.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use trendforge_core::Platform;

use crate::dispatcher::{PlatformPublisher, ProductSnapshot};
use crate::error::PublishError;

const PINTEREST_API_BASE: &str = "https://api.pinterest.com/v5";
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/600x900?text=Digital+Product";

#[derive(Debug, Deserialize)]
struct PinResponse {
    id: String,
}

#[derive(Debug, Clone)]
pub struct PinterestCredentials {
    pub access_token: String,
    pub board_id: String,
}

pub struct PinterestClient {
    client: reqwest::Client,
    base_url: String,
    credentials: PinterestCredentials,
}

impl PinterestClient {
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialised, which only happens
    /// in broken build environments.
    #[must_use]
    pub fn new(credentials: PinterestCredentials, timeout_secs: u64) -> Self {
        Self::with_base_url(credentials, timeout_secs, PINTEREST_API_BASE.to_string())
    }

    #[must_use]
    pub fn with_base_url(
        credentials: PinterestCredentials,
        timeout_secs: u64,
        base_url: String,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url,
            credentials,
        }
    }

    /// Create a pin linking to the product artifact and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Http`] on transport failure or
    /// [`PublishError::Api`] when Pinterest rejects the request.
    pub async fn create_pin(
        &self,
        title: &str,
        description: &str,
        link: &str,
    ) -> Result<String, PublishError> {
        let url = format!("{}/pins", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.credentials.access_token)
            .json(&serde_json::json!({
                "board_id": self.credentials.board_id,
                "title": title,
                "description": description,
                "link": link,
                "media_source": {
                    "source_type": "image_url",
                    "url": PLACEHOLDER_IMAGE,
                },
                "alt_text": "Digital Product",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                platform: Platform::Pinterest,
                status: status.as_u16(),
                message,
            });
        }

        let pin: PinResponse = response.json().await?;
        Ok(pin.id)
    }
}

/// Public URL of a pin.
#[must_use]
pub fn pin_url(pin_id: &str) -> String {
    format!("https://www.pinterest.com/pin/{pin_id}/")
}

/// Deterministic pin copy for a product draft, hashtags included.
#[must_use]
pub fn pin_description(product: &ProductSnapshot) -> String {
    let kind = product.kind.to_string();
    format!(
        "{name}\n\n\
         Get organized with this {kind} template: clean design, easy to \
         customize, instant digital download.\n\n\
         #planner #productivity #organization #digitalplanner #{kind}",
        name = product.name,
    )
}

/// The Pinterest leg of the dispatcher.
pub struct PinterestPublisher {
    client: Option<PinterestClient>,
}

impl PinterestPublisher {
    #[must_use]
    pub fn new(client: Option<PinterestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlatformPublisher for PinterestPublisher {
    fn platform(&self) -> Platform {
        Platform::Pinterest
    }

    async fn publish(&self, product: &ProductSnapshot) -> Result<String, PublishError> {
        let Some(client) = &self.client else {
            return Err(PublishError::NotAuthenticated {
                platform: Platform::Pinterest,
            });
        };

        // A pin needs a destination; an artifact-less draft has nothing to
        // market, which reads as a client-side API error, not a retry case.
        let Some(link) = &product.link else {
            return Err(PublishError::Api {
                platform: Platform::Pinterest,
                status: 400,
                message: format!("product '{}' has no artifact link to pin", product.name),
            });
        };

        let description = pin_description(product);
        let pin_id = client
            .create_pin(&product.name, &description, link)
            .await?;

        Ok(pin_url(&pin_id))
    }
}
