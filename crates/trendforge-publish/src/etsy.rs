//! Etsy Open API v3 client: draft-listing creation for digital products.
//!
//! OAuth token acquisition is out of scope here — the client is handed a
//! ready access token and treats a missing one as `NotAuthenticated`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use trendforge_core::Platform;

use crate::dispatcher::{PlatformPublisher, ProductSnapshot};
use crate::error::PublishError;

const ETSY_API_BASE: &str = "https://openapi.etsy.com/v3";

#[derive(Debug, Deserialize)]
struct ListingResponse {
    listing_id: u64,
}

#[derive(Debug, Clone)]
pub struct EtsyCredentials {
    pub api_key: String,
    pub access_token: String,
    pub shop_id: String,
}

pub struct EtsyClient {
    client: reqwest::Client,
    base_url: String,
    credentials: EtsyCredentials,
}

impl EtsyClient {
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialised, which only happens
    /// in broken build environments.
    #[must_use]
    pub fn new(credentials: EtsyCredentials, timeout_secs: u64) -> Self {
        Self::with_base_url(credentials, timeout_secs, ETSY_API_BASE.to_string())
    }

    #[must_use]
    pub fn with_base_url(
        credentials: EtsyCredentials,
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

    /// Create a draft listing for a digital product and return its id.
    ///
    /// Listings are always created in `draft` state so nothing goes live
    /// without operator review.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Http`] on transport failure or
    /// [`PublishError::Api`] when Etsy rejects the request.
    pub async fn create_draft_listing(
        &self,
        title: &str,
        description: &str,
        price_cents: i64,
    ) -> Result<u64, PublishError> {
        let url = format!(
            "{}/application/shops/{}/listings",
            self.base_url.trim_end_matches('/'),
            self.credentials.shop_id
        );

        #[allow(clippy::cast_precision_loss)]
        let price = format!("{:.2}", price_cents as f64 / 100.0);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.credentials.access_token)
            .header("x-api-key", &self.credentials.api_key)
            .form(&[
                ("title", title),
                ("description", description),
                ("price", price.as_str()),
                ("quantity", "1"),
                ("who_made", "i_did"),
                ("when_made", "made_to_order"),
                ("is_supply", "false"),
                ("type", "download"),
                ("state", "draft"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                platform: Platform::Etsy,
                status: status.as_u16(),
                message,
            });
        }

        let listing: ListingResponse = response.json().await?;
        Ok(listing.listing_id)
    }
}

/// Public URL of an Etsy listing.
#[must_use]
pub fn listing_url(listing_id: u64) -> String {
    format!("https://www.etsy.com/listing/{listing_id}")
}

/// Deterministic listing description for a product draft.
#[must_use]
pub fn listing_description(product: &ProductSnapshot) -> String {
    format!(
        "{} — a clean, customizable {} template. Digital download, ready to use.\n\n\
         Built for '{}' and delivered instantly.",
        product.name, product.kind, product.keyword
    )
}

/// The Etsy leg of the dispatcher. Holds an optional client so a fully
/// unconfigured platform still yields a structured per-platform failure
/// instead of being silently absent.
pub struct EtsyPublisher {
    client: Option<EtsyClient>,
    price_cents: i64,
}

impl EtsyPublisher {
    #[must_use]
    pub fn new(client: Option<EtsyClient>, price_cents: i64) -> Self {
        Self {
            client,
            price_cents,
        }
    }
}

#[async_trait]
impl PlatformPublisher for EtsyPublisher {
    fn platform(&self) -> Platform {
        Platform::Etsy
    }

    async fn publish(&self, product: &ProductSnapshot) -> Result<String, PublishError> {
        let Some(client) = &self.client else {
            return Err(PublishError::NotAuthenticated {
                platform: Platform::Etsy,
            });
        };

        let description = listing_description(product);
        let listing_id = client
            .create_draft_listing(&product.name, &description, self.price_cents)
            .await?;

        Ok(listing_url(listing_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendforge_core::{ProductKind, ProductStatus};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> EtsyCredentials {
        EtsyCredentials {
            api_key: "key".to_string(),
            access_token: "token".to_string(),
            shop_id: "shop-1".to_string(),
        }
    }

    fn product() -> ProductSnapshot {
        ProductSnapshot {
            id: 1,
            name: "Daily Planner - Web".to_string(),
            kind: ProductKind::Planner,
            keyword: "daily planner".to_string(),
            link: Some("https://sheets.local/artifacts/daily-planner".to_string()),
            status: ProductStatus::Draft,
        }
    }

    #[tokio::test]
    async fn creates_a_draft_listing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/application/shops/shop-1/listings"))
            .and(header("x-api-key", "key"))
            .and(body_string_contains("state=draft"))
            .and(body_string_contains("type=download"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({ "listing_id": 4242 })),
            )
            .mount(&server)
            .await;

        let client = EtsyClient::with_base_url(credentials(), 5, server.uri());
        let listing_id = client
            .create_draft_listing("Daily Planner", "description", 999)
            .await
            .expect("create listing");

        assert_eq!(listing_id, 4242);
        assert_eq!(listing_url(listing_id), "https://www.etsy.com/listing/4242");
    }

    #[tokio::test]
    async fn api_rejection_surfaces_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/application/shops/shop-1/listings"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid taxonomy"))
            .mount(&server)
            .await;

        let client = EtsyClient::with_base_url(credentials(), 5, server.uri());
        let err = client
            .create_draft_listing("Daily Planner", "description", 999)
            .await
            .unwrap_err();

        match err {
            PublishError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 400);
                assert!(message.contains("invalid taxonomy"));
            }
            other => panic!("expected Api error, got {other}"),
        }
    }

    #[tokio::test]
    async fn server_errors_are_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = EtsyClient::with_base_url(credentials(), 5, server.uri());
        let err = client
            .create_draft_listing("Daily Planner", "description", 999)
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn unconfigured_publisher_reports_not_authenticated() {
        let publisher = EtsyPublisher::new(None, 999);
        let err = publisher.publish(&product()).await.unwrap_err();
        assert!(matches!(err, PublishError::NotAuthenticated { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn listing_description_is_deterministic_and_cites_the_product() {
        let first = listing_description(&product());
        let second = listing_description(&product());
        assert_eq!(first, second);
        assert!(first.contains("Daily Planner - Web"));
        assert!(first.contains("planner"));
    }
}
