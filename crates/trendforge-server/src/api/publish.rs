use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use trendforge_core::Platform;
use trendforge_pipeline::PublishStageStatus;

use super::{map_pipeline_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct PublishRequest {
    #[serde(default = "default_platform")]
    pub platform: String,
}

fn default_platform() -> String {
    "both".to_string()
}

#[derive(Debug, Serialize)]
pub(super) struct PlatformResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PublishResponse {
    /// True only when every requested platform succeeded; partial success
    /// reads false here with the per-platform detail below.
    pub success: bool,
    pub product_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etsy: Option<PlatformResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinterest: Option<PlatformResult>,
}

/// `POST /api/publish` — run the publish stage for the latest product.
pub(super) async fn publish_product(
    State(state): State<AppState>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, ApiError> {
    let platforms = Platform::parse_selection(&request.platform)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;

    let outcome = state
        .orchestrator
        .publish(&platforms)
        .await
        .map_err(|e| map_pipeline_error(&e))?;

    let mut response = PublishResponse {
        success: outcome.status == PublishStageStatus::Published,
        product_name: outcome.product_name,
        etsy: None,
        pinterest: None,
    };

    for result in outcome.results {
        let platform_result = PlatformResult {
            success: result.success,
            url: result.url,
            error: result.error,
        };
        match result.platform {
            Platform::Etsy => response.etsy = Some(platform_result),
            Platform::Pinterest => response.pinterest = Some(platform_result),
        }
    }

    Ok(Json(response))
}
