mod activity;
mod products;
mod publish;
mod research;
mod status;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use trendforge_pipeline::{Orchestrator, PipelineError};

use crate::middleware::request_id;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub orchestrator: Arc<Orchestrator>,
}

/// Error envelope: every failure carries a human-readable `detail` so the
/// operator can tell "nothing happened" from "partially happened".
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

/// Map stage failures onto HTTP statuses; the pipeline's message is the
/// user-facing detail.
pub(super) fn map_pipeline_error(error: &PipelineError) -> ApiError {
    let status = match error {
        PipelineError::KeywordNotFound(_) | PipelineError::NoProduct => StatusCode::NOT_FOUND,
        PipelineError::InvalidState(_) | PipelineError::Aborted => StatusCode::CONFLICT,
        PipelineError::InsufficientData | PipelineError::Collaborator(_) => {
            StatusCode::BAD_GATEWAY
        }
        PipelineError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::new(status, error.to_string())
}

pub(super) fn map_db_error(error: &trendforge_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "database query failed")
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 500)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/research", get(research::list_research))
        .route("/api/research/run", post(research::run_research))
        .route("/api/research/latest", delete(research::clear_latest_run))
        .route("/api/research/{keyword}", delete(research::delete_keyword))
        .route("/api/products", get(products::list_products))
        .route("/api/products/create", post(products::create_product))
        .route("/api/publish", post(publish::publish_product))
        .route("/api/activity", get(activity::list_activity))
        .route("/api/status", get(status::get_status))
        .route("/api/revenue", get(status::get_revenue))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match trendforge_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}
