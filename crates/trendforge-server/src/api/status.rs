use axum::{extract::State, Json};
use serde::Serialize;

use super::activity::ActivityItem;
use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub last_activity: Option<ActivityItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct RevenueResponse {
    pub total: f64,
    pub currency: &'static str,
}

/// `GET /api/status` — liveness plus the most recent ledger entry.
pub(super) async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let last = trendforge_db::last_activity(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(StatusResponse {
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        last_activity: last.map(ActivityItem::from),
    }))
}

/// `GET /api/revenue` — total recorded revenue in dollars.
pub(super) async fn get_revenue(
    State(state): State<AppState>,
) -> Result<Json<RevenueResponse>, ApiError> {
    let cents = trendforge_db::total_revenue_cents(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    #[allow(clippy::cast_precision_loss)]
    Ok(Json(RevenueResponse {
        total: cents as f64 / 100.0,
        currency: "USD",
    }))
}
