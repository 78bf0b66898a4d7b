use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{map_db_error, normalize_limit, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ActivityItem {
    pub agent: String,
    pub action: String,
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

impl From<trendforge_db::ActivityRow> for ActivityItem {
    fn from(row: trendforge_db::ActivityRow) -> Self {
        Self {
            agent: row.agent,
            action: row.action,
            result: row.result,
            timestamp: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ActivityList {
    pub activities: Vec<ActivityItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ActivityQuery {
    pub limit: Option<i64>,
}

/// `GET /api/activity?limit=N` — the most recent ledger entries, newest
/// first.
pub(super) async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityList>, ApiError> {
    let rows = trendforge_db::list_activity(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(ActivityList {
        activities: rows.into_iter().map(ActivityItem::from).collect(),
    }))
}
