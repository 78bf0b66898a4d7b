use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{map_db_error, map_pipeline_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct TrendItem {
    pub keyword: String,
    pub score: f64,
    pub velocity: f64,
    pub category: String,
    pub confidence: String,
    pub confidence_score: f64,
    pub explanation: String,
    pub sources: Vec<String>,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct ResearchList {
    pub results: Vec<TrendItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct RunResearchResponse {
    pub success: bool,
    pub count: usize,
    pub run_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct ClearRunResponse {
    pub success: bool,
    pub deleted_count: u64,
}

/// `GET /api/research` — the latest run's trends, highest score first.
pub(super) async fn list_research(
    State(state): State<AppState>,
) -> Result<Json<ResearchList>, ApiError> {
    let rows = trendforge_db::list_latest_run(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    let results = rows
        .into_iter()
        .map(|row| TrendItem {
            keyword: row.keyword,
            score: row.score,
            velocity: row.velocity,
            category: row.category,
            confidence: row.confidence,
            confidence_score: row.confidence_score,
            explanation: row.explanation,
            sources: row.sources.0,
            run_id: row.run_id,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ResearchList { results }))
}

/// `POST /api/research/run` — trigger the research stage.
///
/// Deliberately not idempotent: every call starts a new run id.
pub(super) async fn run_research(
    State(state): State<AppState>,
) -> Result<Json<RunResearchResponse>, ApiError> {
    let outcome = state
        .orchestrator
        .research()
        .await
        .map_err(|e| map_pipeline_error(&e))?;

    Ok(Json(RunResearchResponse {
        success: true,
        count: outcome.stored,
        run_id: outcome.run_id,
    }))
}

/// `DELETE /api/research/{keyword}` — delete one trend from the latest run.
pub(super) async fn delete_keyword(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = trendforge_db::delete_trend(&state.pool, &keyword)
        .await
        .map_err(|e| map_db_error(&e))?;

    if deleted {
        Ok(Json(DeleteResponse { success: true }))
    } else {
        Err(ApiError::not_found(format!(
            "keyword '{keyword}' is not in the latest research run"
        )))
    }
}

/// `DELETE /api/research/latest` — clear the latest run.
///
/// "Nothing to clear" is a successful zero, not an error, so retries are
/// harmless.
pub(super) async fn clear_latest_run(
    State(state): State<AppState>,
) -> Result<Json<ClearRunResponse>, ApiError> {
    let run_id = trendforge_db::latest_run_id(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    let deleted_count = match run_id {
        Some(run_id) => trendforge_db::delete_run(&state.pool, &run_id)
            .await
            .map_err(|e| map_db_error(&e))?,
        None => 0,
    };

    Ok(Json(ClearRunResponse {
        success: true,
        deleted_count,
    }))
}
