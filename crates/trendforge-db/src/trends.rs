//! Database operations for run-scoped trend records.
//!
//! Trends are immutable after insert: the only mutations are deletes
//! (single keyword or whole run). Updating a trend means deleting it and
//! inserting a replacement.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::SqlitePool;
use trendforge_core::{ConfidenceLabel, TrendCategory};

use crate::DbError;

/// A row from the `trends` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub id: i64,
    pub run_id: String,
    pub keyword: String,
    pub score: f64,
    pub velocity: f64,
    pub category: String,
    pub confidence: String,
    pub confidence_score: f64,
    pub explanation: String,
    pub sources: Json<Vec<String>>,
    pub readings: Json<BTreeMap<String, f64>>,
    pub created_at: DateTime<Utc>,
}

/// A trend ready to be persisted into a run.
#[derive(Debug, Clone)]
pub struct NewTrend {
    pub run_id: String,
    pub keyword: String,
    pub score: f64,
    pub velocity: f64,
    pub category: TrendCategory,
    pub confidence: ConfidenceLabel,
    pub confidence_score: f64,
    pub explanation: String,
    pub sources: Vec<String>,
    pub readings: BTreeMap<String, f64>,
}

const TREND_COLUMNS: &str = "id, run_id, keyword, score, velocity, category, confidence, \
                             confidence_score, explanation, sources, readings, created_at";

/// Inserts a trend into its run.
///
/// # Errors
///
/// Returns [`DbError::DuplicateKeyword`] if the keyword already exists in
/// the same run, or [`DbError::Sqlx`] for any other failure.
pub async fn insert_trend(pool: &SqlitePool, trend: &NewTrend) -> Result<TrendRow, DbError> {
    let result = sqlx::query_as::<_, TrendRow>(&format!(
        "INSERT INTO trends \
             (run_id, keyword, score, velocity, category, confidence, confidence_score, \
              explanation, sources, readings, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {TREND_COLUMNS}",
    ))
    .bind(&trend.run_id)
    .bind(&trend.keyword)
    .bind(trend.score)
    .bind(trend.velocity)
    .bind(trend.category.to_string())
    .bind(trend.confidence.to_string())
    .bind(trend.confidence_score)
    .bind(&trend.explanation)
    .bind(Json(&trend.sources))
    .bind(Json(&trend.readings))
    .bind(Utc::now())
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row),
        Err(e) => {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                return Err(DbError::DuplicateKeyword {
                    keyword: trend.keyword.clone(),
                    run_id: trend.run_id.clone(),
                });
            }
            Err(e.into())
        }
    }
}

/// Returns every trend in the given run, highest score first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_run(pool: &SqlitePool, run_id: &str) -> Result<Vec<TrendRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendRow>(&format!(
        "SELECT {TREND_COLUMNS} FROM trends WHERE run_id = $1 ORDER BY score DESC, keyword ASC",
    ))
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the latest run's trends, highest score first.
///
/// An empty store (no runs yet) yields an empty list, not an error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_latest_run(pool: &SqlitePool) -> Result<Vec<TrendRow>, DbError> {
    match crate::runs::latest_run_id(pool).await? {
        Some(run_id) => list_run(pool, &run_id).await,
        None => Ok(Vec::new()),
    }
}

/// Deletes one keyword's trend from the latest run.
///
/// Returns `false` when the keyword is absent (or no run exists) — callers
/// decide whether that is an error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_trend(pool: &SqlitePool, keyword: &str) -> Result<bool, DbError> {
    let Some(run_id) = crate::runs::latest_run_id(pool).await? else {
        return Ok(false);
    };

    let result = sqlx::query("DELETE FROM trends WHERE run_id = $1 AND keyword = $2")
        .bind(&run_id)
        .bind(keyword)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes every trend in the given run and returns the count removed.
///
/// Removing zero rows is a valid outcome ("nothing to clear"), not an error;
/// calling this twice in a row returns 0 the second time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_run(pool: &SqlitePool, run_id: &str) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM trends WHERE run_id = $1")
        .bind(run_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Composite scores for a keyword across prior *completed* runs, most
/// recent first. Feeds the aggregator's velocity and two-run-uptrend
/// classification; the in-progress run is excluded so history never sees
/// partially written state.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn recent_scores(
    pool: &SqlitePool,
    keyword: &str,
    limit: i64,
) -> Result<Vec<f64>, DbError> {
    let scores = sqlx::query_scalar::<_, f64>(
        "SELECT t.score \
         FROM trends t \
         JOIN research_runs r ON r.run_id = t.run_id \
         WHERE t.keyword = $1 AND r.status = 'complete' \
         ORDER BY r.started_at DESC, r.rowid DESC \
         LIMIT $2",
    )
    .bind(keyword)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::{complete_research_run, create_research_run};

    fn sample_trend(run_id: &str, keyword: &str, score: f64) -> NewTrend {
        NewTrend {
            run_id: run_id.to_string(),
            keyword: keyword.to_string(),
            score,
            velocity: 0.0,
            category: TrendCategory::Stable,
            confidence: ConfidenceLabel::Medium,
            confidence_score: 0.6,
            explanation: format!("Driven by simulated_etsy across 2 sources for {keyword}"),
            sources: vec!["simulated_etsy".to_string(), "simulated_pinterest".to_string()],
            readings: BTreeMap::from([
                ("simulated_etsy".to_string(), score),
                ("simulated_pinterest".to_string(), score - 10.0),
            ]),
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn insert_then_list_round_trips_once(pool: SqlitePool) {
        let run = create_research_run(&pool).await.expect("run");
        insert_trend(&pool, &sample_trend(&run.run_id, "daily planner", 72.0))
            .await
            .expect("insert");

        let listed = list_latest_run(&pool).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].keyword, "daily planner");
        assert_eq!(listed[0].sources.0.len(), 2);
        assert_eq!(
            listed[0].readings.0.get("simulated_etsy").copied(),
            Some(72.0)
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn duplicate_keyword_in_same_run_is_rejected(pool: SqlitePool) {
        let run = create_research_run(&pool).await.expect("run");
        let trend = sample_trend(&run.run_id, "habit tracker", 60.0);
        insert_trend(&pool, &trend).await.expect("first insert");

        let err = insert_trend(&pool, &trend).await.unwrap_err();
        assert!(
            matches!(err, DbError::DuplicateKeyword { ref keyword, .. } if keyword == "habit tracker")
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn same_keyword_in_different_runs_is_allowed(pool: SqlitePool) {
        let first = create_research_run(&pool).await.expect("run 1");
        let second = create_research_run(&pool).await.expect("run 2");

        insert_trend(&pool, &sample_trend(&first.run_id, "budget tracker", 55.0))
            .await
            .expect("insert run 1");
        insert_trend(&pool, &sample_trend(&second.run_id, "budget tracker", 61.0))
            .await
            .expect("insert run 2");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn listing_orders_by_descending_score(pool: SqlitePool) {
        let run = create_research_run(&pool).await.expect("run");
        for (keyword, score) in [("low", 20.0), ("high", 90.0), ("mid", 50.0)] {
            insert_trend(&pool, &sample_trend(&run.run_id, keyword, score))
                .await
                .expect("insert");
        }

        let listed = list_run(&pool, &run.run_id).await.expect("list");
        let keywords: Vec<&str> = listed.iter().map(|t| t.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["high", "mid", "low"]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn delete_trend_scopes_to_latest_run(pool: SqlitePool) {
        let old = create_research_run(&pool).await.expect("old run");
        insert_trend(&pool, &sample_trend(&old.run_id, "study planner", 40.0))
            .await
            .expect("insert old");

        let latest = create_research_run(&pool).await.expect("latest run");
        insert_trend(&pool, &sample_trend(&latest.run_id, "study planner", 45.0))
            .await
            .expect("insert latest");

        assert!(delete_trend(&pool, "study planner").await.expect("delete"));
        // Second delete finds nothing in the latest run.
        assert!(!delete_trend(&pool, "study planner").await.expect("delete"));

        // The old run's record is untouched.
        let old_rows = list_run(&pool, &old.run_id).await.expect("list old");
        assert_eq!(old_rows.len(), 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn delete_run_counts_only_matching_rows_and_is_idempotent(pool: SqlitePool) {
        let run_r = create_research_run(&pool).await.expect("run R");
        let run_s = create_research_run(&pool).await.expect("run S");

        for keyword in ["a", "b", "c", "d", "e"] {
            insert_trend(&pool, &sample_trend(&run_r.run_id, keyword, 50.0))
                .await
                .expect("insert R");
        }
        for keyword in ["x", "y"] {
            insert_trend(&pool, &sample_trend(&run_s.run_id, keyword, 50.0))
                .await
                .expect("insert S");
        }

        assert_eq!(delete_run(&pool, &run_r.run_id).await.expect("delete"), 5);
        assert_eq!(delete_run(&pool, &run_r.run_id).await.expect("delete"), 0);

        let remaining = list_run(&pool, &run_s.run_id).await.expect("list S");
        assert_eq!(remaining.len(), 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn recent_scores_skips_incomplete_runs(pool: SqlitePool) {
        let first = create_research_run(&pool).await.expect("run 1");
        insert_trend(&pool, &sample_trend(&first.run_id, "daily planner", 40.0))
            .await
            .expect("insert 1");
        complete_research_run(&pool, &first.run_id, 1)
            .await
            .expect("complete 1");

        let second = create_research_run(&pool).await.expect("run 2");
        insert_trend(&pool, &sample_trend(&second.run_id, "daily planner", 60.0))
            .await
            .expect("insert 2");
        complete_research_run(&pool, &second.run_id, 1)
            .await
            .expect("complete 2");

        // A third, still-running run must not contribute history.
        let third = create_research_run(&pool).await.expect("run 3");
        insert_trend(&pool, &sample_trend(&third.run_id, "daily planner", 99.0))
            .await
            .expect("insert 3");

        let scores = recent_scores(&pool, "daily planner", 5).await.expect("scores");
        assert_eq!(scores, vec![60.0, 40.0]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn recent_scores_for_unknown_keyword_is_empty(pool: SqlitePool) {
        let scores = recent_scores(&pool, "never seen", 5).await.expect("scores");
        assert!(scores.is_empty());
    }
}
