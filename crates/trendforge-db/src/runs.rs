//! Database operations for `research_runs`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `research_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResearchRunRow {
    pub run_id: String,
    pub status: String,
    pub keyword_count: i64,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Creates a new research run in `running` status and returns the full row.
///
/// Run ids are short and human-pasteable: `run_` plus the first 8 hex chars
/// of a v4 UUID.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_research_run(pool: &SqlitePool) -> Result<ResearchRunRow, DbError> {
    let hex = Uuid::new_v4().simple().to_string();
    let run_id = format!("run_{}", &hex[..8]);
    let started_at = Utc::now();

    let row = sqlx::query_as::<_, ResearchRunRow>(
        "INSERT INTO research_runs (run_id, status, keyword_count, started_at) \
         VALUES ($1, 'running', 0, $2) \
         RETURNING run_id, status, keyword_count, error_message, started_at, completed_at",
    )
    .bind(&run_id)
    .bind(started_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `complete` and records how many keywords produced trends.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_research_run(
    pool: &SqlitePool,
    run_id: &str,
    keyword_count: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE research_runs \
         SET status = 'complete', keyword_count = $1, completed_at = $2 \
         WHERE run_id = $3 AND status = 'running'",
    )
    .bind(keyword_count)
    .bind(Utc::now())
    .bind(run_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            run_id: run_id.to_string(),
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed` with a reason.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_research_run(
    pool: &SqlitePool,
    run_id: &str,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE research_runs \
         SET status = 'failed', error_message = $1, completed_at = $2 \
         WHERE run_id = $3 AND status = 'running'",
    )
    .bind(error_message)
    .bind(Utc::now())
    .bind(run_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            run_id: run_id.to_string(),
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such run exists, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_research_run(pool: &SqlitePool, run_id: &str) -> Result<ResearchRunRow, DbError> {
    let row = sqlx::query_as::<_, ResearchRunRow>(
        "SELECT run_id, status, keyword_count, error_message, started_at, completed_at \
         FROM research_runs \
         WHERE run_id = $1",
    )
    .bind(run_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recently started run id, if any run exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_run_id(pool: &SqlitePool) -> Result<Option<String>, DbError> {
    let run_id = sqlx::query_scalar::<_, String>(
        "SELECT run_id FROM research_runs ORDER BY started_at DESC, rowid DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(run_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_then_complete_run(pool: SqlitePool) {
        let run = create_research_run(&pool).await.expect("create run");
        assert!(run.run_id.starts_with("run_"));
        assert_eq!(run.status, "running");

        complete_research_run(&pool, &run.run_id, 4)
            .await
            .expect("complete run");

        let fetched = get_research_run(&pool, &run.run_id).await.expect("get run");
        assert_eq!(fetched.status, "complete");
        assert_eq!(fetched.keyword_count, 4);
        assert!(fetched.completed_at.is_some());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn completing_twice_is_an_invalid_transition(pool: SqlitePool) {
        let run = create_research_run(&pool).await.expect("create run");
        complete_research_run(&pool, &run.run_id, 1)
            .await
            .expect("first complete");

        let err = complete_research_run(&pool, &run.run_id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidRunTransition { .. }));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn failing_a_run_records_the_reason(pool: SqlitePool) {
        let run = create_research_run(&pool).await.expect("create run");
        fail_research_run(&pool, &run.run_id, "all sources timed out")
            .await
            .expect("fail run");

        let fetched = get_research_run(&pool, &run.run_id).await.expect("get run");
        assert_eq!(fetched.status, "failed");
        assert_eq!(
            fetched.error_message.as_deref(),
            Some("all sources timed out")
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn latest_run_id_returns_most_recent(pool: SqlitePool) {
        assert!(latest_run_id(&pool).await.expect("query").is_none());

        let _first = create_research_run(&pool).await.expect("first run");
        let second = create_research_run(&pool).await.expect("second run");

        let latest = latest_run_id(&pool).await.expect("query");
        assert_eq!(latest.as_deref(), Some(second.run_id.as_str()));
    }
}
