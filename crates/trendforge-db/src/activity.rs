//! Append-only activity ledger.
//!
//! Entries are never edited or deleted; every pipeline stage transition
//! writes exactly one row, success or failure alike.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `activity_log` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityRow {
    pub id: i64,
    pub agent: String,
    pub action: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

/// Appends one ledger entry.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn log_activity(
    pool: &SqlitePool,
    agent: &str,
    action: &str,
    result: &str,
) -> Result<(), DbError> {
    sqlx::query("INSERT INTO activity_log (agent, action, result, created_at) VALUES ($1, $2, $3, $4)")
        .bind(agent)
        .bind(action)
        .bind(result)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(())
}

/// Returns the most recent `limit` entries, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_activity(pool: &SqlitePool, limit: i64) -> Result<Vec<ActivityRow>, DbError> {
    let rows = sqlx::query_as::<_, ActivityRow>(
        "SELECT id, agent, action, result, created_at \
         FROM activity_log \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the single most recent entry, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn last_activity(pool: &SqlitePool) -> Result<Option<ActivityRow>, DbError> {
    let mut rows = list_activity(pool, 1).await?;
    Ok(rows.pop())
}
