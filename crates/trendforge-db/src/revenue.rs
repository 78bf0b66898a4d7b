//! Revenue ledger queries backing the `/api/revenue` summary.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::DbError;

/// Records a revenue entry in integer cents.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn record_revenue(
    pool: &SqlitePool,
    source: &str,
    amount_cents: i64,
) -> Result<(), DbError> {
    sqlx::query("INSERT INTO revenue (source, amount_cents, recorded_at) VALUES ($1, $2, $3)")
        .bind(source)
        .bind(amount_cents)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(())
}

/// Total recorded revenue in cents; 0 for an empty ledger.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn total_revenue_cents(pool: &SqlitePool) -> Result<i64, DbError> {
    let total =
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(amount_cents), 0) FROM revenue")
            .fetch_one(pool)
            .await?;

    Ok(total)
}
