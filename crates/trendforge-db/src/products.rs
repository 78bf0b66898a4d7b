//! Database operations for `products` and `publish_results`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use trendforge_core::{Platform, ProductKind, ProductStatus};

use crate::DbError;

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub keyword: String,
    pub status: String,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A product draft ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub kind: ProductKind,
    pub keyword: String,
    pub link: Option<String>,
}

/// A row from the `publish_results` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublishResultRow {
    pub id: i64,
    pub product_id: i64,
    pub platform: String,
    pub success: bool,
    pub url: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One platform outcome to record against a product.
#[derive(Debug, Clone)]
pub struct NewPublishResult {
    pub product_id: i64,
    pub platform: Platform,
    pub success: bool,
    pub url: Option<String>,
    pub error: Option<String>,
}

const PRODUCT_COLUMNS: &str = "id, name, kind, keyword, status, link, created_at";

/// Inserts a product in `draft` status and returns the full row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_product(pool: &SqlitePool, product: &NewProduct) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "INSERT INTO products (name, kind, keyword, status, link, created_at) \
         VALUES ($1, $2, $3, 'draft', $4, $5) \
         RETURNING {PRODUCT_COLUMNS}",
    ))
    .bind(&product.name)
    .bind(product.kind.to_string())
    .bind(&product.keyword)
    .bind(&product.link)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetches a product by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such product exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_product(pool: &SqlitePool, id: i64) -> Result<ProductRow, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1",
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns all products, most recent first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products(pool: &SqlitePool) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC",
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the most recent product still in `draft` status, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_draft_product(pool: &SqlitePool) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE status = 'draft' \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    ))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Moves a product out of `draft` into a terminal status.
///
/// Status transitions are forward-only; the `WHERE status = 'draft'` guard
/// makes a second transition attempt fail rather than silently overwrite.
///
/// # Errors
///
/// Returns [`DbError::InvalidProductTransition`] if the product is not in
/// `draft` status, or [`DbError::Sqlx`] if the update fails.
pub async fn set_product_status(
    pool: &SqlitePool,
    id: i64,
    status: ProductStatus,
) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE products SET status = $1 WHERE id = $2 AND status = 'draft'")
        .bind(status.to_string())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidProductTransition {
            id,
            expected_status: "draft",
        });
    }

    Ok(())
}

/// Records one platform's publish outcome. Rows are immutable once written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_publish_result(
    pool: &SqlitePool,
    result: &NewPublishResult,
) -> Result<PublishResultRow, DbError> {
    let row = sqlx::query_as::<_, PublishResultRow>(
        "INSERT INTO publish_results (product_id, platform, success, url, error, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, product_id, platform, success, url, error, created_at",
    )
    .bind(result.product_id)
    .bind(result.platform.to_string())
    .bind(result.success)
    .bind(&result.url)
    .bind(&result.error)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns all recorded publish outcomes for a product, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_publish_results(
    pool: &SqlitePool,
    product_id: i64,
) -> Result<Vec<PublishResultRow>, DbError> {
    let rows = sqlx::query_as::<_, PublishResultRow>(
        "SELECT id, product_id, platform, success, url, error, created_at \
         FROM publish_results \
         WHERE product_id = $1 \
         ORDER BY id ASC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
