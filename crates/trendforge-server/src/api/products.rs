use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{map_db_error, map_pipeline_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ProductItem {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub keyword: String,
    pub status: String,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductList {
    pub products: Vec<ProductItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateProductRequest {
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateProductResponse {
    pub success: bool,
    pub link: String,
}

/// `GET /api/products` — every product, most recent first.
pub(super) async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ProductList>, ApiError> {
    let rows = trendforge_db::list_products(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;

    let products = rows
        .into_iter()
        .map(|row| ProductItem {
            id: row.id,
            name: row.name,
            kind: row.kind,
            keyword: row.keyword,
            status: row.status,
            link: row.link,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ProductList { products }))
}

/// `POST /api/products/create` — run the create stage for one keyword.
pub(super) async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<CreateProductResponse>, ApiError> {
    let outcome = state
        .orchestrator
        .create(&request.keyword)
        .await
        .map_err(|e| map_pipeline_error(&e))?;

    Ok(Json(CreateProductResponse {
        success: true,
        link: outcome.link,
    }))
}
