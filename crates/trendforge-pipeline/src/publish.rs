//! Publish stage: dispatch the latest product and fold the outcomes back
//! into its status.

use std::str::FromStr;

use sqlx::SqlitePool;
use trendforge_core::{Platform, ProductKind, ProductStatus};
use trendforge_publish::{
    dispatch, DispatchOptions, PlatformPublisher, ProductSnapshot, PublishError,
};

use crate::error::PipelineError;
use crate::stage::PublishStageOutcome;

/// Publish the latest product to the requested platforms.
///
/// The latest product must still be a draft — publishing an already
/// published (or failed) product is an invalid transition, which is the
/// guard against double-publishing. Per-platform outcomes are persisted
/// verbatim; the product folds to `published` on any success and `failed`
/// when every platform failed.
pub(crate) async fn publish_latest(
    pool: &SqlitePool,
    publishers: &[Box<dyn PlatformPublisher>],
    platforms: &[Platform],
    options: DispatchOptions,
) -> Result<PublishStageOutcome, PipelineError> {
    let products = trendforge_db::list_products(pool).await?;
    let Some(latest) = products.into_iter().next() else {
        return Err(PipelineError::NoProduct);
    };

    let snapshot = snapshot_of(&latest)?;

    let report = dispatch(publishers, &snapshot, platforms, options)
        .await
        .map_err(|e| match e {
            PublishError::InvalidState { .. } => PipelineError::InvalidState(e.to_string()),
            other => PipelineError::Collaborator(other.to_string()),
        })?;

    for outcome in &report.outcomes {
        trendforge_db::insert_publish_result(
            pool,
            &trendforge_db::NewPublishResult {
                product_id: latest.id,
                platform: outcome.platform,
                success: outcome.success,
                url: outcome.url.clone(),
                error: outcome.error.clone(),
            },
        )
        .await?;
    }

    let status = PublishStageOutcome::status_from(&report.outcomes);
    let product_status = if report.any_succeeded() {
        ProductStatus::Published
    } else {
        ProductStatus::Failed
    };
    trendforge_db::set_product_status(pool, latest.id, product_status).await?;

    tracing::info!(
        product_id = latest.id,
        product = %latest.name,
        status = %status,
        "publish stage finished"
    );

    Ok(PublishStageOutcome {
        product_id: latest.id,
        product_name: latest.name,
        status,
        results: report.outcomes,
    })
}

/// Decode a stored product row into the dispatcher's read-only view.
fn snapshot_of(row: &trendforge_db::ProductRow) -> Result<ProductSnapshot, PipelineError> {
    let status = ProductStatus::from_str(&row.status).map_err(|_| {
        PipelineError::InvalidState(format!(
            "product '{}' has unrecognized status '{}'",
            row.name, row.status
        ))
    })?;
    let kind = ProductKind::from_str(&row.kind).map_err(|_| {
        PipelineError::InvalidState(format!(
            "product '{}' has unrecognized kind '{}'",
            row.name, row.kind
        ))
    })?;

    Ok(ProductSnapshot {
        id: row.id,
        name: row.name.clone(),
        kind,
        keyword: row.keyword.clone(),
        link: row.link.clone(),
        status,
    })
}
