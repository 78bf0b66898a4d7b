//! Create stage: turn one researched keyword into a persisted product draft.

use sqlx::SqlitePool;
use trendforge_signals::retry_with_backoff;

use crate::error::PipelineError;
use crate::render::{ArtifactRenderer, ArtifactSpec, RenderError};
use crate::stage::CreateOutcome;
use crate::templates::{kind_for_keyword, product_name, template_rows};

/// Create a product draft for a keyword from the latest research run.
///
/// The keyword must exist in the latest run — creation is an explicit
/// operator selection over researched trends, never a blind generation.
/// The stored product keeps only the keyword text, so deleting the trend
/// later does not invalidate it.
pub(crate) async fn create_product(
    pool: &SqlitePool,
    renderer: &dyn ArtifactRenderer,
    keyword: &str,
    max_retries: u32,
    backoff_base_ms: u64,
) -> Result<CreateOutcome, PipelineError> {
    let trends = trendforge_db::list_latest_run(pool).await?;
    if !trends.iter().any(|t| t.keyword == keyword) {
        return Err(PipelineError::KeywordNotFound(keyword.to_string()));
    }

    let kind = kind_for_keyword(keyword);
    let name = product_name(keyword);
    let spec = ArtifactSpec {
        name: name.clone(),
        kind,
        rows: template_rows(kind),
    };

    let link = retry_with_backoff(
        max_retries,
        backoff_base_ms,
        RenderError::is_transient,
        || renderer.render(&spec),
    )
    .await
    .map_err(|e| PipelineError::Collaborator(format!("artifact render failed: {e}")))?;

    let row = trendforge_db::insert_product(
        pool,
        &trendforge_db::NewProduct {
            name,
            kind,
            keyword: keyword.to_string(),
            link: Some(link.clone()),
        },
    )
    .await?;

    tracing::info!(product_id = row.id, keyword, link = %link, "product draft created");

    Ok(CreateOutcome {
        product_id: row.id,
        name: row.name,
        link,
    })
}
