//! Research stage: collect readings per keyword, aggregate, persist.

use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::SqlitePool;
use trendforge_core::AggregatorConfig;
use trendforge_signals::sources::{collect_readings, CollectOptions, SignalSource};
use trendforge_signals::{aggregate, SignalError};

use crate::error::PipelineError;
use crate::stage::ResearchOutcome;

/// Drive one research run to completion.
///
/// Always starts a fresh run id; completed runs are never touched. Keywords
/// whose sources all fail are skipped; collapsing low-score trends are
/// dropped by the aggregator. The stage fails only when *nothing* produced
/// a usable reading.
pub(crate) async fn run_research(
    pool: &SqlitePool,
    sources: &[Box<dyn SignalSource>],
    keywords: &[String],
    config: &AggregatorConfig,
    options: CollectOptions,
    abort: &AtomicBool,
) -> Result<ResearchOutcome, PipelineError> {
    let run = trendforge_db::create_research_run(pool).await?;
    tracing::info!(run_id = %run.run_id, keywords = keywords.len(), "research run started");

    let mut stored = 0usize;
    let mut dropped = 0usize;
    let mut skipped = 0usize;

    for keyword in keywords {
        // Cooperative cancellation: only between collaborator calls, so an
        // in-flight fetch always completes.
        if abort.load(Ordering::SeqCst) {
            fail_run(pool, &run.run_id, "aborted by operator").await;
            return Err(PipelineError::Aborted);
        }

        let readings = collect_readings(sources, keyword, options).await;
        if readings.is_empty() {
            tracing::warn!(run_id = %run.run_id, keyword, "every source failed — keyword skipped");
            skipped += 1;
            continue;
        }

        let history = match trendforge_db::recent_scores(pool, keyword, 2).await {
            Ok(history) => history,
            Err(e) => {
                fail_run(pool, &run.run_id, &e.to_string()).await;
                return Err(e.into());
            }
        };

        match aggregate(keyword, &readings, &history, config) {
            Ok(Some(trend)) => {
                let new_trend = trendforge_db::NewTrend {
                    run_id: run.run_id.clone(),
                    keyword: trend.keyword,
                    score: trend.score,
                    velocity: trend.velocity,
                    category: trend.category,
                    confidence: trend.confidence,
                    confidence_score: trend.confidence_score,
                    explanation: trend.explanation,
                    sources: trend.sources,
                    readings: trend.readings,
                };
                if let Err(e) = trendforge_db::insert_trend(pool, &new_trend).await {
                    fail_run(pool, &run.run_id, &e.to_string()).await;
                    return Err(e.into());
                }
                stored += 1;
            }
            Ok(None) => {
                tracing::info!(run_id = %run.run_id, keyword, "collapsing low-score trend dropped");
                dropped += 1;
            }
            Err(SignalError::InsufficientData(_)) => {
                skipped += 1;
            }
            Err(e) => {
                // The aggregator is pure; anything else here is a bug worth
                // failing the run over rather than papering across.
                fail_run(pool, &run.run_id, &e.to_string()).await;
                return Err(PipelineError::Collaborator(e.to_string()));
            }
        }
    }

    if stored == 0 && dropped == 0 {
        fail_run(pool, &run.run_id, "no usable signals for any keyword").await;
        return Err(PipelineError::InsufficientData);
    }

    #[allow(clippy::cast_possible_wrap)]
    trendforge_db::complete_research_run(pool, &run.run_id, stored as i64).await?;
    tracing::info!(run_id = %run.run_id, stored, dropped, skipped, "research run complete");

    Ok(ResearchOutcome {
        run_id: run.run_id,
        stored,
        dropped,
        skipped,
    })
}

/// Best-effort run failure bookkeeping; the original error stays primary.
async fn fail_run(pool: &SqlitePool, run_id: &str, reason: &str) {
    if let Err(e) = trendforge_db::fail_research_run(pool, run_id, reason).await {
        tracing::error!(run_id, error = %e, "failed to mark research run as failed");
    }
}
