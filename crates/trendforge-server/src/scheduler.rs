//! Background job scheduler.
//!
//! Registers the optional recurring research run at server startup. The
//! schedule comes from configuration; when unset, no jobs run and the
//! operator drives every stage by hand.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use trendforge_core::AppConfig;
use trendforge_pipeline::Orchestrator;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the configured cron expression is invalid, or the scheduler fails to
/// start.
pub async fn build_scheduler(
    orchestrator: Arc<Orchestrator>,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    if let Some(schedule) = &config.research_schedule {
        register_research_job(&scheduler, orchestrator, schedule).await?;
    } else {
        tracing::info!("no research schedule configured; scheduler idle");
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring research run.
///
/// The orchestrator's own stage lock serialises a scheduled run against a
/// manual one; a failed run is logged and the schedule simply fires again
/// next time.
async fn register_research_job(
    scheduler: &JobScheduler,
    orchestrator: Arc<Orchestrator>,
    schedule: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let orchestrator = Arc::clone(&orchestrator);

        Box::pin(async move {
            tracing::info!("scheduler: starting scheduled research run");
            match orchestrator.research().await {
                Ok(outcome) => {
                    tracing::info!(
                        run_id = %outcome.run_id,
                        stored = outcome.stored,
                        "scheduler: research run complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: research run failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule = %schedule, "scheduler: research job registered");
    Ok(())
}
