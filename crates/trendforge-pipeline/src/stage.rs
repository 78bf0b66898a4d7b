//! Typed stage outcomes.
//!
//! Each pipeline invocation walks one stage's state machine:
//!
//! - Research: `Idle → Researching → Researched | Failed`
//! - Create:   `Researched → Creating → Created | Failed`
//! - Publish:  `Created → Publishing → Published | PartiallyPublished | Failed`
//!
//! Entering and leaving a stage each append exactly one activity-ledger
//! entry, on success and failure alike. Stage re-entry (retrying research)
//! always starts a new run id; completed runs are never mutated.

use trendforge_publish::PublishOutcome;

/// Terminal state of one research run.
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    pub run_id: String,
    /// Trends stored in this run.
    pub stored: usize,
    /// Collapsing low-score trends the aggregator chose to drop.
    pub dropped: usize,
    /// Keywords with no usable readings (every source failed or timed out).
    pub skipped: usize,
}

/// Terminal state of one create-stage invocation.
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub product_id: i64,
    pub name: String,
    pub link: String,
}

/// How the publish stage ended, derived from per-platform outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStageStatus {
    /// Every requested platform succeeded.
    Published,
    /// At least one platform succeeded, at least one failed.
    PartiallyPublished,
    /// Every requested platform failed.
    Failed,
}

impl std::fmt::Display for PublishStageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishStageStatus::Published => write!(f, "published"),
            PublishStageStatus::PartiallyPublished => write!(f, "partially published"),
            PublishStageStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Terminal state of one publish-stage invocation. Per-platform detail is
/// always preserved — partial failure is a result, not an error.
#[derive(Debug, Clone)]
pub struct PublishStageOutcome {
    pub product_id: i64,
    pub product_name: String,
    pub status: PublishStageStatus,
    pub results: Vec<PublishOutcome>,
}

impl PublishStageOutcome {
    /// Derive the stage status from per-platform outcomes.
    #[must_use]
    pub fn status_from(results: &[PublishOutcome]) -> PublishStageStatus {
        let succeeded = results.iter().filter(|r| r.success).count();
        if succeeded == results.len() && !results.is_empty() {
            PublishStageStatus::Published
        } else if succeeded > 0 {
            PublishStageStatus::PartiallyPublished
        } else {
            PublishStageStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendforge_core::Platform;

    fn outcome(platform: Platform, success: bool) -> PublishOutcome {
        PublishOutcome {
            platform,
            success,
            url: success.then(|| "https://example.com".to_string()),
            error: (!success).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn all_successes_mean_published() {
        let results = [outcome(Platform::Etsy, true), outcome(Platform::Pinterest, true)];
        assert_eq!(
            PublishStageOutcome::status_from(&results),
            PublishStageStatus::Published
        );
    }

    #[test]
    fn mixed_results_mean_partially_published() {
        let results = [outcome(Platform::Etsy, true), outcome(Platform::Pinterest, false)];
        assert_eq!(
            PublishStageOutcome::status_from(&results),
            PublishStageStatus::PartiallyPublished
        );
    }

    #[test]
    fn no_successes_mean_failed() {
        let results = [outcome(Platform::Etsy, false)];
        assert_eq!(
            PublishStageOutcome::status_from(&results),
            PublishStageStatus::Failed
        );
        assert_eq!(PublishStageOutcome::status_from(&[]), PublishStageStatus::Failed);
    }
}
