//! Fan-out of one product draft to the requested platforms.
//!
//! Each platform's attempt is independent: failures are captured as
//! per-platform outcomes, never as an exception that unwinds the whole
//! dispatch. Partial failure is a first-class result.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use trendforge_core::{Platform, ProductKind, ProductStatus};

use crate::error::PublishError;

/// Read-only view of a product, enough for a publisher to act on.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    pub kind: ProductKind,
    pub keyword: String,
    pub link: Option<String>,
    pub status: ProductStatus,
}

/// One platform's publish capability.
#[async_trait]
pub trait PlatformPublisher: Send + Sync {
    fn platform(&self) -> Platform;

    /// Publish the draft and return the resulting public URL.
    async fn publish(&self, product: &ProductSnapshot) -> Result<String, PublishError>;
}

/// Immutable record of one platform's outcome.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub platform: Platform,
    pub success: bool,
    pub url: Option<String>,
    pub error: Option<String>,
}

/// Aggregated outcomes for one dispatch, in requested-platform order.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub outcomes: Vec<PublishOutcome>,
}

impl DispatchReport {
    /// True iff every requested platform succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    /// True iff at least one requested platform succeeded.
    #[must_use]
    pub fn any_succeeded(&self) -> bool {
        self.outcomes.iter().any(|o| o.success)
    }

    #[must_use]
    pub fn outcome_for(&self, platform: Platform) -> Option<&PublishOutcome> {
        self.outcomes.iter().find(|o| o.platform == platform)
    }
}

/// Bounds applied to one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    /// Platform calls in flight at once.
    pub max_concurrency: usize,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

/// Publish `product` to each requested platform.
///
/// Requested platforms run concurrently (bounded by
/// `options.max_concurrency`); per-platform transient failures are retried
/// with back-off at this call boundary. The report preserves every
/// platform's URL or error regardless of how the others fared.
///
/// # Errors
///
/// Returns [`PublishError::InvalidState`] if the product is not a draft —
/// the guard against double-publishing. Individual platform failures are
/// *not* errors; they land in the report.
pub async fn dispatch(
    publishers: &[Box<dyn PlatformPublisher>],
    product: &ProductSnapshot,
    platforms: &[Platform],
    options: DispatchOptions,
) -> Result<DispatchReport, PublishError> {
    if product.status != ProductStatus::Draft {
        return Err(PublishError::InvalidState {
            name: product.name.clone(),
            status: product.status.to_string(),
        });
    }

    let mut indexed: Vec<(usize, PublishOutcome)> =
        stream::iter(platforms.iter().copied().enumerate())
            .map(|(index, platform)| async move {
                let publisher = publishers.iter().find(|p| p.platform() == platform);
                let outcome = match publisher {
                    Some(publisher) => {
                        publish_one(publisher.as_ref(), product, options).await
                    }
                    None => PublishOutcome {
                        platform,
                        success: false,
                        url: None,
                        error: Some(format!("no publisher registered for {platform}")),
                    },
                };
                (index, outcome)
            })
            .buffer_unordered(options.max_concurrency.max(1))
            .collect()
            .await;

    indexed.sort_by_key(|(index, _)| *index);

    Ok(DispatchReport {
        outcomes: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
    })
}

/// One platform's attempt, retried on transient failure, folded into an
/// outcome either way.
async fn publish_one(
    publisher: &dyn PlatformPublisher,
    product: &ProductSnapshot,
    options: DispatchOptions,
) -> PublishOutcome {
    const MAX_DELAY_MS: u64 = 60_000;
    let platform = publisher.platform();
    let mut attempt = 0u32;

    let result = loop {
        match publisher.publish(product).await {
            Ok(url) => break Ok(url),
            Err(err) => {
                if !err.is_transient() || attempt >= options.max_retries {
                    break Err(err);
                }
                attempt += 1;
                let delay_ms = options
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10))
                    .min(MAX_DELAY_MS);
                tracing::warn!(
                    platform = %platform,
                    attempt,
                    delay_ms,
                    error = %err,
                    "transient publish error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    };

    match result {
        Ok(url) => {
            tracing::info!(platform = %platform, url = %url, "published product");
            PublishOutcome {
                platform,
                success: true,
                url: Some(url),
                error: None,
            }
        }
        Err(err) => {
            tracing::warn!(platform = %platform, error = %err, "publish failed");
            PublishOutcome {
                platform,
                success: false,
                url: None,
                error: Some(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn draft() -> ProductSnapshot {
        ProductSnapshot {
            id: 1,
            name: "Daily Planner - Web".to_string(),
            kind: ProductKind::Planner,
            keyword: "daily planner".to_string(),
            link: Some("https://sheets.local/artifacts/daily-planner".to_string()),
            status: ProductStatus::Draft,
        }
    }

    fn options() -> DispatchOptions {
        DispatchOptions {
            max_concurrency: 4,
            max_retries: 2,
            backoff_base_ms: 0,
        }
    }

    struct FixedPublisher {
        platform: Platform,
        result: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl PlatformPublisher for FixedPublisher {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn publish(&self, _product: &ProductSnapshot) -> Result<String, PublishError> {
            match self.result {
                Ok(url) => Ok(url.to_string()),
                Err(message) => Err(PublishError::Api {
                    platform: self.platform,
                    status: 403,
                    message: message.to_string(),
                }),
            }
        }
    }

    struct FlakyPublisher {
        platform: Platform,
        calls: Arc<AtomicU32>,
        fail_first: u32,
    }

    #[async_trait]
    impl PlatformPublisher for FlakyPublisher {
        fn platform(&self) -> Platform {
            self.platform
        }

        async fn publish(&self, _product: &ProductSnapshot) -> Result<String, PublishError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.fail_first {
                Err(PublishError::Api {
                    platform: self.platform,
                    status: 503,
                    message: "upstream flapping".to_string(),
                })
            } else {
                Ok("https://example.com/recovered".to_string())
            }
        }
    }

    #[tokio::test]
    async fn all_platforms_succeeding_reports_full_success() {
        let publishers: Vec<Box<dyn PlatformPublisher>> = vec![
            Box::new(FixedPublisher {
                platform: Platform::Etsy,
                result: Ok("https://www.etsy.com/listing/1"),
            }),
            Box::new(FixedPublisher {
                platform: Platform::Pinterest,
                result: Ok("https://www.pinterest.com/pin/1/"),
            }),
        ];

        let report = dispatch(
            &publishers,
            &draft(),
            &[Platform::Etsy, Platform::Pinterest],
            options(),
        )
        .await
        .expect("dispatch");

        assert!(report.all_succeeded());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[0].platform, Platform::Etsy);
    }

    #[tokio::test]
    async fn partial_failure_preserves_the_successful_url() {
        let publishers: Vec<Box<dyn PlatformPublisher>> = vec![
            Box::new(FixedPublisher {
                platform: Platform::Etsy,
                result: Ok("https://www.etsy.com/listing/9"),
            }),
            Box::new(FixedPublisher {
                platform: Platform::Pinterest,
                result: Err("board not writable"),
            }),
        ];

        let report = dispatch(
            &publishers,
            &draft(),
            &[Platform::Etsy, Platform::Pinterest],
            options(),
        )
        .await
        .expect("dispatch");

        assert!(!report.all_succeeded(), "one failure fails the whole set");
        assert!(report.any_succeeded());

        let etsy = report.outcome_for(Platform::Etsy).expect("etsy outcome");
        assert_eq!(etsy.url.as_deref(), Some("https://www.etsy.com/listing/9"));

        let pinterest = report
            .outcome_for(Platform::Pinterest)
            .expect("pinterest outcome");
        assert!(!pinterest.success);
        assert!(pinterest
            .error
            .as_deref()
            .is_some_and(|e| e.contains("board not writable")));
    }

    #[tokio::test]
    async fn non_draft_product_is_rejected_before_any_call() {
        let publishers: Vec<Box<dyn PlatformPublisher>> = vec![Box::new(FixedPublisher {
            platform: Platform::Etsy,
            result: Ok("https://www.etsy.com/listing/1"),
        })];

        let mut published = draft();
        published.status = ProductStatus::Published;

        let err = dispatch(&publishers, &published, &[Platform::Etsy], options())
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn transient_failures_are_retried_at_the_call_boundary() {
        let calls = Arc::new(AtomicU32::new(0));
        let publishers: Vec<Box<dyn PlatformPublisher>> = vec![Box::new(FlakyPublisher {
            platform: Platform::Etsy,
            calls: Arc::clone(&calls),
            fail_first: 2,
        })];

        let report = dispatch(&publishers, &draft(), &[Platform::Etsy], options())
            .await
            .expect("dispatch");

        assert!(report.all_succeeded());
        assert_eq!(calls.load(Ordering::SeqCst), 3, "2 transient failures + 1 success");
    }

    #[tokio::test]
    async fn unregistered_platform_yields_a_structured_failure() {
        let publishers: Vec<Box<dyn PlatformPublisher>> = vec![];
        let report = dispatch(&publishers, &draft(), &[Platform::Pinterest], options())
            .await
            .expect("dispatch");

        assert!(!report.any_succeeded());
        let outcome = &report.outcomes[0];
        assert!(outcome
            .error
            .as_deref()
            .is_some_and(|e| e.contains("no publisher registered")));
    }
}
