//! The pipeline orchestrator: owns the stores, collaborators, per-stage
//! locks, and the abort flag; writes the activity ledger around every
//! stage transition.

use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use trendforge_core::{AggregatorConfig, AppConfig, Platform};
use trendforge_publish::{
    DispatchOptions, EtsyClient, EtsyCredentials, EtsyPublisher, PinterestClient,
    PinterestCredentials, PinterestPublisher, PlatformPublisher,
};
use trendforge_signals::sources::{build_sources, CollectOptions, SignalSource};

use crate::create::create_product;
use crate::error::PipelineError;
use crate::publish::publish_latest;
use crate::render::{ArtifactRenderer, HttpSheetsRenderer, LocalArtifactRenderer};
use crate::research::run_research;
use crate::stage::{CreateOutcome, PublishStageOutcome, ResearchOutcome};

/// Ledger agent names, one per stage.
const RESEARCH_AGENT: &str = "research";
const CREATION_AGENT: &str = "creation";
const PUBLISHING_AGENT: &str = "publishing";

pub struct Orchestrator {
    pool: SqlitePool,
    sources: Vec<Box<dyn SignalSource>>,
    renderer: Box<dyn ArtifactRenderer>,
    publishers: Vec<Box<dyn PlatformPublisher>>,
    keywords: Vec<String>,
    aggregator: AggregatorConfig,
    collect: CollectOptions,
    dispatch: DispatchOptions,
    // One lock per stage, held for the stage's duration only — research on
    // one run never blocks publishing an earlier product.
    research_lock: Mutex<()>,
    create_lock: Mutex<()>,
    publish_lock: Mutex<()>,
    abort: AtomicBool,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        pool: SqlitePool,
        sources: Vec<Box<dyn SignalSource>>,
        renderer: Box<dyn ArtifactRenderer>,
        publishers: Vec<Box<dyn PlatformPublisher>>,
        keywords: Vec<String>,
        aggregator: AggregatorConfig,
        collect: CollectOptions,
        dispatch: DispatchOptions,
    ) -> Self {
        Self {
            pool,
            sources,
            renderer,
            publishers,
            keywords,
            aggregator,
            collect,
            dispatch,
            research_lock: Mutex::new(()),
            create_lock: Mutex::new(()),
            publish_lock: Mutex::new(()),
            abort: AtomicBool::new(false),
        }
    }

    /// Wire up the real collaborator set from configuration.
    ///
    /// Simulated sources are always present; the HTTP search-interest
    /// source, the sheets bridge, and platform credentials join when
    /// configured. Unconfigured platforms still get a publisher so a
    /// publish request yields a structured `NotAuthenticated` outcome.
    #[must_use]
    pub fn from_config(pool: SqlitePool, config: &AppConfig, keywords: Vec<String>) -> Self {
        let sources = build_sources(config);

        let renderer: Box<dyn ArtifactRenderer> = match &config.sheets_bridge_url {
            Some(url) => Box::new(HttpSheetsRenderer::new(
                url.clone(),
                config.source_timeout_secs,
            )),
            None => Box::new(LocalArtifactRenderer::new(config.artifact_base_url.clone())),
        };

        let etsy_client = match (
            &config.etsy_api_key,
            &config.etsy_access_token,
            &config.etsy_shop_id,
        ) {
            (Some(api_key), Some(access_token), Some(shop_id)) => Some(EtsyClient::new(
                EtsyCredentials {
                    api_key: api_key.clone(),
                    access_token: access_token.clone(),
                    shop_id: shop_id.clone(),
                },
                config.source_timeout_secs,
            )),
            _ => None,
        };

        let pinterest_client = match (&config.pinterest_access_token, &config.pinterest_board_id) {
            (Some(access_token), Some(board_id)) => Some(PinterestClient::new(
                PinterestCredentials {
                    access_token: access_token.clone(),
                    board_id: board_id.clone(),
                },
                config.source_timeout_secs,
            )),
            _ => None,
        };

        let publishers: Vec<Box<dyn PlatformPublisher>> = vec![
            Box::new(EtsyPublisher::new(etsy_client, config.etsy_price_cents)),
            Box::new(PinterestPublisher::new(pinterest_client)),
        ];

        Self::new(
            pool,
            sources,
            renderer,
            publishers,
            keywords,
            config.aggregator.clone(),
            CollectOptions::from(config),
            DispatchOptions {
                max_concurrency: config.publish_max_concurrency,
                max_retries: config.collaborator_max_retries,
                backoff_base_ms: config.collaborator_backoff_base_ms,
            },
        )
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Ask the in-flight stage to stop at its next check point. Calls
    /// already issued to collaborators run to completion.
    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::SeqCst);
    }

    /// Run the research stage: `Idle → Researching → Researched | Failed`.
    ///
    /// Each invocation starts a new run id by design — retrying research
    /// never mutates a completed run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InsufficientData`] when no keyword produced
    /// a usable reading, [`PipelineError::Aborted`] on operator abort, or
    /// [`PipelineError::Db`] on store failure.
    pub async fn research(&self) -> Result<ResearchOutcome, PipelineError> {
        let _guard = self.research_lock.lock().await;
        self.ledger(RESEARCH_AGENT, "start", "initiating trend research")
            .await;

        let result = run_research(
            &self.pool,
            &self.sources,
            &self.keywords,
            &self.aggregator,
            self.collect,
            &self.abort,
        )
        .await;
        self.abort.store(false, Ordering::SeqCst);

        match &result {
            Ok(outcome) => {
                self.ledger(
                    RESEARCH_AGENT,
                    "success",
                    &format!(
                        "run {}: stored {} trends ({} dropped, {} skipped)",
                        outcome.run_id, outcome.stored, outcome.dropped, outcome.skipped
                    ),
                )
                .await;
            }
            Err(e) => {
                self.ledger(RESEARCH_AGENT, "error", &e.to_string()).await;
            }
        }

        result
    }

    /// Run the create stage for one operator-selected keyword:
    /// `Researched → Creating → Created | Failed`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::KeywordNotFound`] if the keyword is not in
    /// the latest run, [`PipelineError::Collaborator`] when rendering keeps
    /// failing, or [`PipelineError::Db`] on store failure.
    pub async fn create(&self, keyword: &str) -> Result<CreateOutcome, PipelineError> {
        let _guard = self.create_lock.lock().await;
        self.ledger(
            CREATION_AGENT,
            "start",
            &format!("creating product for '{keyword}'"),
        )
        .await;

        let result = create_product(
            &self.pool,
            self.renderer.as_ref(),
            keyword,
            self.collect.max_retries,
            self.collect.backoff_base_ms,
        )
        .await;

        match &result {
            Ok(outcome) => {
                self.ledger(
                    CREATION_AGENT,
                    "success",
                    &format!("created '{}' at {}", outcome.name, outcome.link),
                )
                .await;
            }
            Err(e) => {
                self.ledger(CREATION_AGENT, "error", &e.to_string()).await;
            }
        }

        result
    }

    /// Run the publish stage for the latest product:
    /// `Created → Publishing → Published | PartiallyPublished | Failed`.
    ///
    /// An all-platforms-failed dispatch is a *returned outcome* (`Failed`),
    /// not an `Err` — per-platform detail always reaches the caller.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoProduct`] when nothing was ever created,
    /// [`PipelineError::InvalidState`] when the latest product is no longer
    /// a draft (the double-publish guard), or [`PipelineError::Db`] on
    /// store failure.
    pub async fn publish(
        &self,
        platforms: &[Platform],
    ) -> Result<PublishStageOutcome, PipelineError> {
        let _guard = self.publish_lock.lock().await;
        let platform_list = platforms
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.ledger(
            PUBLISHING_AGENT,
            "start",
            &format!("publishing latest product to {platform_list}"),
        )
        .await;

        let result = publish_latest(&self.pool, &self.publishers, platforms, self.dispatch).await;

        match &result {
            Ok(outcome) => {
                let detail = outcome
                    .results
                    .iter()
                    .map(|r| {
                        if r.success {
                            format!("{} ok", r.platform)
                        } else {
                            format!("{} failed", r.platform)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                self.ledger(
                    PUBLISHING_AGENT,
                    "complete",
                    &format!("'{}' {} ({detail})", outcome.product_name, outcome.status),
                )
                .await;
            }
            Err(e) => {
                self.ledger(PUBLISHING_AGENT, "error", &e.to_string()).await;
            }
        }

        result
    }

    /// Append one ledger entry; a ledger write failure is logged but never
    /// fails the stage that produced it.
    async fn ledger(&self, agent: &str, action: &str, result: &str) {
        if let Err(e) = trendforge_db::log_activity(&self.pool, agent, action, result).await {
            tracing::error!(agent, action, error = %e, "activity ledger write failed");
        }
    }
}
