//! Pipeline orchestration: Research → Create → Publish against idempotent
//! persisted state, with typed stage outcomes and an append-only ledger.

pub mod create;
pub mod error;
pub mod orchestrator;
pub mod publish;
pub mod render;
pub mod research;
pub mod stage;
pub mod templates;

pub use error::PipelineError;
pub use orchestrator::Orchestrator;
pub use render::{
    ArtifactRenderer, ArtifactSpec, HttpSheetsRenderer, LocalArtifactRenderer, RenderError,
};
pub use stage::{CreateOutcome, PublishStageOutcome, PublishStageStatus, ResearchOutcome};
