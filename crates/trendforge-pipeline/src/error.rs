use thiserror::Error;

/// Stage-level failures surfaced to operators as structured payloads.
///
/// Collaborator failures never crash the orchestrator: they are caught at
/// the stage boundary, written to the activity ledger, and returned here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Research could not store a single trend — every keyword came back
    /// without usable readings.
    #[error("research found no usable signals for any keyword")]
    InsufficientData,

    /// The operator selected a keyword that is not in the latest run.
    #[error("keyword '{0}' is not in the latest research run")]
    KeywordNotFound(String),

    /// Publishing was requested but no product exists yet.
    #[error("no product available to publish; run the create stage first")]
    NoProduct,

    /// An illegal stage transition, e.g. publishing a non-draft product.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An external collaborator kept failing after retries were exhausted.
    #[error("collaborator failure: {0}")]
    Collaborator(String),

    /// The operator asked the in-flight stage to stop; it aborted between
    /// collaborator calls.
    #[error("stage aborted by operator")]
    Aborted,

    #[error(transparent)]
    Db(#[from] trendforge_db::DbError),
}
