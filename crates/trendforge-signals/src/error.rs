use thiserror::Error;

/// Errors returned by signal sources and the aggregator.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A source did not answer within its per-call timeout.
    #[error("source '{source_name}' timed out after {timeout_secs}s")]
    Timeout { source_name: String, timeout_secs: u64 },

    /// The search-interest API answered with an application-level error.
    #[error("search interest API error: {0}")]
    Api(String),

    /// No usable readings remained for a keyword — nothing to aggregate.
    #[error("no usable source readings for keyword '{0}'")]
    InsufficientData(String),
}

impl SignalError {
    /// Whether this error is worth retrying after a back-off delay.
    ///
    /// Retriable: timeouts, connection failures, HTTP 5xx. Application
    /// errors and empty data are not — retrying cannot fix them.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            SignalError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            SignalError::Timeout { .. } => true,
            SignalError::Api(_) | SignalError::InsufficientData(_) => false,
        }
    }
}
