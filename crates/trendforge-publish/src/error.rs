use thiserror::Error;

use trendforge_core::Platform;

/// Errors returned by platform clients and the dispatcher.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials for the platform are not configured; publishing cannot
    /// proceed and retrying will not help.
    #[error("{platform} is not authenticated; configure its credentials first")]
    NotAuthenticated { platform: Platform },

    /// The platform API rejected the request.
    #[error("{platform} API error ({status}): {message}")]
    Api {
        platform: Platform,
        status: u16,
        message: String,
    },

    /// The product is not in a publishable state (only drafts publish).
    #[error("product '{name}' has status '{status}'; only drafts can be published")]
    InvalidState { name: String, status: String },
}

impl PublishError {
    /// Whether this error is worth retrying after a back-off delay.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            PublishError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            PublishError::Api { status, .. } => *status >= 500,
            PublishError::NotAuthenticated { .. } | PublishError::InvalidState { .. } => false,
        }
    }
}
