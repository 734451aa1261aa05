//! Error types exposed by the GitHub and reporting layers.

use thiserror::Error;

/// Errors surfaced while loading configuration, talking to GitHub, or
/// writing report artefacts.
///
/// External scorer failures are deliberately absent from this enum: they
/// degrade into placeholder outcomes (see [`crate::ai::ScoreOutcome`])
/// instead of propagating as errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    /// A repository owner or name segment was empty.
    #[error("repository identifier must not be empty")]
    MissingRepositorySegment,

    /// The authentication token was missing.
    #[error("access token is required")]
    MissingToken,

    /// A URL could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling an external service.
    #[error("network error: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}
