//! Translation error types.
//!
//! Every variant here is retryable from the rotator's point of view: a
//! failing proxy is skipped, not reported. Only configuration errors surface
//! to callers, at construction time.

use thiserror::Error;

/// Errors raised by a single translation attempt.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranslateError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("Unexpected status {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// URL that was requested.
        url: String,
    },

    /// The body was not valid JSON.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The body was JSON but held no usable translation.
    #[error("Response contained no translation")]
    EmptyTranslation,

    /// A URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TranslateError {
    /// Creates a [`TranslateError::Http`] error.
    #[must_use]
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http(message.into())
    }

    /// Creates a [`TranslateError::InvalidUrl`] error.
    #[must_use]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl(message.into())
    }

    /// Creates a [`TranslateError::Config`] error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        TranslateError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for TranslateError {
    fn from(err: serde_json::Error) -> Self {
        TranslateError::Parse(err.to_string())
    }
}

/// Result type alias for translation operations.
pub type Result<T> = std::result::Result<T, TranslateError>;
