//! Authentication error types.
//!
//! This module defines errors that can occur while decoding a stored
//! credential, monitoring its validity, or notifying the backend of a logout.
//! None of these cross the public validity API: [`TokenMonitor`] collapses
//! them to `false` or a zero remaining lifetime.
//!
//! [`TokenMonitor`]: crate::monitor::TokenMonitor

use thiserror::Error;

/// Authentication errors.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Malformed token - wrong shape or undecodable payload.
    #[error("Invalid token format: {0}")]
    InvalidTokenFormat(String),

    /// Required claim is missing or has the wrong type.
    #[error("Missing claim: {0}")]
    MissingClaim(String),

    /// Token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// No credential is stored.
    #[error("No token stored")]
    MissingToken,

    /// The best-effort logout notification failed.
    #[error("Logout notification failed: {0}")]
    LogoutFailed(String),

    /// Monitor configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AuthError {
    /// Creates an [`AuthError::InvalidTokenFormat`] error.
    #[must_use]
    pub fn invalid_token_format(message: impl Into<String>) -> Self {
        Self::InvalidTokenFormat(message.into())
    }

    /// Creates an [`AuthError::MissingClaim`] error.
    #[must_use]
    pub fn missing_claim(claim: impl Into<String>) -> Self {
        Self::MissingClaim(claim.into())
    }

    /// Creates an [`AuthError::LogoutFailed`] error.
    #[must_use]
    pub fn logout_failed(message: impl Into<String>) -> Self {
        Self::LogoutFailed(message.into())
    }

    /// Creates an [`AuthError::Config`] error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::LogoutFailed(err.to_string())
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
