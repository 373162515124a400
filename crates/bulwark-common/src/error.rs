//! Common error types for Bulwark components.
//!
//! A failed verification is not an error: it is a
//! [`VerificationResult::Rejected`](crate::VerificationResult) value.
//! These variants cover the surrounding plumbing.

use thiserror::Error;

/// Common errors across Bulwark components
#[derive(Debug, Error)]
pub enum BulwarkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential store read/write error
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid input/request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or wrong admin credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks the capability for this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BulwarkError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::Store(_) => 503,
            Self::InvalidInput(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<serde_json::Error> for BulwarkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Store(format!("malformed credential document: {err}"))
    }
}

impl From<std::io::Error> for BulwarkError {
    fn from(err: std::io::Error) -> Self {
        Self::Store(err.to_string())
    }
}
