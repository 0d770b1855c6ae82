//! Errors returned by pipeline services.

use thiserror::Error;

/// Errors that can occur in any of the three pipeline services.
///
/// `Clone` so a failure can be both recorded in the store and returned to
/// the caller.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The call did not complete within its time limit.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-success HTTP status.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response could not be parsed as expected JSON.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The response had no usable content.
    #[error("service returned an empty response")]
    EmptyResponse,

    /// The result violates the stage contract (wrong back-reference,
    /// missing optimized prompt, ...).
    #[error("contract violation: {0}")]
    Contract(String),
}

/// Coarse classification of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Retrying later may succeed (timeouts, transport errors, 5xx, 429).
    Transient,
    /// Retrying with the same input will fail again.
    Permanent,
}

impl ServiceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ServiceError::Request(_) | ServiceError::Timeout => FailureKind::Transient,
            ServiceError::Status { status, .. } if *status >= 500 || *status == 429 => {
                FailureKind::Transient
            }
            _ => FailureKind::Permanent,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Timeout
        } else if e.is_decode() {
            ServiceError::Parse(e.to_string())
        } else {
            ServiceError::Request(e.to_string())
        }
    }
}
