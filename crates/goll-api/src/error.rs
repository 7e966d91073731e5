//! API error taxonomy.

use thiserror::Error;

/// Error type for backend API operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Credential missing or expired; handled transparently by the
    /// coordinator unless the refresh queue is saturated.
    #[error("Unauthorized")]
    Unauthorized,

    /// The session truly ended: refresh failed or the renewed credential
    /// was rejected. The only error fatal to the whole session.
    #[error("Session ended: {0}")]
    RefreshFailed(String),

    /// Input rejected by the backend (400/422).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Resource does not exist (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend failure (5xx).
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body or message.
        message: String,
    },

    /// Any other non-success status.
    #[error("Unexpected API response ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or message.
        message: String,
    },

    /// Transport-level failure below HTTP semantics.
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP client error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this error ends the session (callers should redirect to
    /// login). Everything else leaves the session intact.
    pub fn is_session_ended(&self) -> bool {
        matches!(self, ApiError::RefreshFailed(_))
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_refresh_failure_ends_session() {
        assert!(ApiError::RefreshFailed("expired".into()).is_session_ended());
        assert!(!ApiError::Unauthorized.is_session_ended());
        assert!(!ApiError::Validation("bad title".into()).is_session_ended());
        assert!(!ApiError::Server {
            status: 500,
            message: "boom".into()
        }
        .is_session_ended());
    }
}
