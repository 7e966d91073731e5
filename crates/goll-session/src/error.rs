//! Session error types.

use thiserror::Error;

/// Error type for session and redirect-intent operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] goll_storage::StorageError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using SessionError.
pub type SessionResult<T> = Result<T, SessionError>;
