//! Feed mutation error types.

use goll_api::ApiError;
use thiserror::Error;

/// Error type for feed view mutations.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The mutation is not allowed in the goll's current state.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The underlying API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FeedError {
    /// True when the failure means the viewer's session is over and a
    /// fresh login is required.
    pub fn is_session_ended(&self) -> bool {
        matches!(self, FeedError::Api(e) if e.is_session_ended())
    }
}

/// Result type alias using FeedError.
pub type FeedResult<T> = Result<T, FeedError>;
