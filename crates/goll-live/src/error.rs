//! Stream error types.

use thiserror::Error;

/// Error type for live-update streams.
///
/// Stream errors are best-effort territory: they stop delivery but are
/// never fatal to the session or surfaced as exceptions to the viewer.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Failed to establish the connection.
    #[error("Connect failed: {0}")]
    Connect(String),

    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Malformed stream URL.
    #[error("Invalid stream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Frame could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type alias using StreamError.
pub type StreamResult<T> = Result<T, StreamError>;
