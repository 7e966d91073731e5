//! Durable client-side storage abstraction for the goll client.
//!
//! Holds small pieces of client state that must survive a full login round
//! trip or a process restart: the post-login redirect intent, and the access
//! credential the CLI carries between invocations. Within a running process
//! the credential lives in the session context; this layer only loads it at
//! startup and writes it back on exit.

mod file;
mod keys;
mod memory;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use traits::ClientStorage;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backing store failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
