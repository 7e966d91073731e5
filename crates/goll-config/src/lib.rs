//! Configuration, paths, and logging for the goll client.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, TransportKind, DEFAULT_API_BASE_URL, DEFAULT_STREAM_URL};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
