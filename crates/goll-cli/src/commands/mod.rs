//! CLI command implementations.

mod auth;
mod golls;

pub use auth::{login, logout, status};
pub use golls::{feed, like, show, vote};

use anyhow::Result;
use goll_api::{GollApi, HttpTransport, MemoryTransport, RequestCoordinator, Transport};
use goll_config::{Config, Paths, TransportKind};
use goll_session::{AuthGate, RedirectStore, SessionContext};
use goll_storage::{ClientStorage, FileStorage, StorageKeys};
use std::sync::Arc;
use tracing::warn;

/// Everything a command needs, wired once at startup.
pub struct App {
    pub config: Config,
    pub api: GollApi,
    pub session: Arc<SessionContext>,
    pub gate: AuthGate,
    pub in_memory: bool,
    storage: Arc<dyn ClientStorage>,
}

impl App {
    /// Load configuration, pick the transport, and build the request
    /// pipeline. The durable state file seeds the session with the
    /// credential from the previous invocation, if any.
    pub fn build(memory_flag: bool, log_level: Option<&str>) -> Result<Self> {
        let paths = Paths::new()?;
        let config = Config::load(&paths)?;
        goll_config::init_logging(log_level.unwrap_or(&config.log_level));

        let in_memory = memory_flag || config.transport == TransportKind::Memory;
        let transport: Arc<dyn Transport> = if in_memory {
            Arc::new(MemoryTransport::seeded())
        } else {
            Arc::new(HttpTransport::new(&config.api_base_url))
        };

        paths.ensure_base_dir()?;
        let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::new(paths.state_file()));

        let session = Arc::new(SessionContext::new());
        if let Some(token) = storage.get(StorageKeys::ACCESS_TOKEN)? {
            session.set_access_token(token);
        }

        let coordinator = Arc::new(RequestCoordinator::new(transport, session.clone()));
        let api = GollApi::new(coordinator);
        let gate = AuthGate::new(session.clone(), RedirectStore::new(storage.clone()));

        Ok(Self {
            config,
            api,
            session,
            gate,
            in_memory,
            storage,
        })
    }

    /// Write the current (possibly refreshed) credential back to the
    /// state file so the next invocation picks up the session.
    pub fn persist_session(&self) {
        let result = match self.session.access_token() {
            Some(token) => self.storage.set(StorageKeys::ACCESS_TOKEN, &token),
            None => self.storage.delete(StorageKeys::ACCESS_TOKEN).map(|_| ()),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session state");
        }
    }
}
