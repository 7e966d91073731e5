//! Redirect intents: what a guest was trying to do before login.

use crate::SessionResult;
use goll_storage::{ClientStorage, StorageKeys};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Application screens a redirect intent can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Feed,
    Detail,
    MyPage,
    Login,
}

/// A remembered resume point for an action blocked by missing
/// authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectIntent {
    pub screen: Screen,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl RedirectIntent {
    /// Intent pointing at a goll detail view.
    pub fn detail(goll_id: u64) -> Self {
        Self {
            screen: Screen::Detail,
            params: Some(serde_json::json!({ "id": goll_id })),
        }
    }

    /// The goll id carried by a detail intent, if present.
    pub fn goll_id(&self) -> Option<u64> {
        self.params.as_ref()?.get("id")?.as_u64()
    }
}

/// Durable store for the pending redirect intent.
///
/// At most one intent is pending at a time: `set` overwrites any prior
/// value, and `take` is read-once: retrieving the intent clears it.
#[derive(Clone)]
pub struct RedirectStore {
    storage: Arc<dyn ClientStorage>,
}

impl RedirectStore {
    /// Create a redirect store over the given storage backend.
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self { storage }
    }

    /// Record a pending intent, replacing any previous one.
    pub fn set(&self, intent: &RedirectIntent) -> SessionResult<()> {
        let payload = serde_json::to_string(intent)?;
        self.storage.set(StorageKeys::REDIRECT_INTENT, &payload)?;
        Ok(())
    }

    /// Retrieve and clear the pending intent.
    ///
    /// A payload that fails to parse is logged and treated as absent; it
    /// is still cleared so it cannot shadow future intents.
    pub fn take(&self) -> SessionResult<Option<RedirectIntent>> {
        let payload = match self.storage.get(StorageKeys::REDIRECT_INTENT)? {
            Some(p) => p,
            None => return Ok(None),
        };
        self.storage.delete(StorageKeys::REDIRECT_INTENT)?;

        match serde_json::from_str(&payload) {
            Ok(intent) => Ok(Some(intent)),
            Err(e) => {
                warn!(error = %e, "Failed to parse stored redirect intent");
                Ok(None)
            }
        }
    }
}
