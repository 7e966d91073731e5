//! Authentication gate for guest-blocked actions.

use crate::{RedirectIntent, RedirectStore, SessionContext, SessionResult};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a guarded action.
#[derive(Debug)]
pub enum GuardOutcome<T> {
    /// Caller was authenticated; the action ran to completion.
    Performed(T),
    /// Caller is a guest; the intent was recorded and a login prompt
    /// should be shown instead.
    LoginRequired,
}

impl<T> GuardOutcome<T> {
    /// Whether the action actually ran.
    pub fn performed(&self) -> bool {
        matches!(self, GuardOutcome::Performed(_))
    }
}

/// Policy layer in front of authenticated mutations.
///
/// Authenticated callers pass straight through; guests get their intent
/// recorded for post-login resumption and never reach the network.
#[derive(Clone)]
pub struct AuthGate {
    session: Arc<SessionContext>,
    redirects: RedirectStore,
}

impl AuthGate {
    /// Create a gate over the given session and redirect store.
    pub fn new(session: Arc<SessionContext>, redirects: RedirectStore) -> Self {
        Self { session, redirects }
    }

    /// Run `action` if authenticated; otherwise record `intent` and
    /// report that login is required.
    pub async fn guard<F, Fut, T>(
        &self,
        intent: RedirectIntent,
        action: F,
    ) -> SessionResult<GuardOutcome<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if self.session.is_authenticated() {
            return Ok(GuardOutcome::Performed(action().await));
        }

        debug!(?intent, "Guest action blocked, recording redirect intent");
        self.redirects.set(&intent)?;
        Ok(GuardOutcome::LoginRequired)
    }

    /// The redirect store, for post-login resumption.
    pub fn redirects(&self) -> &RedirectStore {
        &self.redirects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goll_storage::MemoryStorage;

    fn gate(session: Arc<SessionContext>) -> AuthGate {
        AuthGate::new(session, RedirectStore::new(Arc::new(MemoryStorage::new())))
    }

    #[tokio::test]
    async fn test_authenticated_action_runs() {
        let session = Arc::new(SessionContext::new());
        session.set_access_token("tok");
        let gate = gate(session);

        let outcome = gate
            .guard(RedirectIntent::detail(7), || async { 41 + 1 })
            .await
            .unwrap();

        match outcome {
            GuardOutcome::Performed(v) => assert_eq!(v, 42),
            GuardOutcome::LoginRequired => panic!("action should have run"),
        }
        // No intent left behind.
        assert!(gate.redirects().take().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_guest_action_records_intent() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let session = Arc::new(SessionContext::new());
        let gate = gate(session);

        let ran = Arc::new(AtomicBool::new(false));
        let ran_inner = ran.clone();
        let outcome = gate
            .guard(RedirectIntent::detail(42), || async move {
                ran_inner.store(true, Ordering::SeqCst);
            })
            .await
            .unwrap();

        assert!(!outcome.performed());
        assert!(!ran.load(Ordering::SeqCst));
        let intent = gate.redirects().take().unwrap().unwrap();
        assert_eq!(intent.goll_id(), Some(42));
        // Read-once.
        assert!(gate.redirects().take().unwrap().is_none());
    }
}
