//! In-memory holder of the current access credential.

use std::sync::Mutex;
use tracing::debug;

/// Process-wide session context.
///
/// Holds the short-lived access credential in memory only; absence means
/// unauthenticated. Created once at application start and passed into the
/// request layer by `Arc`; there is no hidden global. The credential is
/// mutated only from the coordinator's response-handling path and from
/// explicit login/logout.
#[derive(Default)]
pub struct SessionContext {
    access_token: Mutex<Option<String>>,
}

impl SessionContext {
    /// Create a new, unauthenticated session context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current access credential, if any.
    pub fn access_token(&self) -> Option<String> {
        self.access_token
            .lock()
            .expect("session lock poisoned")
            .clone()
    }

    /// Replace the access credential (login, refresh, token exchange).
    pub fn set_access_token(&self, token: impl Into<String>) {
        let mut guard = self.access_token.lock().expect("session lock poisoned");
        *guard = Some(token.into());
        debug!("Access credential updated");
    }

    /// Whether a credential is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token
            .lock()
            .expect("session lock poisoned")
            .is_some()
    }

    /// Clear the credential (logout or unrecoverable refresh failure).
    ///
    /// Requests already in flight are not aborted; they fail their own
    /// credential check server-side and surface a normal error.
    pub fn reset(&self) {
        let mut guard = self.access_token.lock().expect("session lock poisoned");
        if guard.take().is_some() {
            debug!("Session cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unauthenticated() {
        let session = SessionContext::new();
        assert!(!session.is_authenticated());
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn test_set_and_reset() {
        let session = SessionContext::new();
        session.set_access_token("tok-1");
        assert!(session.is_authenticated());
        assert_eq!(session.access_token(), Some("tok-1".to_string()));

        // A new value supersedes the old one; there is never more than one.
        session.set_access_token("tok-2");
        assert_eq!(session.access_token(), Some("tok-2".to_string()));

        session.reset();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let session = SessionContext::new();
        session.reset();
        session.reset();
        assert!(!session.is_authenticated());
    }
}
