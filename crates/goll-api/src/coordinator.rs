//! Request coordinator: credential injection plus single-flight refresh.

use crate::refresh_queue::{RefreshOutcome, RefreshQueue, RefreshRole};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use crate::{ApiError, ApiResult};
use goll_session::SessionContext;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

const AUTH_REFRESH_PATH: &str = "/auth/refresh";
const HTTP_UNAUTHORIZED: u16 = 401;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

/// Wraps every outbound backend call.
///
/// Attaches the current access credential, and on a 401 renews it exactly
/// once process-wide: the first failing request leads the refresh, every
/// concurrent failer parks on the queue, and all of them replay with the
/// renewed credential in arrival order. The session context and the queue
/// are mutated only from this response-handling path.
pub struct RequestCoordinator {
    transport: Arc<dyn Transport>,
    session: Arc<SessionContext>,
    refresh: Mutex<RefreshQueue>,
}

impl RequestCoordinator {
    /// Create a coordinator over the given transport and session.
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionContext>) -> Self {
        Self {
            transport,
            session,
            refresh: Mutex::new(RefreshQueue::new()),
        }
    }

    /// The shared session context.
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Send a request, handling credential renewal transparently.
    ///
    /// On success after a renewal the caller never observes the 401. The
    /// only session-fatal outcome is [`ApiError::RefreshFailed`]; every
    /// other error leaves the session intact.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let bearer = self.session.access_token();
        let response = self.transport.execute(request.clone(), bearer).await?;
        if response.status != HTTP_UNAUTHORIZED {
            return response.into_result();
        }

        debug!(path = %request.path, "Unauthorized, renewing credential");
        let token = match self.join_refresh() {
            RefreshRole::Leader => self.lead_refresh().await?,
            RefreshRole::Waiter(rx) => match rx.await {
                Ok(RefreshOutcome::Refreshed(token)) => token,
                Ok(RefreshOutcome::Failed(reason)) => {
                    return Err(ApiError::RefreshFailed(reason))
                }
                Err(_) => {
                    return Err(ApiError::RefreshFailed("refresh abandoned".to_string()))
                }
            },
            RefreshRole::Overflow => {
                warn!("Refresh queue full, surfacing original error");
                return Err(ApiError::Unauthorized);
            }
        };

        // Replay once with the renewed credential. A second 401 here is
        // fatal: the session is over, and no further refresh is attempted.
        let replay = self.transport.execute(request, Some(token)).await?;
        if replay.status == HTTP_UNAUTHORIZED {
            warn!("Renewed credential rejected, ending session");
            self.session.reset();
            return Err(ApiError::RefreshFailed(
                "credential rejected after refresh".to_string(),
            ));
        }
        replay.into_result()
    }

    fn join_refresh(&self) -> RefreshRole {
        self.refresh.lock().expect("refresh lock poisoned").join()
    }

    /// Run the refresh as the leader, then settle every parked waiter.
    async fn lead_refresh(&self) -> ApiResult<String> {
        let result = self.execute_refresh().await;

        let mut queue = self.refresh.lock().expect("refresh lock poisoned");
        match &result {
            Ok(token) => {
                // Store first so waiters and later requests see the new
                // credential before any of them resume.
                self.session.set_access_token(token.clone());
                debug!(waiters = queue.pending(), "Refresh succeeded, draining queue");
                queue.complete(RefreshOutcome::Refreshed(token.clone()));
            }
            Err(e) => {
                warn!(error = %e, waiters = queue.pending(), "Refresh failed, ending session");
                self.session.reset();
                queue.complete(RefreshOutcome::Failed(e.to_string()));
            }
        }
        result
    }

    /// Exchange the long-lived session (cookie-side) for a new access
    /// credential. Goes straight to the transport: the refresh call
    /// itself must never recurse into the retry protocol.
    async fn execute_refresh(&self) -> ApiResult<String> {
        let request = ApiRequest::post(AUTH_REFRESH_PATH, None);
        let response = self
            .transport
            .execute(request, None)
            .await
            .map_err(|e| ApiError::RefreshFailed(e.to_string()))?;

        if !response.is_success() {
            return Err(ApiError::RefreshFailed(format!(
                "HTTP {}: {}",
                response.status,
                response.message()
            )));
        }

        let body: RefreshResponse = response
            .json()
            .map_err(|e| ApiError::RefreshFailed(e.to_string()))?;
        Ok(body.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::BoxFuture;
    use futures_util::FutureExt;
    use serde_json::{json, Value};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;
    use tokio::time::{timeout, Duration};

    /// Scripted transport for coordinator tests: requests succeed only
    /// with a currently-valid token; refresh blocks until released.
    struct ScriptedTransport {
        valid_tokens: Mutex<HashSet<String>>,
        refresh_calls: AtomicUsize,
        refresh_gate: Semaphore,
        /// Token handed out by a successful refresh; None makes refresh
        /// fail with a 500.
        refresh_token: Option<String>,
    }

    impl ScriptedTransport {
        fn new(refresh_token: Option<&str>) -> Self {
            Self {
                valid_tokens: Mutex::new(HashSet::new()),
                refresh_calls: AtomicUsize::new(0),
                refresh_gate: Semaphore::new(0),
                refresh_token: refresh_token.map(str::to_string),
            }
        }

        fn accept(&self, token: &str) {
            self.valid_tokens
                .lock()
                .unwrap()
                .insert(token.to_string());
        }

        fn release_refresh(&self, count: usize) {
            self.refresh_gate.add_permits(count);
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(
            &self,
            request: ApiRequest,
            bearer: Option<String>,
        ) -> BoxFuture<'_, ApiResult<ApiResponse>> {
            async move {
                if request.path == AUTH_REFRESH_PATH {
                    self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                    let permit = self.refresh_gate.acquire().await.unwrap();
                    permit.forget();
                    return Ok(match &self.refresh_token {
                        Some(token) => {
                            self.accept(token);
                            ApiResponse {
                                status: 200,
                                body: json!({ "accessToken": token }),
                            }
                        }
                        None => ApiResponse {
                            status: 500,
                            body: json!({ "message": "refresh exploded" }),
                        },
                    });
                }

                let authorized = bearer
                    .as_deref()
                    .is_some_and(|t| self.valid_tokens.lock().unwrap().contains(t));
                Ok(if authorized {
                    ApiResponse {
                        status: 200,
                        body: json!({ "ok": true }),
                    }
                } else {
                    ApiResponse {
                        status: 401,
                        body: Value::Null,
                    }
                })
            }
            .boxed()
        }
    }

    fn coordinator(
        transport: Arc<ScriptedTransport>,
    ) -> (Arc<RequestCoordinator>, Arc<SessionContext>) {
        let session = Arc::new(SessionContext::new());
        session.set_access_token("stale");
        let coordinator = Arc::new(RequestCoordinator::new(transport, session.clone()));
        (coordinator, session)
    }

    async fn wait_for_pending(coordinator: &RequestCoordinator, expected: usize) {
        timeout(Duration::from_secs(5), async {
            loop {
                {
                    let queue = coordinator.refresh.lock().unwrap();
                    if queue.in_flight() && queue.pending() == expected {
                        return;
                    }
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("waiters never queued");
    }

    #[tokio::test]
    async fn test_single_flight_refresh_with_concurrent_failures() {
        let transport = Arc::new(ScriptedTransport::new(Some("fresh")));
        let (coordinator, session) = coordinator(transport.clone());

        let mut handles = Vec::new();
        for i in 0..5 {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                coordinator
                    .send(ApiRequest::get(format!("/golls/{}", i)))
                    .await
            }));
        }

        // All five got their 401: one leads, four are parked.
        wait_for_pending(&coordinator, 4).await;
        transport.release_refresh(1);

        for handle in handles {
            let response = handle.await.unwrap().unwrap();
            assert_eq!(response.status, 200);
        }

        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.access_token(), Some("fresh".to_string()));
        assert_eq!(coordinator.refresh.lock().unwrap().pending(), 0);
    }

    #[tokio::test]
    async fn test_refresh_failure_fails_all_and_clears_session() {
        let transport = Arc::new(ScriptedTransport::new(None));
        let (coordinator, session) = coordinator(transport.clone());

        let mut handles = Vec::new();
        for _ in 0..3 {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                coordinator.send(ApiRequest::get("/golls/1")).await
            }));
        }

        wait_for_pending(&coordinator, 2).await;
        transport.release_refresh(1);

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(matches!(result, Err(ApiError::RefreshFailed(_))));
        }

        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert!(!session.is_authenticated());
    }

    /// Wrapper whose refresh mints a token the backend then revokes
    /// immediately, so the replayed request 401s again.
    struct RejectAfterRefresh(Arc<ScriptedTransport>);

    impl Transport for RejectAfterRefresh {
        fn execute(
            &self,
            request: ApiRequest,
            bearer: Option<String>,
        ) -> BoxFuture<'_, ApiResult<ApiResponse>> {
            let inner = self.0.clone();
            async move {
                let response = inner.execute(request.clone(), bearer).await?;
                if request.path == AUTH_REFRESH_PATH {
                    inner.valid_tokens.lock().unwrap().clear();
                }
                Ok(response)
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_no_second_refresh_after_retry() {
        // Refresh succeeds but the backend rejects the renewed token too
        // (session revoked server-side): the replayed 401 must end the
        // session without another refresh attempt.
        let transport = Arc::new(ScriptedTransport::new(Some("fresh")));
        transport.release_refresh(8);

        let session = Arc::new(SessionContext::new());
        session.set_access_token("stale");
        let coordinator = RequestCoordinator::new(
            Arc::new(RejectAfterRefresh(transport.clone())),
            session.clone(),
        );

        let result = coordinator.send(ApiRequest::get("/golls/1")).await;

        assert!(matches!(result, Err(ApiError::RefreshFailed(_))));
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_success_path_does_not_touch_refresh() {
        let transport = Arc::new(ScriptedTransport::new(Some("unused")));
        transport.accept("stale");
        let (coordinator, _session) = coordinator(transport.clone());

        let response = coordinator.send(ApiRequest::get("/golls/1")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_auth_errors_pass_through_and_keep_session() {
        struct FlakyTransport;
        impl Transport for FlakyTransport {
            fn execute(
                &self,
                _request: ApiRequest,
                _bearer: Option<String>,
            ) -> BoxFuture<'_, ApiResult<ApiResponse>> {
                async {
                    Ok(ApiResponse {
                        status: 500,
                        body: json!({ "message": "db down" }),
                    })
                }
                .boxed()
            }
        }

        let session = Arc::new(SessionContext::new());
        session.set_access_token("tok");
        let coordinator = RequestCoordinator::new(Arc::new(FlakyTransport), session.clone());

        let result = coordinator.send(ApiRequest::get("/golls/1")).await;
        assert!(matches!(result, Err(ApiError::Server { status: 500, .. })));
        assert!(session.is_authenticated());
    }
}
