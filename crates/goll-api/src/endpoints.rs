//! Typed endpoint wrappers over the coordinator.

use crate::models::{
    Goll, GollDraft, GollStatus, LikeResponse, Page, UserProfile, VoteResponse,
};
use crate::transport::ApiRequest;
use crate::{ApiResult, RequestCoordinator};
use goll_session::SessionContext;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
}

/// The goll backend API surface.
#[derive(Clone)]
pub struct GollApi {
    coordinator: Arc<RequestCoordinator>,
}

impl GollApi {
    /// Create the API over a coordinator.
    pub fn new(coordinator: Arc<RequestCoordinator>) -> Self {
        Self { coordinator }
    }

    /// The underlying coordinator.
    pub fn coordinator(&self) -> &Arc<RequestCoordinator> {
        &self.coordinator
    }

    /// The shared session context.
    pub fn session(&self) -> &Arc<SessionContext> {
        self.coordinator.session()
    }

    /// Exchange a temporary authorization code for an access credential
    /// and install it in the session.
    pub async fn exchange_code(&self, code: &str) -> ApiResult<String> {
        let request = ApiRequest::post("/auth/token/exchange", Some(json!({ "code": code })));
        let response = self.coordinator.send(request).await?;
        let body: TokenResponse = response.json()?;
        self.session().set_access_token(body.access_token.clone());
        info!("Logged in via code exchange");
        Ok(body.access_token)
    }

    /// Sign out: best-effort server call, then clear the local session.
    /// The local session ends even when the server call fails.
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self
            .coordinator
            .send(ApiRequest::post("/auth/logout", None))
            .await;
        self.session().reset();
        if let Err(e) = result {
            warn!(error = %e, "Server logout failed, session cleared locally");
        }
        info!("Logged out");
        Ok(())
    }

    /// Fetch the authenticated user's profile.
    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.coordinator
            .send(ApiRequest::get("/users/me"))
            .await?
            .json()
    }

    /// List golls, newest first.
    pub async fn list_golls(&self, page: u32, size: u32) -> ApiResult<Page<Goll>> {
        self.coordinator
            .send(ApiRequest::get(format!("/golls?page={}&size={}", page, size)))
            .await?
            .json()
    }

    /// Fetch one goll with viewer-specific like/vote state.
    pub async fn get_goll(&self, id: u64) -> ApiResult<Goll> {
        self.coordinator
            .send(ApiRequest::get(format!("/golls/{}", id)))
            .await?
            .json()
    }

    /// Publish a new goll.
    pub async fn create_goll(&self, draft: &GollDraft) -> ApiResult<Goll> {
        let body = serde_json::to_value(draft)?;
        self.coordinator
            .send(ApiRequest::post("/golls", Some(body)))
            .await?
            .json()
    }

    /// Replace a goll's editable fields.
    pub async fn update_goll(&self, id: u64, draft: &GollDraft) -> ApiResult<Goll> {
        let body = serde_json::to_value(draft)?;
        self.coordinator
            .send(ApiRequest::put(format!("/golls/{}", id), body))
            .await?
            .json()
    }

    /// Change a goll's status (e.g. archive it).
    pub async fn set_status(&self, id: u64, status: GollStatus) -> ApiResult<Goll> {
        let body = json!({ "status": status });
        self.coordinator
            .send(ApiRequest::patch(format!("/golls/{}", id), body))
            .await?
            .json()
    }

    /// Toggle the viewer's like on a goll; returns authoritative state.
    pub async fn like(&self, id: u64) -> ApiResult<LikeResponse> {
        self.coordinator
            .send(ApiRequest::post(format!("/golls/{}/like", id), None))
            .await?
            .json()
    }

    /// Cast, switch, or retract a vote. The server resolves the intent
    /// and returns the full authoritative count map.
    pub async fn vote(&self, id: u64, participant_id: u64) -> ApiResult<VoteResponse> {
        self.coordinator
            .send(ApiRequest::post(
                format!("/golls/{}/participants/{}/vote", id, participant_id),
                None,
            ))
            .await?
            .json()
    }
}
