//! Authenticated request pipeline for the goll backend.
//!
//! Every outbound call goes through the [`RequestCoordinator`], which
//! attaches the current access credential and owns the single-flight
//! refresh-and-retry protocol: when concurrent requests hit an expired
//! credential, exactly one refresh runs and every blocked request resumes
//! with its result, in arrival order.
//!
//! The wire transport is pluggable: [`transport::HttpTransport`] talks to
//! the real backend over reqwest, [`transport::MemoryTransport`] is a
//! seeded in-process fake used by tests and the demo mode.

mod coordinator;
mod endpoints;
mod error;
mod models;
mod refresh_queue;
pub mod transport;

pub use coordinator::RequestCoordinator;
pub use endpoints::GollApi;
pub use error::{ApiError, ApiResult};
pub use models::{
    Goll, GollDraft, GollStatus, LikeResponse, MatchType, Page, Participant, ParticipantDraft,
    ParticipantKind, UserProfile, VoteResponse,
};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, MemoryTransport, Method, Transport};
