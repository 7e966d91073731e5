//! Viewer-side state for a single goll.
//!
//! [`GollViewState`] is the one copy of the counters the UI renders.
//! Mutation controllers and the live stream both write into it, and every
//! server answer is authoritative: whatever the view shows in between, it
//! converges to the last server response or stream event.

mod error;
mod like;
mod view;
mod vote;

pub use error::{FeedError, FeedResult};
pub use like::LikeController;
pub use view::GollViewState;
pub use vote::VoteController;

/// What happened to a requested mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The mutation ran; the view reflects the server's answer.
    Applied,
    /// A mutation on this control was already in flight; the tap was
    /// dropped, not queued.
    InFlight,
}
