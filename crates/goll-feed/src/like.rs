//! The like toggle.

use crate::error::{FeedError, FeedResult};
use crate::view::GollViewState;
use crate::MutationOutcome;
use goll_api::GollApi;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Optimistic like toggle for one goll.
///
/// A tap flips the shown state immediately, then reconciles with the
/// server's answer. On failure the flip is reverted exactly. Taps that
/// land while a toggle is still in flight are dropped.
pub struct LikeController {
    api: GollApi,
    state: Arc<Mutex<GollViewState>>,
    pending: AtomicBool,
}

impl LikeController {
    pub fn new(api: GollApi, state: Arc<Mutex<GollViewState>>) -> Self {
        Self {
            api,
            state,
            pending: AtomicBool::new(false),
        }
    }

    /// Toggle the viewer's like.
    pub async fn toggle(&self) -> FeedResult<MutationOutcome> {
        if self.pending.swap(true, Ordering::SeqCst) {
            debug!("Like toggle already in flight, dropping tap");
            return Ok(MutationOutcome::InFlight);
        }
        let result = self.toggle_inner().await;
        self.pending.store(false, Ordering::SeqCst);
        result
    }

    async fn toggle_inner(&self) -> FeedResult<MutationOutcome> {
        let (goll_id, was_liked, had_likes) = {
            let mut state = self.state.lock().expect("view state lock poisoned");
            if state.archived {
                return Err(FeedError::Precondition(
                    "archived golls cannot be liked".to_string(),
                ));
            }
            let snapshot = (state.goll_id, state.liked, state.likes);
            // Optimistic flip so the tap lands instantly.
            state.liked = !state.liked;
            state.likes = if state.liked {
                state.likes + 1
            } else {
                state.likes.saturating_sub(1)
            };
            snapshot
        };

        match self.api.like(goll_id).await {
            Ok(response) => {
                self.state
                    .lock()
                    .expect("view state lock poisoned")
                    .apply_like_response(&response);
                Ok(MutationOutcome::Applied)
            }
            Err(e) => {
                warn!(goll_id, error = %e, "Like toggle rejected, reverting");
                let mut state = self.state.lock().expect("view state lock poisoned");
                state.liked = was_liked;
                state.likes = had_likes;
                Err(e.into())
            }
        }
    }
}
