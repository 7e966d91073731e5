//! The vote control.

use crate::error::{FeedError, FeedResult};
use crate::view::GollViewState;
use crate::MutationOutcome;
use goll_api::GollApi;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Vote control for one goll.
///
/// Unlike the like toggle there is no speculative update: the server
/// resolves whether a tap casts, switches, or retracts the vote, and the
/// view takes the returned count map wholesale. Until the answer lands,
/// the counters simply keep their previous values.
pub struct VoteController {
    api: GollApi,
    state: Arc<Mutex<GollViewState>>,
    pending: AtomicBool,
}

impl VoteController {
    pub fn new(api: GollApi, state: Arc<Mutex<GollViewState>>) -> Self {
        Self {
            api,
            state,
            pending: AtomicBool::new(false),
        }
    }

    /// Vote for a participant. Tapping the current selection retracts it.
    pub async fn cast(&self, participant_id: u64) -> FeedResult<MutationOutcome> {
        if self.pending.swap(true, Ordering::SeqCst) {
            debug!("Vote already in flight, dropping tap");
            return Ok(MutationOutcome::InFlight);
        }
        let result = self.cast_inner(participant_id).await;
        self.pending.store(false, Ordering::SeqCst);
        result
    }

    async fn cast_inner(&self, participant_id: u64) -> FeedResult<MutationOutcome> {
        let goll_id = {
            let state = self.state.lock().expect("view state lock poisoned");
            if state.archived {
                return Err(FeedError::Precondition(
                    "archived golls cannot be voted on".to_string(),
                ));
            }
            if !state.vote_counts.contains_key(&participant_id) {
                return Err(FeedError::Precondition(format!(
                    "participant {} is not part of this goll",
                    participant_id
                )));
            }
            state.goll_id
        };

        match self.api.vote(goll_id, participant_id).await {
            Ok(response) => {
                self.state
                    .lock()
                    .expect("view state lock poisoned")
                    .apply_vote_response(&response);
                Ok(MutationOutcome::Applied)
            }
            Err(e) => {
                warn!(goll_id, participant_id, error = %e, "Vote rejected");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goll_api::{MemoryTransport, RequestCoordinator};
    use goll_session::SessionContext;

    async fn controller(goll_id: u64) -> (VoteController, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::seeded());
        let session = Arc::new(SessionContext::new());
        let coordinator = Arc::new(RequestCoordinator::new(transport.clone(), session));
        let api = GollApi::new(coordinator);
        api.exchange_code("demo-code").await.unwrap();
        let goll = api.get_goll(goll_id).await.unwrap();
        let state = Arc::new(Mutex::new(GollViewState::from_goll(&goll)));
        (VoteController::new(api, state), transport)
    }

    fn snapshot(controller: &VoteController) -> GollViewState {
        controller.state.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_cast_and_switch_keep_totals() {
        let (controller, _transport) = controller(1).await;
        let before = snapshot(&controller);

        controller.cast(1).await.unwrap();
        let first = snapshot(&controller);
        assert_eq!(first.user_vote_id, Some(1));
        assert_eq!(first.votes_for(1), before.votes_for(1) + 1);
        assert_eq!(first.total_votes(), before.total_votes() + 1);

        controller.cast(2).await.unwrap();
        let switched = snapshot(&controller);
        assert_eq!(switched.user_vote_id, Some(2));
        assert_eq!(switched.votes_for(1), before.votes_for(1));
        assert_eq!(switched.votes_for(2), before.votes_for(2) + 1);
        assert_eq!(switched.total_votes(), before.total_votes() + 1);
    }

    #[tokio::test]
    async fn test_tapping_the_selection_retracts_it() {
        let (controller, _transport) = controller(2).await;
        let before = snapshot(&controller);

        controller.cast(3).await.unwrap();
        controller.cast(3).await.unwrap();
        let after = snapshot(&controller);
        assert_eq!(after.user_vote_id, None);
        assert_eq!(after.vote_counts, before.vote_counts);
    }

    #[tokio::test]
    async fn test_failure_leaves_the_view_untouched() {
        let (controller, transport) = controller(1).await;
        let before = snapshot(&controller);

        transport.fail_next_mutation(500);
        let result = controller.cast(1).await;
        assert!(result.is_err());
        // No speculative delta existed, so nothing to roll back.
        assert_eq!(snapshot(&controller), before);
    }

    #[tokio::test]
    async fn test_unknown_participant_is_rejected_locally() {
        let (controller, _transport) = controller(1).await;
        let result = controller.cast(999).await;
        assert!(matches!(result, Err(FeedError::Precondition(_))));
    }

    #[tokio::test]
    async fn test_archived_goll_is_rejected_locally() {
        let (controller, _transport) = controller(3).await;
        let result = controller.cast(6).await;
        assert!(matches!(result, Err(FeedError::Precondition(_))));
    }

    #[tokio::test]
    async fn test_tap_while_pending_is_dropped() {
        let (controller, _transport) = controller(1).await;
        controller.pending.store(true, Ordering::SeqCst);

        let outcome = controller.cast(1).await.unwrap();
        assert_eq!(outcome, MutationOutcome::InFlight);
        assert_eq!(snapshot(&controller).user_vote_id, None);
    }
}
