//! The converging per-goll view state.

use goll_api::{Goll, LikeResponse, VoteResponse};
use goll_live::StreamEvent;
use std::collections::HashMap;
use tracing::debug;

/// Counters and viewer selections for one goll, as currently rendered.
///
/// Server responses and stream events replace these fields wholesale;
/// only the like controller ever writes a speculative value, and it
/// restores the exact prior value if the server says no.
#[derive(Debug, Clone, PartialEq)]
pub struct GollViewState {
    pub goll_id: u64,
    pub archived: bool,
    pub liked: bool,
    pub likes: u64,
    pub user_vote_id: Option<u64>,
    pub vote_counts: HashMap<u64, u64>,
}

impl GollViewState {
    /// Build the view from a fetched goll snapshot.
    pub fn from_goll(goll: &Goll) -> Self {
        let vote_counts = goll
            .participants
            .iter()
            .map(|p| (p.id, p.votes))
            .collect();
        Self {
            goll_id: goll.id,
            archived: goll.status.is_archived(),
            liked: goll.liked,
            likes: goll.likes,
            user_vote_id: goll.user_vote_id,
            vote_counts,
        }
    }

    /// Votes currently shown for a participant. Participants absent from
    /// the count map render as zero.
    pub fn votes_for(&self, participant_id: u64) -> u64 {
        self.vote_counts.get(&participant_id).copied().unwrap_or(0)
    }

    pub fn total_votes(&self) -> u64 {
        self.vote_counts.values().sum()
    }

    /// Apply a live stream event. Events for other golls are ignored;
    /// returns whether the view changed.
    pub fn apply_stream_event(&mut self, event: &StreamEvent) -> bool {
        if event.goll_id() != self.goll_id {
            debug!(
                got = event.goll_id(),
                want = self.goll_id,
                "Ignoring stream event for another goll"
            );
            return false;
        }
        match event {
            StreamEvent::LikeUpdate { likes, .. } => {
                self.likes = *likes;
            }
            StreamEvent::VoteUpdate { vote_counts, .. } => {
                // Full replacement: counts absent from the event are gone,
                // not carried over.
                self.vote_counts = vote_counts.clone();
            }
        }
        true
    }

    /// Apply the authoritative answer to a like toggle.
    pub fn apply_like_response(&mut self, response: &LikeResponse) {
        self.liked = response.liked;
        self.likes = response.likes;
    }

    /// Apply the authoritative answer to a vote. The selection and the
    /// whole count map come from the server.
    pub fn apply_vote_response(&mut self, response: &VoteResponse) {
        self.user_vote_id = response.voted_participant_id;
        self.vote_counts = response.vote_counts.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> GollViewState {
        GollViewState {
            goll_id: 1,
            archived: false,
            liked: false,
            likes: 10,
            user_vote_id: None,
            vote_counts: HashMap::from([(1, 4), (2, 6)]),
        }
    }

    #[test]
    fn test_stream_event_for_other_goll_is_ignored() {
        let mut state = view();
        let changed = state.apply_stream_event(&StreamEvent::LikeUpdate {
            goll_id: 2,
            likes: 99,
        });
        assert!(!changed);
        assert_eq!(state.likes, 10);
    }

    #[test]
    fn test_vote_update_replaces_the_whole_map() {
        let mut state = view();
        let changed = state.apply_stream_event(&StreamEvent::VoteUpdate {
            goll_id: 1,
            vote_counts: HashMap::from([(2, 7)]),
        });
        assert!(changed);
        // Participant 1 is no longer in the map and renders as zero.
        assert_eq!(state.votes_for(1), 0);
        assert_eq!(state.votes_for(2), 7);
        assert_eq!(state.total_votes(), 7);
    }

    #[test]
    fn test_like_update_sets_the_counter() {
        let mut state = view();
        state.apply_stream_event(&StreamEvent::LikeUpdate {
            goll_id: 1,
            likes: 11,
        });
        assert_eq!(state.likes, 11);
        // The viewer's own liked flag is not part of the broadcast.
        assert!(!state.liked);
    }

    #[test]
    fn test_vote_response_replaces_selection_and_counts() {
        let mut state = view();
        state.apply_vote_response(&goll_api::VoteResponse {
            voted_participant_id: Some(2),
            vote_counts: HashMap::from([(1, 4), (2, 7)]),
        });
        assert_eq!(state.user_vote_id, Some(2));
        assert_eq!(state.votes_for(2), 7);
    }
}
