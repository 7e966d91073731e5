//! Named stream events and their wire envelope.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Wire name for like counter updates.
const EVENT_LIKE_UPDATE: &str = "LIKE_UPDATE";
/// Wire name for vote counter updates.
const EVENT_VOTE_UPDATE: &str = "VOTE_UPDATE";

/// A live counter update for one goll.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Authoritative like count.
    LikeUpdate { goll_id: u64, likes: u64 },
    /// Authoritative per-participant vote counts.
    VoteUpdate {
        goll_id: u64,
        vote_counts: HashMap<u64, u64>,
    },
}

impl StreamEvent {
    /// The goll this event belongs to.
    pub fn goll_id(&self) -> u64 {
        match self {
            StreamEvent::LikeUpdate { goll_id, .. } => *goll_id,
            StreamEvent::VoteUpdate { goll_id, .. } => *goll_id,
        }
    }

    /// Parse a wire frame. Unrecognized event names and malformed
    /// payloads yield `None` and are dropped by the caller.
    pub fn parse(raw: &str) -> Option<StreamEvent> {
        let envelope: Envelope = match serde_json::from_str(raw) {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "Dropping undecodable stream frame");
                return None;
            }
        };

        match envelope.event.as_str() {
            EVENT_LIKE_UPDATE => Some(StreamEvent::LikeUpdate {
                goll_id: envelope.data.goll_id,
                likes: envelope.data.likes?,
            }),
            EVENT_VOTE_UPDATE => Some(StreamEvent::VoteUpdate {
                goll_id: envelope.data.goll_id,
                vote_counts: envelope.data.vote_counts?,
            }),
            other => {
                debug!(event = %other, "Dropping unrecognized stream event");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    data: Payload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payload {
    goll_id: u64,
    #[serde(default)]
    likes: Option<u64>,
    #[serde(default)]
    vote_counts: Option<HashMap<u64, u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_like_update() {
        let event =
            StreamEvent::parse(r#"{"event":"LIKE_UPDATE","data":{"gollId":7,"likes":32}}"#)
                .unwrap();
        assert_eq!(
            event,
            StreamEvent::LikeUpdate {
                goll_id: 7,
                likes: 32
            }
        );
        assert_eq!(event.goll_id(), 7);
    }

    #[test]
    fn test_parse_vote_update() {
        let event = StreamEvent::parse(
            r#"{"event":"VOTE_UPDATE","data":{"gollId":7,"voteCounts":{"1":13,"2":8}}}"#,
        )
        .unwrap();
        match event {
            StreamEvent::VoteUpdate {
                goll_id,
                vote_counts,
            } => {
                assert_eq!(goll_id, 7);
                assert_eq!(vote_counts[&1], 13);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_kind_is_dropped() {
        assert!(
            StreamEvent::parse(r#"{"event":"VIEW_UPDATE","data":{"gollId":7,"likes":1}}"#)
                .is_none()
        );
    }

    #[test]
    fn test_malformed_frames_are_dropped() {
        assert!(StreamEvent::parse("not json").is_none());
        assert!(StreamEvent::parse(r#"{"event":"LIKE_UPDATE","data":{"gollId":7}}"#).is_none());
    }
}
