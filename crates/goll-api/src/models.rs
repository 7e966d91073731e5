//! Wire models for the goll backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whether a participant is a single rider or a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Individual,
    Team,
}

/// A participant in a goll; `votes` is server-side ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParticipantKind,
    #[serde(default)]
    pub votes: u64,
}

/// Match format of a goll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Head-to-head, exactly two participants.
    Vs,
    /// Open field.
    Multi,
}

/// Publication status of a goll. Archived golls reject likes and votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GollStatus {
    Active,
    Archived,
}

impl GollStatus {
    pub fn is_archived(&self) -> bool {
        matches!(self, GollStatus::Archived)
    }
}

/// A published match log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goll {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub match_type: MatchType,
    pub status: GollStatus,
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Total like count, server-side ground truth.
    #[serde(default)]
    pub likes: u64,
    /// Whether the current viewer has liked this goll.
    #[serde(default)]
    pub liked: bool,
    /// The participant the current viewer has voted for, if any.
    #[serde(default)]
    pub user_vote_id: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields supplied when creating or updating a goll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GollDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub match_type: MatchType,
    pub participants: Vec<ParticipantDraft>,
}

/// Participant fields within a [`GollDraft`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParticipantKind,
}

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

/// Authoritative like state returned by `POST /golls/:id/like`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes: u64,
}

/// Authoritative vote state returned by the vote endpoint. The count map
/// always covers every participant of the goll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub voted_participant_id: Option<u64>,
    pub vote_counts: HashMap<u64, u64>,
}
