//! In-memory fake backend.
//!
//! A `Transport` implementation holding the whole backend in process
//! memory: seeded golls, token issuance and expiry, like/vote bookkeeping
//! and failure injection. Used by the test suites and the CLI's demo
//! mode instead of monkey-patching the real transport.

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::models::{
    Goll, GollDraft, GollStatus, MatchType, Participant, ParticipantKind, UserProfile,
};
use crate::ApiResult;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const DEFAULT_PAGE_SIZE: u32 = 20;

struct BackendState {
    golls: Vec<Goll>,
    next_goll_id: u64,
    next_participant_id: u64,
    /// Currently accepted bearer tokens.
    valid_tokens: HashSet<String>,
    /// Monotonic counter for issued tokens.
    issued: u64,
    /// While true, `/auth/refresh` succeeds; logout or `end_session`
    /// flips it.
    session_alive: bool,
    /// Goll ids liked by the (single) fake user.
    likes: HashSet<u64>,
    /// Goll id -> participant id voted by the fake user.
    votes: HashMap<u64, u64>,
    /// Injected status for the next like/vote mutation.
    fail_next: Option<u16>,
}

/// In-memory fake backend transport.
pub struct MemoryTransport {
    state: Mutex<BackendState>,
    refresh_calls: AtomicUsize,
}

impl MemoryTransport {
    /// Create an empty backend with no golls and no session.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BackendState {
                golls: Vec::new(),
                next_goll_id: 1,
                next_participant_id: 1,
                valid_tokens: HashSet::new(),
                issued: 0,
                session_alive: false,
                likes: HashSet::new(),
                votes: HashMap::new(),
                fail_next: None,
            }),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    /// Create a backend seeded with demo golls.
    pub fn seeded() -> Self {
        let transport = Self::new();
        {
            let mut state = transport.state.lock().expect("backend lock poisoned");
            state.golls = seed_golls();
            state.next_goll_id = 4;
            state.next_participant_id = 8;
        }
        transport
    }

    /// Invalidate all issued tokens while keeping the session alive, so
    /// the next request gets a 401 and a refresh succeeds.
    pub fn expire_tokens(&self) {
        self.state
            .lock()
            .expect("backend lock poisoned")
            .valid_tokens
            .clear();
    }

    /// End the session server-side: tokens are invalidated and refresh
    /// starts failing.
    pub fn end_session(&self) {
        let mut state = self.state.lock().expect("backend lock poisoned");
        state.valid_tokens.clear();
        state.session_alive = false;
    }

    /// Inject a failure status for the next like/vote mutation.
    pub fn fail_next_mutation(&self, status: u16) {
        self.state.lock().expect("backend lock poisoned").fail_next = Some(status);
    }

    /// Number of `/auth/refresh` calls seen.
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn handle(&self, request: ApiRequest, bearer: Option<String>) -> ApiResponse {
        let mut state = self.state.lock().expect("backend lock poisoned");
        let authed = bearer
            .as_deref()
            .is_some_and(|t| state.valid_tokens.contains(t));

        let (path, query) = match request.path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (request.path.as_str(), None),
        };
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["auth", "token", "exchange"]) => {
                let code = request
                    .body
                    .as_ref()
                    .and_then(|b| b.get("code"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                if code.is_empty() {
                    return error(400, "code is required");
                }
                let token = issue_token(&mut state);
                state.session_alive = true;
                ok(json!({ "accessToken": token }))
            }
            (Method::Post, ["auth", "refresh"]) => {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                if !state.session_alive {
                    return error(401, "session expired");
                }
                // Rotation: prior tokens stop working.
                state.valid_tokens.clear();
                let token = issue_token(&mut state);
                ok(json!({ "accessToken": token }))
            }
            (Method::Post, ["auth", "logout"]) => {
                state.valid_tokens.clear();
                state.session_alive = false;
                ok(Value::Null)
            }
            (Method::Get, ["users", "me"]) => {
                if !authed {
                    return error(401, "not authenticated");
                }
                ok(serde_json::to_value(demo_user()).expect("profile serializes"))
            }
            (Method::Get, ["golls"]) => {
                let (page, size) = parse_page(query);
                let total = state.golls.len() as u64;
                let items: Vec<Value> = state
                    .golls
                    .iter()
                    .skip((page * size) as usize)
                    .take(size as usize)
                    .map(|g| project(g, &state.likes, &state.votes, authed))
                    .collect();
                ok(json!({ "items": items, "page": page, "size": size, "total": total }))
            }
            (Method::Post, ["golls"]) => {
                if !authed {
                    return error(401, "not authenticated");
                }
                let draft: GollDraft = match request
                    .body
                    .clone()
                    .map(serde_json::from_value)
                    .transpose()
                {
                    Ok(Some(d)) => d,
                    _ => return error(400, "invalid goll payload"),
                };
                if draft.title.trim().is_empty() {
                    return error(422, "title is required");
                }
                let goll = materialize(&mut state, draft);
                let body = project(&goll, &state.likes, &state.votes, authed);
                state.golls.insert(0, goll);
                created(body)
            }
            (Method::Get, ["golls", id]) => match find(&state, id) {
                Some(index) => {
                    let goll = &state.golls[index];
                    ok(project(goll, &state.likes, &state.votes, authed))
                }
                None => error(404, "goll not found"),
            },
            (Method::Put, ["golls", id]) => {
                if !authed {
                    return error(401, "not authenticated");
                }
                let draft: GollDraft = match request
                    .body
                    .clone()
                    .map(serde_json::from_value)
                    .transpose()
                {
                    Ok(Some(d)) => d,
                    _ => return error(400, "invalid goll payload"),
                };
                match find(&state, id) {
                    Some(index) => {
                        let goll = &mut state.golls[index];
                        goll.title = draft.title;
                        goll.description = draft.description;
                        goll.match_type = draft.match_type;
                        let goll = state.golls[index].clone();
                        ok(project(&goll, &state.likes, &state.votes, authed))
                    }
                    None => error(404, "goll not found"),
                }
            }
            (Method::Patch, ["golls", id]) => {
                if !authed {
                    return error(401, "not authenticated");
                }
                let status: Option<GollStatus> = request
                    .body
                    .as_ref()
                    .and_then(|b| b.get("status"))
                    .and_then(|s| serde_json::from_value(s.clone()).ok());
                let status = match status {
                    Some(s) => s,
                    None => return error(400, "invalid status"),
                };
                match find(&state, id) {
                    Some(index) => {
                        state.golls[index].status = status;
                        let goll = state.golls[index].clone();
                        ok(project(&goll, &state.likes, &state.votes, authed))
                    }
                    None => error(404, "goll not found"),
                }
            }
            (Method::Post, ["golls", id, "like"]) => {
                if !authed {
                    return error(401, "not authenticated");
                }
                if let Some(status) = state.fail_next.take() {
                    return error(status, "injected failure");
                }
                let index = match find(&state, id) {
                    Some(i) => i,
                    None => return error(404, "goll not found"),
                };
                if state.golls[index].status.is_archived() {
                    return error(409, "goll is archived");
                }
                let goll_id = state.golls[index].id;
                let liked = if state.likes.remove(&goll_id) {
                    state.golls[index].likes = state.golls[index].likes.saturating_sub(1);
                    false
                } else {
                    state.likes.insert(goll_id);
                    state.golls[index].likes += 1;
                    true
                };
                ok(json!({ "liked": liked, "likes": state.golls[index].likes }))
            }
            (Method::Post, ["golls", id, "participants", pid, "vote"]) => {
                if !authed {
                    return error(401, "not authenticated");
                }
                if let Some(status) = state.fail_next.take() {
                    return error(status, "injected failure");
                }
                let index = match find(&state, id) {
                    Some(i) => i,
                    None => return error(404, "goll not found"),
                };
                if state.golls[index].status.is_archived() {
                    return error(409, "goll is archived");
                }
                let participant_id: u64 = match pid.parse() {
                    Ok(p) => p,
                    Err(_) => return error(404, "participant not found"),
                };
                if !state.golls[index]
                    .participants
                    .iter()
                    .any(|p| p.id == participant_id)
                {
                    return error(404, "participant not found");
                }

                let goll_id = state.golls[index].id;
                let previous = state.votes.get(&goll_id).copied();
                let voted = match previous {
                    // Re-selecting the current choice removes the vote.
                    Some(prev) if prev == participant_id => {
                        state.votes.remove(&goll_id);
                        adjust_votes(&mut state.golls[index], prev, -1);
                        None
                    }
                    // Switching decrements the old choice and increments
                    // the new one as one server-side intent.
                    Some(prev) => {
                        state.votes.insert(goll_id, participant_id);
                        adjust_votes(&mut state.golls[index], prev, -1);
                        adjust_votes(&mut state.golls[index], participant_id, 1);
                        Some(participant_id)
                    }
                    None => {
                        state.votes.insert(goll_id, participant_id);
                        adjust_votes(&mut state.golls[index], participant_id, 1);
                        Some(participant_id)
                    }
                };

                let counts: HashMap<String, u64> = state.golls[index]
                    .participants
                    .iter()
                    .map(|p| (p.id.to_string(), p.votes))
                    .collect();
                ok(json!({ "votedParticipantId": voted, "voteCounts": counts }))
            }
            _ => error(404, "no such endpoint"),
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn execute(
        &self,
        request: ApiRequest,
        bearer: Option<String>,
    ) -> BoxFuture<'_, ApiResult<ApiResponse>> {
        async move { Ok(self.handle(request, bearer)) }.boxed()
    }
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse { status: 200, body }
}

fn created(body: Value) -> ApiResponse {
    ApiResponse { status: 201, body }
}

fn error(status: u16, message: &str) -> ApiResponse {
    ApiResponse {
        status,
        body: json!({ "message": message }),
    }
}

fn issue_token(state: &mut BackendState) -> String {
    state.issued += 1;
    let token = format!("memtok-{}", state.issued);
    state.valid_tokens.insert(token.clone());
    token
}

fn find(state: &BackendState, raw_id: &str) -> Option<usize> {
    let id: u64 = raw_id.parse().ok()?;
    state.golls.iter().position(|g| g.id == id)
}

fn parse_page(query: Option<&str>) -> (u32, u32) {
    let mut page = 0;
    let mut size = DEFAULT_PAGE_SIZE;
    if let Some(query) = query {
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                match key {
                    "page" => page = value.parse().unwrap_or(0),
                    "size" => size = value.parse().unwrap_or(DEFAULT_PAGE_SIZE),
                    _ => {}
                }
            }
        }
    }
    (page, size.max(1))
}

fn adjust_votes(goll: &mut Goll, participant_id: u64, delta: i64) {
    if let Some(participant) = goll.participants.iter_mut().find(|p| p.id == participant_id) {
        participant.votes = if delta < 0 {
            participant.votes.saturating_sub(delta.unsigned_abs())
        } else {
            participant.votes + delta as u64
        };
    }
}

/// Project a stored goll into the viewer-specific wire shape.
fn project(goll: &Goll, likes: &HashSet<u64>, votes: &HashMap<u64, u64>, authed: bool) -> Value {
    let mut view = goll.clone();
    view.liked = authed && likes.contains(&goll.id);
    view.user_vote_id = if authed {
        votes.get(&goll.id).copied()
    } else {
        None
    };
    serde_json::to_value(view).expect("goll serializes")
}

fn materialize(state: &mut BackendState, draft: GollDraft) -> Goll {
    let id = state.next_goll_id;
    state.next_goll_id += 1;
    let participants = draft
        .participants
        .into_iter()
        .map(|p| {
            let pid = state.next_participant_id;
            state.next_participant_id += 1;
            Participant {
                id: pid,
                name: p.name,
                kind: p.kind,
                votes: 0,
            }
        })
        .collect();
    Goll {
        id,
        title: draft.title,
        description: draft.description,
        match_type: draft.match_type,
        status: GollStatus::Active,
        participants,
        likes: 0,
        liked: false,
        user_vote_id: None,
        created_at: Some(chrono::Utc::now()),
    }
}

fn demo_user() -> UserProfile {
    UserProfile {
        id: "user-demo".to_string(),
        name: "Demo Rider".to_string(),
        email: Some("demo@goll.gg".to_string()),
        avatar: None,
    }
}

fn seed_golls() -> Vec<Goll> {
    vec![
        Goll {
            id: 1,
            title: "Big Air Final: Nordic Flyers vs Alpine Aces".to_string(),
            description: Some("Season closer at the north bowl.".to_string()),
            match_type: MatchType::Vs,
            status: GollStatus::Active,
            participants: vec![
                Participant {
                    id: 1,
                    name: "Nordic Flyers".to_string(),
                    kind: ParticipantKind::Team,
                    votes: 12,
                },
                Participant {
                    id: 2,
                    name: "Alpine Aces".to_string(),
                    kind: ParticipantKind::Team,
                    votes: 8,
                },
            ],
            likes: 31,
            liked: false,
            user_vote_id: None,
            created_at: None,
        },
        Goll {
            id: 2,
            title: "Slopestyle jam session".to_string(),
            description: None,
            match_type: MatchType::Multi,
            status: GollStatus::Active,
            participants: vec![
                Participant {
                    id: 3,
                    name: "Mika".to_string(),
                    kind: ParticipantKind::Individual,
                    votes: 4,
                },
                Participant {
                    id: 4,
                    name: "Jonas".to_string(),
                    kind: ParticipantKind::Individual,
                    votes: 2,
                },
                Participant {
                    id: 5,
                    name: "Elle".to_string(),
                    kind: ParticipantKind::Individual,
                    votes: 7,
                },
            ],
            likes: 5,
            liked: false,
            user_vote_id: None,
            created_at: None,
        },
        Goll {
            id: 3,
            title: "Last season's derby (archived)".to_string(),
            description: None,
            match_type: MatchType::Vs,
            status: GollStatus::Archived,
            participants: vec![
                Participant {
                    id: 6,
                    name: "Powder Hounds".to_string(),
                    kind: ParticipantKind::Team,
                    votes: 40,
                },
                Participant {
                    id: 7,
                    name: "Icebreakers".to_string(),
                    kind: ParticipantKind::Team,
                    votes: 35,
                },
            ],
            likes: 44,
            liked: false,
            user_vote_id: None,
            created_at: None,
        },
    ]
}
