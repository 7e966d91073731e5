//! Feed and goll commands.

use super::App;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use goll_api::Goll;
use goll_feed::{FeedResult, GollViewState, LikeController, VoteController};
use goll_live::{LiveSubscriber, WsConnector};
use goll_session::{GuardOutcome, RedirectIntent};
use std::sync::{Arc, Mutex};

/// List the goll feed, newest first.
pub async fn feed(app: &App, page: u32, size: u32, format: &OutputFormat) -> Result<()> {
    let listing = app.api.list_golls(page, size).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Text => {
            output::print_heading(&format!(
                "Golls (page {}, {} total)",
                listing.page, listing.total
            ));
            for goll in &listing.items {
                let votes: u64 = goll.participants.iter().map(|p| p.votes).sum();
                let status = if goll.status.is_archived() {
                    "  [archived]"
                } else {
                    ""
                };
                println!(
                    "{:>4}  {:<42} {:>4} likes  {:>4} votes{}",
                    goll.id, goll.title, goll.likes, votes, status
                );
            }
        }
    }

    Ok(())
}

/// Show one goll; with `watch`, keep following its live counters.
pub async fn show(app: &App, id: u64, watch: bool, format: &OutputFormat) -> Result<()> {
    let goll = app.api.get_goll(id).await?;
    let state = GollViewState::from_goll(&goll);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&goll)?),
        OutputFormat::Text => render(&goll, &state),
    }

    if !watch {
        return Ok(());
    }
    if app.in_memory {
        anyhow::bail!("live updates are not available with the in-memory backend");
    }

    let subscriber = LiveSubscriber::new(Arc::new(WsConnector::new(&app.config.stream_url)));
    let shared = Arc::new(Mutex::new(state));
    let sink = shared.clone();
    let goll_for_render = goll.clone();
    let handle = subscriber
        .subscribe(id, move |event| {
            let mut state = sink.lock().expect("view state lock poisoned");
            if state.apply_stream_event(&event) {
                render_counters(&goll_for_render, &state);
            }
        })
        .await?;

    println!("\nWatching live updates, press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;
    handle.unsubscribe();
    subscriber.close().await;

    Ok(())
}

/// Toggle the viewer's like on a goll. Guests are sent to login and the
/// goll is remembered as the place to come back to.
pub async fn like(app: &App, id: u64, format: &OutputFormat) -> Result<()> {
    let outcome = app
        .gate
        .guard(RedirectIntent::detail(id), || like_inner(app, id))
        .await?;

    match outcome {
        GuardOutcome::Performed(result) => {
            let state = result?;
            let verb = if state.liked { "Liked" } else { "Unliked" };
            output::print_success(
                &format!("{} goll {} ({} likes)", verb, id, state.likes),
                format,
            );
        }
        GuardOutcome::LoginRequired => login_required(id, format),
    }

    Ok(())
}

/// Vote for a participant; voting for the current selection retracts it.
pub async fn vote(app: &App, id: u64, participant: u64, format: &OutputFormat) -> Result<()> {
    let outcome = app
        .gate
        .guard(RedirectIntent::detail(id), || vote_inner(app, id, participant))
        .await?;

    match outcome {
        GuardOutcome::Performed(result) => {
            let state = result?;
            let message = match state.user_vote_id {
                Some(pid) => format!(
                    "Vote recorded for participant {} ({} votes)",
                    pid,
                    state.votes_for(pid)
                ),
                None => "Vote retracted".to_string(),
            };
            output::print_success(&message, format);
        }
        GuardOutcome::LoginRequired => login_required(id, format),
    }

    Ok(())
}

async fn like_inner(app: &App, id: u64) -> FeedResult<GollViewState> {
    let goll = app.api.get_goll(id).await?;
    let state = Arc::new(Mutex::new(GollViewState::from_goll(&goll)));
    let controller = LikeController::new(app.api.clone(), state.clone());
    controller.toggle().await?;
    let snapshot = state.lock().expect("view state lock poisoned").clone();
    Ok(snapshot)
}

async fn vote_inner(app: &App, id: u64, participant: u64) -> FeedResult<GollViewState> {
    let goll = app.api.get_goll(id).await?;
    let state = Arc::new(Mutex::new(GollViewState::from_goll(&goll)));
    let controller = VoteController::new(app.api.clone(), state.clone());
    controller.cast(participant).await?;
    let snapshot = state.lock().expect("view state lock poisoned").clone();
    Ok(snapshot)
}

fn login_required(goll_id: u64, format: &OutputFormat) {
    output::print_error(
        &format!(
            "Login required. Run 'goll login <code>' and you will be taken back to goll {}",
            goll_id
        ),
        format,
    );
}

fn render(goll: &Goll, state: &GollViewState) {
    output::print_heading(&goll.title);
    if let Some(description) = &goll.description {
        output::print_row("About", description);
    }
    output::print_row(
        "Status",
        if state.archived { "archived" } else { "active" },
    );
    let likes = if state.liked {
        format!("{} (including yours)", state.likes)
    } else {
        state.likes.to_string()
    };
    output::print_row("Likes", &likes);
    println!();
    for participant in &goll.participants {
        let marker = if state.user_vote_id == Some(participant.id) {
            "  <- your vote"
        } else {
            ""
        };
        println!(
            "  {:<30} {:>4} votes{}",
            participant.name,
            state.votes_for(participant.id),
            marker
        );
    }
}

fn render_counters(goll: &Goll, state: &GollViewState) {
    let votes = goll
        .participants
        .iter()
        .map(|p| format!("{} {}", p.name, state.votes_for(p.id)))
        .collect::<Vec<_>>()
        .join(", ");
    println!("likes {}  |  {}", state.likes, votes);
}
