//! Authentication commands.

use super::{golls, App};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use goll_session::RedirectIntent;

/// Where a consumed redirect intent lands the user.
#[derive(Debug, PartialEq, Eq)]
enum Resume {
    /// A detail intent carrying a goll id.
    Goll(u64),
    /// Anything else falls back to the default landing screen.
    Feed,
}

fn resume_destination(intent: &RedirectIntent) -> Resume {
    match intent.goll_id() {
        Some(goll_id) => Resume::Goll(goll_id),
        None => Resume::Feed,
    }
}

/// Log in by exchanging an authorization code, then resume whatever the
/// guest was trying to reach before being sent to login.
pub async fn login(app: &App, code: &str, format: &OutputFormat) -> Result<()> {
    app.api.exchange_code(code).await?;
    let profile = app.api.me().await?;
    output::print_success(&format!("Logged in as {}", profile.name), format);

    if let Some(intent) = app.gate.redirects().take()? {
        println!();
        match resume_destination(&intent) {
            Resume::Goll(goll_id) => {
                println!("Taking you back to goll {}:", goll_id);
                golls::show(app, goll_id, false, format).await?;
            }
            Resume::Feed => {
                golls::feed(app, 0, 20, format).await?;
            }
        }
    }

    Ok(())
}

/// Log out and clear the session.
pub async fn logout(app: &App, format: &OutputFormat) -> Result<()> {
    app.api.logout().await?;
    // A pre-logout intent must not fire on the next login.
    let _ = app.gate.redirects().take();
    output::print_success("Logged out", format);
    Ok(())
}

/// Show session status.
pub async fn status(app: &App, format: &OutputFormat) -> Result<()> {
    if !app.session.is_authenticated() {
        match format {
            OutputFormat::Text => println!("Not logged in"),
            OutputFormat::Json => println!(r#"{{"logged_in":false}}"#),
        }
        return Ok(());
    }

    match app.api.me().await {
        Ok(profile) => match format {
            OutputFormat::Text => {
                println!("Logged in");
                output::print_row("User", &profile.name);
                output::print_row("ID", &profile.id);
                if let Some(email) = &profile.email {
                    output::print_row("Email", email);
                }
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "logged_in": true,
                    "user": profile,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        },
        Err(e) if e.is_session_ended() => {
            output::print_error("Session expired, log in again", format);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use goll_session::Screen;

    #[test]
    fn test_detail_intent_resumes_to_the_goll() {
        let intent = RedirectIntent::detail(7);
        assert_eq!(resume_destination(&intent), Resume::Goll(7));
    }

    #[test]
    fn test_other_intents_land_on_the_feed() {
        let feed = RedirectIntent {
            screen: Screen::Feed,
            params: None,
        };
        assert_eq!(resume_destination(&feed), Resume::Feed);

        // A detail intent with a mangled payload must not dead-end.
        let broken = RedirectIntent {
            screen: Screen::Detail,
            params: Some(serde_json::json!({ "id": "not a number" })),
        };
        assert_eq!(resume_destination(&broken), Resume::Feed);
    }
}
