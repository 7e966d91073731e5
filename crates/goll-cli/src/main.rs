//! Goll CLI - the match-log feed from the terminal.

mod commands;
mod output;

use clap::{Parser, Subcommand};

/// Goll CLI for the match-log feed: browse, like, and vote.
#[derive(Parser)]
#[command(name = "goll")]
#[command(about = "Browse the goll feed, like golls, and vote on matches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Run against the seeded in-process backend instead of the network
    #[arg(long, global = true)]
    memory: bool,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in by exchanging an authorization code
    Login {
        /// Authorization code from the login flow
        code: String,
    },

    /// Log out and clear the session
    Logout,

    /// Show session status
    Status,

    /// List the goll feed
    Feed {
        /// Page number, starting at 0
        #[arg(short, long, default_value = "0")]
        page: u32,
        /// Page size
        #[arg(short, long, default_value = "20")]
        size: u32,
    },

    /// Show one goll
    Show {
        /// Goll ID
        id: u64,
        /// Keep following live counter updates
        #[arg(short, long)]
        watch: bool,
    },

    /// Toggle your like on a goll
    Like {
        /// Goll ID
        id: u64,
    },

    /// Vote for a participant (vote again to retract)
    Vote {
        /// Goll ID
        id: u64,
        /// Participant ID
        participant: u64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let app = match commands::App::build(cli.memory, cli.log_level.as_deref()) {
        Ok(app) => app,
        Err(e) => {
            output::print_error(&e.to_string(), &cli.format);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Login { code } => commands::login(&app, &code, &cli.format).await,
        Commands::Logout => commands::logout(&app, &cli.format).await,
        Commands::Status => commands::status(&app, &cli.format).await,
        Commands::Feed { page, size } => commands::feed(&app, page, size, &cli.format).await,
        Commands::Show { id, watch } => commands::show(&app, id, watch, &cli.format).await,
        Commands::Like { id } => commands::like(&app, id, &cli.format).await,
        Commands::Vote { id, participant } => {
            commands::vote(&app, id, participant, &cli.format).await
        }
    };

    // Refresh may have rotated the credential mid-command; keep whatever
    // the session ended up with, including nothing after a forced logout.
    app.persist_session();

    if let Err(e) = result {
        output::print_error(&e.to_string(), &cli.format);
        std::process::exit(1);
    }
}
