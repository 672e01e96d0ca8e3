//! Rendezvous - a command-line client for the event-attendee platform.
//!
//! Log in, manage profile interests, view the meeting schedule, browse
//! who's here and read notifications. Tokens persist between runs and are
//! refreshed transparently when the access token expires.

mod app;
mod render;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rendezvous_core::Config;

use app::App;

// ============================================================================
// Constants
// ============================================================================

/// Log file name prefix in the data directory
const LOG_FILE: &str = "rendezvous.log";

#[derive(Debug, Parser)]
#[command(name = "rendezvous", version, about = "Event attendee client")]
struct Cli {
    /// API base URL, overriding the configured one
    #[arg(long, env = "RENDEZVOUS_API_URL", global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store tokens on this device
    Login {
        #[arg(short, long, env = "RENDEZVOUS_USERNAME")]
        username: Option<String>,
    },
    /// Forget stored tokens
    Logout,
    /// Show login state, upcoming meetings and unread notifications
    Status,
    /// Show your profile
    Profile,
    /// Replace your interests with a comma-separated list
    Interests {
        interests: String,
    },
    /// List your meetings
    Meetings {
        /// Only meetings that have not started yet
        #[arg(long)]
        upcoming: bool,
        /// Print the iCal export of one meeting
        #[arg(long, value_name = "MEETING_ID")]
        calendar: Option<i64>,
    },
    /// List checked-in attendees
    WhosHere,
    /// List notifications
    Notifications {
        /// Mark a notification as read
        #[arg(long, value_name = "ID")]
        mark_read: Option<i64>,
    },
    /// Check that the API is reachable
    Health,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config ({}), using defaults", e);
            Config::default()
        }
    };

    let log_dir = config.data_dir().ok().map(|dir| dir.join("logs"));
    let _guard = init_tracing(log_dir.as_deref());
    info!(command = ?cli.command, "Rendezvous starting");

    let mut app = App::new(config, cli.api_url)?;

    let result = match cli.command {
        Command::Login { username } => app.login(username).await,
        Command::Logout => {
            app.logout();
            Ok(())
        }
        Command::Status => app.status().await,
        Command::Profile => app.profile().await,
        Command::Interests { interests } => app.update_interests(&interests).await,
        Command::Meetings { upcoming, calendar } => app.meetings(upcoming, calendar).await,
        Command::WhosHere => app.whos_here().await,
        Command::Notifications { mark_read } => app.notifications(mark_read).await,
        Command::Health => app.health().await,
    };

    if app.session_expired() {
        warn!("Session ended during command");
        eprintln!("Your session has expired. Please log in again with `rendezvous login`.");
    }

    result
}
