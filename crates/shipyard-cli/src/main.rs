mod cli;
mod commands;

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};

use shipyard_core::notify::{Notifier, Severity};
use shipyard_core::App;
use shipyard_store::Store;

use cli::Cli;

/// Notification surface backed by the log.
struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str, severity: Severity) {
        match severity {
            Severity::Success | Severity::Info => info!("{}: {}", title, body),
            Severity::Warning => warn!("{}: {}", title, body),
            Severity::Error => error!("{}: {}", title, body),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SHIPYARD_LOG")
                .unwrap_or_else(|_| "shipyard=info".into()),
        )
        .init();

    let args = Cli::parse();

    // Config
    let db_path = args
        .db
        .clone()
        .or_else(|| std::env::var("SHIPYARD_DB_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("shipyard.db"));
    let admin_email = std::env::var("SHIPYARD_ADMIN_EMAIL").ok();

    let store = Store::open(&db_path)?;
    let mut app = App::load(store, admin_email)?;

    // Stale sessions accumulate until someone sweeps them
    app.cleanup_expired()?;

    commands::dispatch(&mut app, &LogNotifier, args.command)
}
