//! Cashbook CLI - a command-line client for cashbook ledgers.
//!
//! Signs in against the cashbook API, lists cashbooks and transactions,
//! records entries and downloads reports.

mod commands;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cashbook_core::auth::{FileTokenStore, KeyringTokenStore, Session, SessionEvent, TokenStore};
use cashbook_core::config::{Config, CredentialBackend};
use cashbook_core::ApiClient;

use commands::{ExportArgs, FilterArgs, NewEntryArgs};

/// Log file name prefix in the data directory
const LOG_FILE_PREFIX: &str = "cashbook.log";

#[derive(Parser, Debug)]
#[command(name = "cashbook")]
#[command(version)]
#[command(about = "Cashbook ledgers from the command line", long_about = None)]
struct Args {
    /// API origin, overriding API_BASE_URL and the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session tokens
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Discard the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List cashbooks with their balances
    Cashbooks,
    /// List transactions in a cashbook
    Transactions(FilterArgs),
    /// Show cash in / cash out totals for a cashbook
    Summary(FilterArgs),
    /// Record a cash in or cash out entry
    Add(NewEntryArgs),
    /// List categories, parties and payment modes for a cashbook
    Lookups {
        #[arg(short, long)]
        cashbook: Option<i64>,
    },
    /// List available reports
    Reports,
    /// Download a report as Excel or PDF
    Export(ExportArgs),
}

/// Initialize the tracing subscriber for logging.
/// The returned guard must be held until exit so the file log is flushed.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
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

fn token_store(config: &Config) -> Result<Arc<dyn TokenStore>> {
    Ok(match config.credential_backend {
        CredentialBackend::Keyring => Arc::new(KeyringTokenStore::new()),
        CredentialBackend::File => Arc::new(FileTokenStore::new(config.data_dir()?)),
    })
}

/// Tell the user if the session could not be renewed while the command ran.
fn report_session_events(events: &mut broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        if event == SessionEvent::Invalidated {
            eprintln!("Your session has expired. Run `cashbook login` to sign in again.");
            return;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let mut config = Config::load().context("Failed to load config")?;

    let _log_guard = init_tracing(config.data_dir().ok());
    info!("Cashbook CLI starting");

    let mut client_config = config.client_config();
    if let Some(ref base_url) = args.base_url {
        client_config = cashbook_core::ClientConfig::new(base_url.clone())
            .with_timeout(client_config.timeout);
    }

    let session = Arc::new(Session::new(token_store(&config)?));
    if let Err(e) = session.init().await {
        warn!(error = %e, "Failed to load stored session");
    }
    let mut events = session.subscribe();

    let client = ApiClient::new(client_config, Arc::clone(&session))
        .context("Failed to create API client")?;

    let result = match args.command {
        Command::Login { username } => commands::login(&client, &mut config, username).await,
        Command::Logout => commands::logout(&client).await,
        Command::Whoami => commands::whoami(&client).await,
        Command::Cashbooks => commands::cashbooks(&client).await,
        Command::Transactions(filter) => commands::transactions(&client, &config, &filter).await,
        Command::Summary(filter) => commands::summary(&client, &config, &filter).await,
        Command::Add(entry) => commands::add(&client, &config, &entry).await,
        Command::Lookups { cashbook } => {
            commands::lookups(&client, cashbook.or(config.default_cashbook)).await
        }
        Command::Reports => commands::reports(&client).await,
        Command::Export(export) => commands::export(&client, &export).await,
    };

    report_session_events(&mut events);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_must_be_positive() {
        assert!(Args::try_parse_from(["cashbook", "transactions", "--page", "0"]).is_err());

        let args = Args::try_parse_from(["cashbook", "transactions", "--page", "2"]).unwrap();
        match args.command {
            Command::Transactions(filter) => assert_eq!(filter.page, 2),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
