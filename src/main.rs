//! CredTrack — license expiry lifecycle and reminder dispatch engine.
//!
//! `scan` runs a single pass and prints the outcome; `serve` runs the
//! recurring scan loop plus the HTTP trigger gateway the dashboard calls.

mod gateway;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use credtrack_channels::{EmailNotifier, LogNotifier, WebhookNotifier};
use credtrack_core::config::CredTrackConfig;
use credtrack_core::traits::Notifier;
use credtrack_engine::scan::{ScanOrchestrator, spawn_scan_loop};
use credtrack_store::{SqliteLedger, SqliteRecords};

#[derive(Parser)]
#[command(name = "credtrack", version, about)]
struct Cli {
    /// Path to config file (defaults to ~/.credtrack/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single expiry scan and print the outcome.
    Scan,
    /// Run the recurring scan loop and the HTTP trigger gateway.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("credtrack=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CredTrackConfig::load_from(path)?,
        None => CredTrackConfig::load()?,
    };

    let records = Arc::new(SqliteRecords::open(&config.store.records_path())?);
    let ledger = Arc::new(SqliteLedger::open(&config.store.ledger_path())?);
    let notifier = build_notifier(&config);
    let orchestrator = Arc::new(ScanOrchestrator::new(records.clone(), ledger, notifier));

    match cli.command {
        Command::Scan => {
            let outcome = orchestrator.run_scan(chrono::Utc::now()).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            // Only an aborted scan (records store unreachable) is fatal;
            // per-record delivery errors are retried by the next scan.
            if outcome.checked == 0 && outcome.errors > 0 {
                std::process::exit(1);
            }
        }
        Command::Serve => {
            tokio::spawn(spawn_scan_loop(
                orchestrator.clone(),
                config.scan.interval_secs,
            ));
            gateway::serve(config.gateway.clone(), orchestrator, records).await?;
        }
    }

    Ok(())
}

/// Pick the delivery channel from config: email when enabled, else webhook,
/// else log-only.
fn build_notifier(config: &CredTrackConfig) -> Arc<dyn Notifier> {
    if config.email.enabled {
        tracing::info!("📧 Reminder channel: email via {}", config.email.smtp_host);
        Arc::new(EmailNotifier::new(config.email.clone()))
    } else if config.webhook.enabled {
        tracing::info!("🌐 Reminder channel: webhook {}", config.webhook.url);
        Arc::new(WebhookNotifier::new(config.webhook.clone()))
    } else {
        tracing::info!("📢 Reminder channel: log only (no channel configured)");
        Arc::new(LogNotifier::new())
    }
}
