//! spade-airflow-cli - trigger and inspect Airflow DAG runs the way Spade does.
//!
//! Main entry point for the CLI.

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;

mod commands;

use commands::{runs, trigger};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Trigger and inspect Airflow DAG runs through the Spade Airflow executor
#[derive(Parser)]
#[command(name = "spade-airflow-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Airflow webserver URL
    #[arg(long, global = true, env = "SPADE_AIRFLOW_URL")]
    pub url: Option<String>,

    /// Airflow username
    #[arg(long, global = true, env = "SPADE_AIRFLOW_USERNAME")]
    pub username: Option<String>,

    /// Airflow password
    #[arg(long, global = true, env = "SPADE_AIRFLOW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Also write JSON logs to a daily rotated file in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trigger a DAG run
    Trigger(trigger::TriggerArgs),

    /// List DAG runs, newest first
    Runs(runs::RunsArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = init_tracing(cli.verbose, cli.log_dir.as_deref());

    let ctx = commands::Context {
        url: cli.url,
        username: cli.username,
        password: cli.password,
        verify_tls: !cli.insecure,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Trigger(args) => trigger::run(args, &ctx).await,
        Commands::Runs(args) => runs::run(args, &ctx).await,
    }
}

/// Initialize tracing: human-readable console output on stderr, plus a
/// rotating JSON file when a log directory is given.
///
/// The returned guard flushes the file writer on drop.
fn init_tracing(verbose: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    use tracing_subscriber::prelude::*;

    let filter = if verbose {
        "spade_airflow=debug,spade_airflow_client=debug,spade_airflow_cli=debug,info"
    } else {
        "spade_airflow=info,spade_airflow_client=info,spade_airflow_cli=info,warn"
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "spade-airflow.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "spade_airflow=trace,spade_airflow_client=trace,spade_airflow_cli=trace,info",
                ));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_layer)
        .init();

    guard
}
