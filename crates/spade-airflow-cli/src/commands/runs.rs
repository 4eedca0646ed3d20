//! Runs command - list DAG runs.

use anyhow::{Context as _, Result};
use clap::Args;
use serde_json::Value;
use spade_airflow::params::RUNS_LIMIT;
use spade_airflow::{AirflowRunHistoryProvider, ConfigSource};
use spade_types::{HistoryProvider, RunResult};

use super::Context;

/// Arguments for the runs command.
#[derive(Args, Debug)]
pub struct RunsArgs {
    /// DAGs to list runs of
    #[arg(required = true, num_args = 1..)]
    pub dag_ids: Vec<String>,

    /// Maximum number of runs per DAG
    #[arg(short, long)]
    pub limit: Option<u32>,
}

/// Run the runs command.
pub async fn run(args: RunsArgs, ctx: &Context) -> Result<()> {
    let mut process = ctx.process(Value::from(args.dag_ids.clone()));
    if let Some(limit) = args.limit {
        process = process.with_param(RUNS_LIMIT, limit);
    }

    let provider = AirflowRunHistoryProvider::with_config(ConfigSource::params_only());
    let runs = provider
        .get_runs(&process)
        .await
        .with_context(|| format!("failed to list runs of {}", args.dag_ids.join(", ")))?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("No runs");
        return Ok(());
    }

    println!(
        "{:<26} {:<20} {:<9} {:<8} {:<8} RUN",
        "CREATED", "DAG", "STATUS", "RESULT", "USER"
    );
    for run in &runs {
        println!("{}", format_row(run));
    }
    Ok(())
}

/// One table row for a run.
fn format_row(run: &RunResult) -> String {
    let field = |key: &str| {
        run.output
            .as_ref()
            .and_then(|output| output.get(key))
            .and_then(Value::as_str)
            .unwrap_or("-")
            .to_string()
    };
    let created = run
        .created_at
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string());
    let outcome = run
        .result
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<26} {:<20} {:<9} {:<8} {:<8} {}",
        created,
        field("dag_id"),
        run.status.to_string(),
        outcome,
        run.user_id.as_deref().unwrap_or("-"),
        field("dag_run_id"),
    )
}
