//! Trigger command - start a DAG run.

use anyhow::{Context as _, Result, anyhow, bail};
use clap::Args;
use serde_json::{Map, Value};
use spade_airflow::{AirflowRunDagExecutor, ConfigSource};
use spade_airflow::config::ALLOW_MULTIPLE_RUNS_PARAM;
use spade_types::{Executor, UserIdentity};

use super::Context;

/// Arguments for the trigger command.
#[derive(Args, Debug)]
pub struct TriggerArgs {
    /// DAG to trigger
    pub dag_id: String,

    /// Run parameter as key=value; values are parsed as JSON when possible
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Id recorded as the user who started the run
    #[arg(long, default_value = "cli")]
    pub user_id: String,

    /// Email recorded as the user who started the run
    #[arg(long, default_value = "")]
    pub user_email: String,

    /// Trigger even if the DAG already has a run in flight
    #[arg(long)]
    pub allow_multiple: bool,
}

/// Run the trigger command.
pub async fn run(args: TriggerArgs, ctx: &Context) -> Result<()> {
    let mut user_params = Map::new();
    for raw in &args.params {
        let (key, value) = parse_param(raw)?;
        user_params.insert(key, value);
    }

    let process = ctx
        .process(args.dag_id.as_str())
        .with_param(ALLOW_MULTIPLE_RUNS_PARAM, args.allow_multiple);
    let user = UserIdentity::new(args.user_id, args.user_email);

    let executor = AirflowRunDagExecutor::with_config(ConfigSource::params_only());
    let result = executor
        .run(&process, &user_params, &user)
        .await
        .with_context(|| format!("failed to trigger DAG '{}'", args.dag_id))?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some(message) = &result.error_message {
        println!("DAG {}: {} ({})", args.dag_id, result.status, message);
    } else {
        let run_id = result
            .output
            .as_ref()
            .and_then(|output| output.get("dag_run_id"))
            .and_then(Value::as_str)
            .unwrap_or("-");
        println!("DAG {}: {} (run {})", args.dag_id, result.status, run_id);
    }

    if ctx.verbose {
        eprintln!("Airflow: {}", ctx.url.as_deref().unwrap_or("<unset>"));
    }

    if result.is_failed() {
        bail!(
            "DAG '{}' was not started: {}",
            args.dag_id,
            result.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

/// Parse a `key=value` run parameter.
///
/// The value is read as JSON if it parses, so `n=3` gives a number and
/// `flags=["a"]` a list; anything else is kept as a plain string.
pub fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid parameter '{}', expected KEY=VALUE", raw))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("invalid parameter '{}', key is empty", raw);
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}
