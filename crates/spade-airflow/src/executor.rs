//! Triggering DAG runs from Spade processes.

use async_trait::async_trait;
use serde_json::{Map, Value};
use spade_airflow_client::{Error as ClientError, ListDagRunsQuery};
use spade_types::{Executor, Process, RunResult, UserIdentity};
use tracing::{error, info, warn};

use crate::config::ConfigSource;
use crate::error::{AdapterError, Result};
use crate::params::{self, USER_EMAIL_CONF_KEY, USER_ID_CONF_KEY};

pub const NO_DAG_ID: &str = "No DAG ID provided";
pub const CONFIRMATION_MISSING: &str = "User confirmation missing";
pub const ALREADY_RUNNING: &str = "DAG is already running";

/// How many in-flight runs are fetched when checking for one.
const ACTIVE_RUN_LOOKBACK: u32 = 10;

/// Airflow states of a run still in flight.
const ACTIVE_STATES: [&str; 2] = ["running", "restarting"];

/// Executor that starts an Airflow DAG run for each Spade run.
///
/// The DAG comes from the `dag_id` user param or, failing that, the
/// process's `dag_id` system param. Unless the process sets
/// `allow_multiple_runs`, a run is refused while a previous one is still
/// running.
#[derive(Debug, Clone, Default)]
pub struct AirflowRunDagExecutor {
    config: ConfigSource,
}

impl AirflowRunDagExecutor {
    /// Executor reading settings from system params and the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor with a custom settings source.
    pub fn with_config(config: ConfigSource) -> Self {
        Self { config }
    }

    /// Trigger a DAG run for a process.
    pub async fn trigger(
        &self,
        process: &Process,
        user_params: &Map<String, Value>,
        user: &UserIdentity,
    ) -> Result<RunResult> {
        let config = self.config.resolve(process)?;

        let Some(dag_id) = params::trigger_dag_id(process, user_params) else {
            warn!(process = %process.code, "no DAG id on process or user params");
            return Ok(RunResult::failed(process, NO_DAG_ID));
        };
        if params::confirmation_declined(user_params) {
            warn!(process = %process.code, dag_id = %dag_id, "run not confirmed by user");
            return Ok(RunResult::failed(process, CONFIRMATION_MISSING));
        }

        info!(process = %process.code, dag_id = %dag_id, "Running Airflow DAG");
        let client = config.client()?;
        let token = client
            .auth()
            .request_token(&config.username, &config.password)
            .await?;
        let dag_runs = client.dag_runs(token);

        if !config.allow_multiple_runs {
            let recent = dag_runs
                .list(
                    &dag_id,
                    &ListDagRunsQuery::latest(ACTIVE_RUN_LOOKBACK).in_states(ACTIVE_STATES),
                )
                .await;
            match recent {
                Ok(runs) if runs.iter().any(|run| run.state().is_active()) => {
                    warn!(dag_id = %dag_id, "DAG already has a run in flight");
                    return Ok(RunResult::failed(process, ALREADY_RUNNING));
                }
                Ok(_) => {}
                Err(e @ ClientError::Api { .. }) => {
                    error!(dag_id = %dag_id, error = %e, "Failed to check for running DAG runs");
                    return Ok(RunResult::failed(process, e.remote_message()));
                }
                Err(e) => return Err(e.into()),
            }
        }

        match dag_runs.trigger(&dag_id, build_conf(user_params, user)).await {
            Ok(Some(run)) => {
                info!(dag_id = %dag_id, dag_run_id = ?run.dag_run_id, "DAG run accepted");
                let mut result = RunResult::running(process)
                    .with_created_at(run.created_at())
                    .with_user_id(Some(user.id.clone()));
                result.output = serde_json::to_value(&run).ok();
                Ok(result)
            }
            Ok(None) => {
                info!(dag_id = %dag_id, "DAG run accepted without a readable run");
                Ok(RunResult::running(process).with_user_id(Some(user.id.clone())))
            }
            Err(e @ ClientError::Api { .. }) => {
                error!(dag_id = %dag_id, error = %e, "Failed to run DAG");
                Ok(RunResult::failed(process, e.remote_message()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Executor for AirflowRunDagExecutor {
    type Error = AdapterError;

    async fn run(
        &self,
        process: &Process,
        user_params: &Map<String, Value>,
        user: &UserIdentity,
    ) -> Result<RunResult> {
        self.trigger(process, user_params, user).await
    }
}

/// The conf a DAG run is triggered with: every user param plus the
/// correlation keys identifying the user.
///
/// Correlation keys overwrite user params of the same name.
pub fn build_conf(user_params: &Map<String, Value>, user: &UserIdentity) -> Map<String, Value> {
    let mut conf = user_params.clone();
    conf.insert(USER_ID_CONF_KEY.to_string(), Value::from(user.id.as_str()));
    conf.insert(
        USER_EMAIL_CONF_KEY.to_string(),
        Value::from(user.email.as_str()),
    );
    conf
}
