//! Reading DAG run history for Spade processes.

use std::cmp::Reverse;

use async_trait::async_trait;
use spade_airflow_client::{DagRun, Error as ClientError, ListDagRunsQuery};
use spade_types::{HistoryProvider, Process, RunResult};
use tracing::{error, info, warn};

use crate::config::ConfigSource;
use crate::error::{AdapterError, Result};
use crate::params::{self, USER_ID_CONF_KEY};
use crate::status::map_state;

/// History provider listing the Airflow DAG runs behind a process.
///
/// A process may point at several DAGs (`dag_id` as a list, or `dag_ids`);
/// their runs are merged into one list, newest first.
#[derive(Debug, Clone, Default)]
pub struct AirflowRunHistoryProvider {
    config: ConfigSource,
}

impl AirflowRunHistoryProvider {
    /// Provider reading settings from system params and the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider with a custom settings source.
    pub fn with_config(config: ConfigSource) -> Self {
        Self { config }
    }

    /// List the runs of every DAG configured on a process.
    ///
    /// A DAG whose listing Airflow rejects is logged and skipped; the other
    /// DAGs are still listed.
    pub async fn list_runs(&self, process: &Process) -> Result<Vec<RunResult>> {
        let config = self.config.resolve(process)?;

        let dag_ids = params::dag_ids(process);
        if dag_ids.is_empty() {
            warn!(process = %process.code, "no DAG id configured, nothing to list");
            return Ok(Vec::new());
        }

        let client = config.client()?;
        let token = client
            .auth()
            .request_token(&config.username, &config.password)
            .await?;
        let dag_runs = client.dag_runs(token);
        let query = ListDagRunsQuery {
            limit: params::runs_limit(process),
            ..Default::default()
        };

        let mut results = Vec::new();
        for dag_id in &dag_ids {
            info!(process = %process.code, dag_id = %dag_id, "Retrieving Airflow runs");
            match dag_runs.list(dag_id, &query).await {
                Ok(runs) => results.extend(runs.iter().map(|run| to_run_result(process, run))),
                Err(e @ ClientError::Api { .. }) => {
                    error!(dag_id = %dag_id, error = %e, "Failed to get DAG runs");
                }
                Err(e) => return Err(e.into()),
            }
        }

        sort_by_recency(&mut results);
        Ok(results)
    }
}

#[async_trait]
impl HistoryProvider for AirflowRunHistoryProvider {
    type Error = AdapterError;

    async fn get_runs(&self, process: &Process) -> Result<Vec<RunResult>> {
        self.list_runs(process).await
    }
}

/// Convert an Airflow DAG run into a Spade run record.
pub fn to_run_result(process: &Process, run: &DagRun) -> RunResult {
    let (status, outcome) = map_state(run.state());
    let mut result = RunResult::new(process, status)
        .with_created_at(run.created_at())
        .with_user_id(
            run.conf_value(USER_ID_CONF_KEY)
                .and_then(params::correlation_value),
        );
    result.result = outcome;
    result.output = serde_json::to_value(run).ok();
    result
}

/// Sort runs newest first; runs without a creation time go last.
///
/// The sort is stable, so runs Airflow returned in order keep it on ties.
pub fn sort_by_recency(runs: &mut [RunResult]) {
    runs.sort_by_key(|run| Reverse(run.created_at));
}
