//! DAG runs API.

use serde_json::{Map, Value};

use crate::client::AirflowClient;
use crate::error::Result;
use crate::types::{DagRun, ListDagRunsQuery, ListDagRunsResponse, TriggerDagRunRequest};

/// Sort order requested for run listings.
const ORDER_BY_NEWEST: &str = "-logical_date";

/// DAG runs API client, bound to a session token.
pub struct DagRunsApi {
    client: AirflowClient,
    token: String,
}

impl DagRunsApi {
    pub(crate) fn new(client: AirflowClient, token: String) -> Self {
        Self { client, token }
    }

    /// Trigger a new run of a DAG with the given configuration.
    ///
    /// Returns the run Airflow created, or `None` when the run was accepted
    /// but the response body is not a readable DAG run. Any status other
    /// than 200 is an [`Error::Api`](crate::Error::Api) carrying the
    /// response body.
    pub async fn trigger(&self, dag_id: &str, conf: Map<String, Value>) -> Result<Option<DagRun>> {
        let url = self.client.dag_runs_url(dag_id)?;
        self.client
            .post(url, &self.token, &TriggerDagRunRequest { conf })
            .await
    }

    /// List runs of a DAG, newest logical date first.
    pub async fn list(&self, dag_id: &str, query: &ListDagRunsQuery) -> Result<Vec<DagRun>> {
        let mut url = self.client.dag_runs_url(dag_id)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("order_by", ORDER_BY_NEWEST);
            for state in &query.states {
                pairs.append_pair("state", state);
            }
        }
        let response: ListDagRunsResponse = self
            .client
            .get_with_query(url, &self.token, query)
            .await?;
        Ok(response.dag_runs)
    }
}
