//! Request and response types for the Airflow v2 API.
//!
//! Responses are deserialized permissively: Airflow adds fields between
//! releases, so anything not modelled here is kept in `extra` and survives a
//! round trip through [`serde_json::to_value`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /auth/token`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

// ─────────────────────────────────────────────────────────────────────────────
// DAG runs
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/v2/dags/{dag_id}/dagRuns`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerDagRunRequest {
    /// Configuration handed to the DAG run.
    pub conf: Map<String, Value>,
}

/// Query parameters for listing DAG runs.
///
/// Runs are always ordered by logical date, newest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListDagRunsQuery {
    /// Maximum number of runs to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Number of runs to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Only return runs in one of these states; empty means any state.
    ///
    /// Sent as one repeated `state` parameter per entry.
    #[serde(skip)]
    pub states: Vec<String>,
}

impl ListDagRunsQuery {
    /// Query for the `limit` most recent runs.
    pub fn latest(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Restrict the query to runs in the given states.
    pub fn in_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }
}

/// Response of `GET /api/v2/dags/{dag_id}/dagRuns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDagRunsResponse {
    pub dag_runs: Vec<DagRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_entries: Option<u64>,
}

/// A DAG run as returned by Airflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DagRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dag_run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dag_id: Option<String>,
    /// Raw state string, see [`DagRun::state`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_after: Option<String>,
    /// Configuration the run was triggered with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<Map<String, Value>>,
    /// Every other field Airflow sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DagRun {
    /// Parsed run state.
    pub fn state(&self) -> DagRunState {
        self.state
            .as_deref()
            .map(DagRunState::from)
            .unwrap_or(DagRunState::Other)
    }

    /// When the run was created.
    ///
    /// Airflow fills these in at different points of a run's life, so the
    /// first one present wins: `queued_at`, `logical_date`, `start_date`,
    /// `run_after`. Unparseable values are skipped.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        [
            &self.queued_at,
            &self.logical_date,
            &self.start_date,
            &self.run_after,
        ]
        .into_iter()
        .filter_map(|value| value.as_deref())
        .find_map(parse_timestamp)
    }

    /// Look up a key in the run's configuration.
    pub fn conf_value(&self, key: &str) -> Option<&Value> {
        self.conf.as_ref().and_then(|conf| conf.get(key))
    }
}

/// Parse an ISO 8601 timestamp as sent by Airflow.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// State of a DAG run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DagRunState {
    Queued,
    Running,
    Restarting,
    Success,
    Failed,
    /// Missing or not recognised.
    Other,
}

impl DagRunState {
    /// Whether a run in this state occupies the DAG.
    pub fn is_active(self) -> bool {
        matches!(self, DagRunState::Running | DagRunState::Restarting)
    }
}

impl From<&str> for DagRunState {
    fn from(s: &str) -> Self {
        match s {
            "queued" => DagRunState::Queued,
            "running" => DagRunState::Running,
            "restarting" => DagRunState::Restarting,
            "success" => DagRunState::Success,
            "failed" => DagRunState::Failed,
            _ => DagRunState::Other,
        }
    }
}
