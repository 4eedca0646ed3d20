//! Mapping Airflow run states onto Spade run status and outcome.

use spade_airflow_client::DagRunState;
use spade_types::{RunOutcome, RunStatus};

/// Map an Airflow DAG run state to a Spade status and outcome.
///
/// Only terminal states carry an outcome. Queued and unrecognised states
/// are reported as `new`.
pub fn map_state(state: DagRunState) -> (RunStatus, Option<RunOutcome>) {
    match state {
        DagRunState::Success => (RunStatus::Finished, Some(RunOutcome::Success)),
        DagRunState::Failed => (RunStatus::Finished, Some(RunOutcome::Failed)),
        DagRunState::Running | DagRunState::Restarting => (RunStatus::Running, None),
        DagRunState::Queued | DagRunState::Other => (RunStatus::New, None),
    }
}
