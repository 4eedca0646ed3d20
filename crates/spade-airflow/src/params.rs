//! Reading loosely typed process and user parameters.

use serde_json::{Map, Value};
use spade_types::Process;

/// Key holding the DAG id (a string, or a list of strings for history).
pub const DAG_ID: &str = "dag_id";
/// Alternative key for several DAG ids.
pub const DAG_IDS: &str = "dag_ids";
/// User param the platform sets once the user confirmed the run.
pub const CONFIRM: &str = "confirm";
/// Optional cap on the number of runs listed per DAG.
pub const RUNS_LIMIT: &str = "runs_limit";

/// Key under which the triggering user's id is stored in a run's conf.
pub const USER_ID_CONF_KEY: &str = "spade_user_id";
/// Key under which the triggering user's email is stored in a run's conf.
pub const USER_EMAIL_CONF_KEY: &str = "spade_user_email";

/// A non-empty string value.
pub(crate) fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// A non-blank string value, kept exactly as given.
///
/// Used for credentials, where surrounding whitespace is significant.
pub(crate) fn as_secret(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// A boolean flag, given either as a JSON bool or as a string.
///
/// Strings that are not recognisable booleans yield `None`.
pub(crate) fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Every DAG id configured on a process, in order, without duplicates.
pub fn dag_ids(process: &Process) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for key in [DAG_ID, DAG_IDS] {
        let found = match process.param(key) {
            Some(Value::Array(items)) => items.iter().filter_map(as_string).collect(),
            Some(value) => as_string(value).into_iter().collect(),
            None => Vec::new(),
        };
        for id in found {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// The DAG id to trigger: a user override first, then the process's own.
pub fn trigger_dag_id(process: &Process, user_params: &Map<String, Value>) -> Option<String> {
    user_params
        .get(DAG_ID)
        .and_then(as_string)
        .or_else(|| dag_ids(process).into_iter().next())
}

/// Whether the user explicitly declined to confirm the run.
///
/// An absent flag counts as confirmed.
pub fn confirmation_declined(user_params: &Map<String, Value>) -> bool {
    user_params.get(CONFIRM).and_then(as_flag) == Some(false)
}

/// The per-DAG listing limit configured on a process.
pub fn runs_limit(process: &Process) -> Option<u32> {
    match process.param(RUNS_LIMIT)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a correlation value back from a run's conf.
///
/// Ids may have been stored as numbers by older triggers.
pub(crate) fn correlation_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
