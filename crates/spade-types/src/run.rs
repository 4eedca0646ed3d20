//! Process descriptors and run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp type used for run records.
pub type Timestamp = DateTime<Utc>;

/// A process as configured on the platform.
///
/// `system_params` holds the executor-specific settings an administrator
/// attached to the process (connection details, remote job ids, flags).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Process {
    /// Unique process code.
    pub code: String,
    /// Executor-specific settings.
    #[serde(default)]
    pub system_params: Map<String, Value>,
}

impl Process {
    /// Create a process with no system params.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            system_params: Map::new(),
        }
    }

    /// Add a system param.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.system_params.insert(key.into(), value.into());
        self
    }

    /// Look up a system param.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.system_params.get(key)
    }
}

/// The platform user on whose behalf a run is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Known to the remote system but not started yet.
    New,
    Running,
    Finished,
    /// The run could not be started.
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::New => "new",
            RunStatus::Running => "running",
            RunStatus::Finished => "finished",
            RunStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    Failed,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Success => f.write_str("success"),
            RunOutcome::Failed => f.write_str("failed"),
        }
    }
}

/// A run of a process, either just triggered or read back from history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Code of the process this run belongs to.
    pub process: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RunOutcome>,
    /// Raw payload returned by the remote system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// Id of the platform user that started the run, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RunResult {
    /// A run with the given status and nothing else filled in.
    pub fn new(process: &Process, status: RunStatus) -> Self {
        Self {
            process: process.code.clone(),
            status,
            result: None,
            output: None,
            created_at: None,
            user_id: None,
            error_message: None,
        }
    }

    /// A run that was accepted by the remote system.
    pub fn running(process: &Process) -> Self {
        Self::new(process, RunStatus::Running)
    }

    /// A run that could not be started.
    pub fn failed(process: &Process, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::new(process, RunStatus::Failed)
        }
    }

    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_created_at(mut self, created_at: Option<Timestamp>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Whether the run failed to start.
    pub fn is_failed(&self) -> bool {
        self.status == RunStatus::Failed
    }
}
