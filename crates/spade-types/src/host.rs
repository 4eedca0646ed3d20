//! Executor and history provider traits.
//!
//! The platform calls these; implementations live in executor crates such as
//! `spade-airflow`.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::run::{Process, RunResult, UserIdentity};

/// Starts runs of a process on some remote system.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Error for failures that abort the call (bad configuration, rejected
    /// credentials, transport errors). Expected failures such as a rejected
    /// run are reported as a failed [`RunResult`] instead.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Start a run.
    ///
    /// # Arguments
    /// * `process` - The process being run
    /// * `user_params` - Parameters entered by the user for this run
    /// * `user` - The user starting the run
    async fn run(
        &self,
        process: &Process,
        user_params: &Map<String, Value>,
        user: &UserIdentity,
    ) -> Result<RunResult, Self::Error>;
}

/// Reads past and current runs of a process from some remote system.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// List runs of a process, most recent first.
    async fn get_runs(&self, process: &Process) -> Result<Vec<RunResult>, Self::Error>;
}
