//! Apache Airflow executor and history provider for Spade.
//!
//! A Spade process is bound to one or more Airflow DAGs through its system
//! params. Running the process triggers a DAG run stamped with the id and
//! email of the user who started it; the process history lists the DAGs'
//! runs with their Airflow state translated to Spade's.
//!
//! # Components
//!
//! - [`config`] - connection settings, resolved per call from system params and env vars
//! - [`executor`] - [`AirflowRunDagExecutor`], the Spade `Executor`
//! - [`history`] - [`AirflowRunHistoryProvider`], the Spade `HistoryProvider`
//! - [`status`] - Airflow state to Spade status/outcome mapping
//!
//! # Example
//!
//! ```no_run
//! use serde_json::{Map, json};
//! use spade_airflow::AirflowRunDagExecutor;
//! use spade_types::{Executor, Process, UserIdentity};
//!
//! # async fn example() -> spade_airflow::Result<()> {
//! let process = Process::new("daily-load")
//!     .with_param("url", "https://airflow.example.com")
//!     .with_param("username", "spade")
//!     .with_param("password", "secret")
//!     .with_param("dag_id", "daily_load");
//!
//! let mut params = Map::new();
//! params.insert("date".to_string(), json!("2025-03-01"));
//!
//! let result = AirflowRunDagExecutor::new()
//!     .run(&process, &params, &UserIdentity::new("42", "ada@example.com"))
//!     .await?;
//! println!("{}", result.status);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod history;
pub mod params;
pub mod status;

pub use config::{AirflowConfig, ConfigSource};
pub use error::{AdapterError, Result};
pub use executor::{
    ALREADY_RUNNING, AirflowRunDagExecutor, CONFIRMATION_MISSING, NO_DAG_ID, build_conf,
};
pub use history::{AirflowRunHistoryProvider, sort_by_recency, to_run_result};
pub use status::map_state;
