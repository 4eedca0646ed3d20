//! HTTP client for the Apache Airflow v2 REST API.
//!
//! Covers the slice of the API needed to drive DAGs from another system:
//! session login, triggering a DAG run and listing DAG runs.
//!
//! # Example
//!
//! ```no_run
//! use spade_airflow_client::{AirflowClient, ListDagRunsQuery, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = AirflowClient::builder()
//!     .base_url("https://airflow.example.com")
//!     .build()?;
//!
//! // Exchange credentials for a session token
//! let token = client.auth().request_token("admin", "secret").await?;
//!
//! // Start a run
//! let run = client
//!     .dag_runs(&token)
//!     .trigger("daily_load", serde_json::Map::new())
//!     .await?;
//! println!("Started {:?}", run.dag_run_id);
//!
//! // Most recent runs first
//! let runs = client
//!     .dag_runs(&token)
//!     .list("daily_load", &ListDagRunsQuery::default())
//!     .await?;
//! for run in runs {
//!     println!("{:?}: {:?}", run.dag_run_id, run.state);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::{AuthApi, DagRunsApi, TOKEN_COOKIE};
pub use client::{AirflowClient, ClientBuilder};
pub use error::{Error, Result};
pub use types::*;
