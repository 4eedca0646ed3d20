//! API endpoint implementations.

mod auth;
mod dag_runs;

pub use auth::{AuthApi, TOKEN_COOKIE};
pub use dag_runs::DagRunsApi;
