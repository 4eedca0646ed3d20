//! Connection settings for an Airflow webserver.
//!
//! Settings are resolved on every call from the process's system params,
//! falling back to environment variables:
//!
//! | param | env var | required |
//! |---|---|---|
//! | `url` | `SPADE_AIRFLOW_URL` | yes |
//! | `username` | `SPADE_AIRFLOW_USERNAME` | yes |
//! | `password` | `SPADE_AIRFLOW_PASSWORD` | yes |
//! | `verify_ssl` | `SPADE_AIRFLOW_VERIFY_SSL` | no, default `true` |
//! | `allow_multiple_runs` | | no, default `false` |

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use spade_airflow_client::AirflowClient;
use spade_types::Process;

use crate::error::{AdapterError, Result};
use crate::params::{as_flag, as_secret, as_string};

pub const URL_PARAM: &str = "url";
pub const USERNAME_PARAM: &str = "username";
pub const PASSWORD_PARAM: &str = "password";
pub const VERIFY_SSL_PARAM: &str = "verify_ssl";
pub const ALLOW_MULTIPLE_RUNS_PARAM: &str = "allow_multiple_runs";

pub const URL_ENV: &str = "SPADE_AIRFLOW_URL";
pub const USERNAME_ENV: &str = "SPADE_AIRFLOW_USERNAME";
pub const PASSWORD_ENV: &str = "SPADE_AIRFLOW_PASSWORD";
pub const VERIFY_SSL_ENV: &str = "SPADE_AIRFLOW_VERIFY_SSL";

/// Resolved connection settings.
#[derive(Clone)]
pub struct AirflowConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Verify the webserver's TLS certificate.
    pub verify_tls: bool,
    /// Trigger even while another run of the DAG is in flight.
    pub allow_multiple_runs: bool,
}

impl fmt::Debug for AirflowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirflowConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("allow_multiple_runs", &self.allow_multiple_runs)
            .finish()
    }
}

impl AirflowConfig {
    /// Resolve settings for a process with a custom environment lookup.
    ///
    /// Fails with [`AdapterError::Config`] when url, username or password
    /// cannot be found anywhere. The url is trimmed; credentials are used
    /// exactly as given, from either source.
    pub fn resolve<F>(process: &Process, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |param: &str, env_var: &str, read: fn(&Value) -> Option<String>| {
            process
                .param(param)
                .and_then(read)
                .or_else(|| env(env_var).and_then(|v| read(&Value::String(v))))
        };

        let mut missing = Vec::new();
        let base_url = lookup(URL_PARAM, URL_ENV, as_string);
        let username = lookup(USERNAME_PARAM, USERNAME_ENV, as_secret);
        let password = lookup(PASSWORD_PARAM, PASSWORD_ENV, as_secret);
        if base_url.is_none() {
            missing.push(URL_PARAM);
        }
        if username.is_none() {
            missing.push(USERNAME_PARAM);
        }
        if password.is_none() {
            missing.push(PASSWORD_PARAM);
        }
        let (Some(base_url), Some(username), Some(password)) = (base_url, username, password)
        else {
            return Err(AdapterError::Config(format!(
                "Airflow URL, username, or password not set (missing: {})",
                missing.join(", ")
            )));
        };

        let verify_tls = process
            .param(VERIFY_SSL_PARAM)
            .and_then(as_flag)
            .or_else(|| env(VERIFY_SSL_ENV).and_then(|v| as_flag(&Value::String(v))))
            .unwrap_or(true);

        let allow_multiple_runs = process
            .param(ALLOW_MULTIPLE_RUNS_PARAM)
            .and_then(as_flag)
            .unwrap_or(false);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
            verify_tls,
            allow_multiple_runs,
        })
    }

    /// Build an HTTP client for these settings.
    pub fn client(&self) -> Result<AirflowClient> {
        let client = AirflowClient::builder()
            .base_url(&self.base_url)
            .verify_tls(self.verify_tls)
            .build()
            .map_err(|e| AdapterError::Config(e.to_string()))?;
        Ok(client)
    }
}

/// Environment lookup used when a setting is not in the system params.
type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Where executors and history providers resolve their settings from.
#[derive(Clone)]
pub struct ConfigSource {
    env: EnvLookup,
}

impl ConfigSource {
    /// System params, then the process environment.
    pub fn process_env() -> Self {
        Self::from_fn(|key| std::env::var(key).ok())
    }

    /// System params only.
    pub fn params_only() -> Self {
        Self::from_fn(|_| None)
    }

    /// System params, then a custom lookup.
    pub fn from_fn<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            env: Arc::new(lookup),
        }
    }

    /// Resolve settings for a process.
    pub fn resolve(&self, process: &Process) -> Result<AirflowConfig> {
        AirflowConfig::resolve(process, |key| (self.env)(key))
    }
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::process_env()
    }
}

impl fmt::Debug for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSource").finish_non_exhaustive()
    }
}
