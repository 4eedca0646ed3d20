//! CLI command handlers.

pub mod runs;
pub mod trigger;

use serde_json::Value;
use spade_airflow::config::{PASSWORD_PARAM, URL_PARAM, USERNAME_PARAM, VERIFY_SSL_PARAM};
use spade_types::Process;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Airflow webserver URL.
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Verify the webserver's TLS certificate.
    pub verify_tls: bool,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Build the process the executor sees, with connection settings from
    /// the command line.
    ///
    /// Unset settings are left out so the executor reports them as missing.
    pub fn process(&self, dag_id: impl Into<Value>) -> Process {
        let mut process = Process::new("cli")
            .with_param("dag_id", dag_id)
            .with_param(VERIFY_SSL_PARAM, self.verify_tls);
        for (key, value) in [
            (URL_PARAM, &self.url),
            (USERNAME_PARAM, &self.username),
            (PASSWORD_PARAM, &self.password),
        ] {
            if let Some(value) = value {
                process = process.with_param(key, value.as_str());
            }
        }
        process
    }
}
