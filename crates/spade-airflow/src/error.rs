//! Error types for the Airflow adapter.

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Failures that abort an executor or history provider call.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Connection settings are missing or malformed.
    #[error("Airflow configuration error: {0}")]
    Config(String),

    /// Login failed, or the Airflow webserver could not be reached.
    #[error(transparent)]
    Client(#[from] spade_airflow_client::Error),
}

impl AdapterError {
    /// Check if this is a configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(self, AdapterError::Config(_))
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AdapterError::Client(e) if e.is_auth_error())
    }
}
