//! Login API.

use crate::client::AirflowClient;
use crate::error::{Error, Result};
use crate::types::TokenRequest;

/// Name of the cookie Airflow stores the session token in.
pub const TOKEN_COOKIE: &str = "_token";

/// Login API client.
pub struct AuthApi {
    client: AirflowClient,
}

impl AuthApi {
    pub(crate) fn new(client: AirflowClient) -> Self {
        Self { client }
    }

    /// Exchange a username and password for a session token.
    ///
    /// Airflow answers `POST /auth/token` with the token in the `_token`
    /// cookie. Any status above 400, or a response without that cookie, is an
    /// [`Error::Auth`].
    pub async fn request_token(&self, username: &str, password: &str) -> Result<String> {
        let url = self.client.url("auth/token")?;
        let inner = self.client.inner();
        tracing::debug!(%url, username, "requesting Airflow token");

        let response = inner
            .http
            .post(url)
            .json(&TokenRequest { username, password })
            .timeout(inner.timeout)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() > 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("Failed to get Airflow token: {}", body)));
        }

        response
            .cookies()
            .find(|cookie| cookie.name() == TOKEN_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                Error::Auth("Failed to get Airflow token: No token in response".to_string())
            })
    }
}
