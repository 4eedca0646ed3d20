//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::api::{AuthApi, DagRunsApi};
use crate::error::{Error, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Airflow REST API client.
///
/// Cheap to clone. Holds no session state: tokens are obtained through
/// [`AirflowClient::auth`] and passed explicitly to the authenticated APIs.
///
/// # Example
///
/// ```no_run
/// use spade_airflow_client::AirflowClient;
///
/// # async fn example() -> spade_airflow_client::Result<()> {
/// let client = AirflowClient::builder()
///     .base_url("https://airflow.example.com")
///     .verify_tls(false)
///     .build()?;
///
/// let token = client.auth().request_token("admin", "secret").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AirflowClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL of the Airflow webserver, always ending in `/`.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
}

impl std::fmt::Debug for AirflowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirflowClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl AirflowClient {
    /// Get access to the inner client state (for API implementations).
    pub(crate) fn inner(&self) -> &ClientInner {
        &self.inner
    }
}

impl AirflowClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the login API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the DAG runs API with a session token.
    pub fn dag_runs(&self, token: impl Into<String>) -> DagRunsApi {
        DagRunsApi::new(self.clone(), token.into())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for a path relative to the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(Error::from)
    }

    /// Build the URL of the DAG runs collection of one DAG.
    ///
    /// The DAG id is pushed as a single, percent-encoded path segment.
    pub(crate) fn dag_runs_url(&self, dag_id: &str) -> Result<Url> {
        let mut url = self.url("api/v2/dags")?;
        let base = url.to_string();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("base URL cannot be a base: {}", base)))?
            .pop_if_empty()
            .push(dag_id)
            .push("dagRuns");
        Ok(url)
    }

    /// Make an authenticated GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, url: Url, token: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make an authenticated POST request.
    ///
    /// A 200 whose body cannot be decoded as `T` still counts as success and
    /// yields `None`: the request was accepted, only its echo is unreadable.
    pub(crate) async fn post<T, B>(&self, url: Url, token: &str, body: &B) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        tracing::debug!(%url, "POST");
        let response = self
            .inner
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(Self::extract_error(response).await);
        }
        let bytes = response.bytes().await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(error = %e, "accepted response body could not be decoded");
                Ok(None)
            }
        }
    }

    /// Handle a response, extracting the body or error.
    ///
    /// Airflow answers the list endpoint with 200; any other status,
    /// including other 2xx codes, is reported as an error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status() == StatusCode::OK {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            Err(Self::extract_error(response).await)
        }
    }

    /// Turn a failed response into an error carrying the raw body.
    pub(crate) async fn extract_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let message = match response.text().await {
            Ok(text) if !text.is_empty() => text,
            _ => format!("HTTP {}", status),
        };
        Error::Api { status, message }
    }
}

/// Builder for creating an AirflowClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    verify_tls: bool,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the base URL of the Airflow webserver.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AirflowClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let user_agent = format!("spade-airflow-client/{}", env!("CARGO_PKG_VERSION"));

        // The login endpoint hands out its token in a cookie on the first
        // response; following a redirect would drop it.
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(!self.verify_tls)
            .build()?;

        Ok(AirflowClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
