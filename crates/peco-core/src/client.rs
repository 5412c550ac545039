//! HTTP transport and session handling.
//!
//! Requests go through a [`ConnectionProvider`], which hands out a [`Session`]
//! for each request. A caller-supplied `reqwest::Client` is reused through
//! [`SharedSession`]; otherwise [`EphemeralSessions`] builds a client for the
//! request and the session guard releases it when dropped.

use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

const USER_AGENT: &str = concat!("peco-core/", env!("CARGO_PKG_VERSION"));

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// HTTP client configuration.
///
/// Transport tuning used when the client has to build its own connections.
/// No timeout is set by default; callers that want one configure it here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Option<Duration>,

    /// Connect timeout
    pub connect_timeout: Option<Duration>,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,

    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build a `reqwest::Client` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the client cannot be constructed.
    pub fn build_http_client(&self) -> Result<Client> {
        let mut builder = ClientBuilder::new()
            .user_agent(self.user_agent.as_str())
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .gzip(self.enable_compression);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Who owns the connection behind a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Borrowed from the caller and left open afterwards
    Shared,
    /// Created for one request and released with the session
    Ephemeral,
}

/// A connection handle scoped to a single request.
///
/// Dropping the session releases an ephemeral connection pool. This happens
/// on success, on error and when the request future is dropped mid-flight.
#[derive(Debug)]
pub struct Session {
    client: Client,
    ownership: Ownership,
}

impl Session {
    /// Wrap a caller-owned client.
    #[must_use]
    pub const fn shared(client: Client) -> Self {
        Self {
            client,
            ownership: Ownership::Shared,
        }
    }

    /// Wrap a client created for this request only.
    #[must_use]
    pub const fn ephemeral(client: Client) -> Self {
        Self {
            client,
            ownership: Ownership::Ephemeral,
        }
    }

    /// Return the underlying HTTP client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Return who owns the connection.
    #[must_use]
    pub const fn ownership(&self) -> Ownership {
        self.ownership
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.ownership == Ownership::Ephemeral {
            trace!("releasing ephemeral HTTP session");
        }
    }
}

/// Source of connection sessions.
///
/// Implementations decide whether requests share a pooled client or get a
/// fresh one each time. Both must be indistinguishable to the consumer.
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionProvider: Send + Sync {
    /// Acquire a session for one request.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be set up.
    fn acquire(&self) -> Result<Session>;
}

/// Provider that reuses a caller-supplied client.
#[derive(Debug, Clone)]
pub struct SharedSession {
    client: Client,
}

impl SharedSession {
    /// Share `client` across all requests.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ConnectionProvider for SharedSession {
    fn acquire(&self) -> Result<Session> {
        Ok(Session::shared(self.client.clone()))
    }
}

/// Provider that creates and disposes of a client per request.
#[derive(Debug, Clone, Default)]
pub struct EphemeralSessions {
    config: ClientConfig,
}

impl EphemeralSessions {
    /// Build per-request clients from `config`.
    #[must_use]
    pub const fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl ConnectionProvider for EphemeralSessions {
    fn acquire(&self) -> Result<Session> {
        trace!("creating ephemeral HTTP session");
        self.config.build_http_client().map(Session::ephemeral)
    }
}

/// Sends requests and decodes JSON bodies.
///
/// Any status other than the expected one is an [`Error::HttpError`] and the
/// body is not inspected. Bodies are decoded from raw bytes, so servers that
/// label JSON as `text/html` are accepted.
#[derive(Clone)]
pub struct JsonTransport {
    provider: Arc<dyn ConnectionProvider>,
    expected_status: StatusCode,
}

impl JsonTransport {
    /// Create a transport over `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn ConnectionProvider>, expected_status: StatusCode) -> Self {
        Self {
            provider,
            expected_status,
        }
    }

    /// Return the status treated as success.
    #[must_use]
    pub const fn expected_status(&self) -> StatusCode {
        self.expected_status
    }

    /// Issue a GET request and parse the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HttpError`] on transport failure or unexpected
    /// status, and [`Error::BadJson`] if the body is not JSON.
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        self.send::<()>(Method::GET, url, None).await
    }

    /// Issue a POST request with a JSON payload and parse the JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`JsonTransport::get_json`].
    pub async fn post_json<B>(&self, url: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, url, Some(body)).await
    }

    async fn send<B>(&self, method: Method, url: &str, body: Option<&B>) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let url = Url::parse(url)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid URL `{url}`: {err}")))?;

        let session = self.provider.acquire()?;

        let mut request = session
            .client()
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json");
        if let Some(payload) = body {
            request = request.json(payload);
        }

        debug!(%method, %url, ownership = ?session.ownership(), "Sending PECO request");

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, %url, %status, "Received PECO response");

        if status != self.expected_status {
            return Err(Error::HttpError(format!("{method} {url} returned {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(|err| {
            Error::BadJson(format!(
                "response from {url} ({}) is not valid JSON: {err}",
                content_type.as_deref().unwrap_or("no content type")
            ))
        })
    }
}
