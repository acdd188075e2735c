//! Thin reqwest transport wrapper
//!
//! One place to build the underlying client (timeout, default headers) and
//! to map reqwest failures onto the client error taxonomy. The refresh
//! exchange also goes through this type directly, bypassing the
//! interceptor pipeline in [`crate::client`] to avoid recursing into it.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::error::ClientError;

/// Default per-request deadline, matching the dashboard's transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP transport with a fixed per-request deadline.
#[derive(Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpTransport {
    /// Start building a transport.
    #[must_use]
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ClientError> {
        Self::builder().build()
    }

    /// The configured default deadline.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a request builder on the underlying client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute a request builder, mapping transport failures.
    ///
    /// Non-2xx responses are returned as `Ok`; status handling belongs to
    /// the caller, which needs the body for business-error parsing.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        self.send_with_deadline(builder, self.timeout).await
    }

    /// Like [`Self::send`], but with the deadline the caller actually set
    /// on the request, so timeout errors report the right duration.
    pub async fn send_with_deadline(
        &self,
        builder: RequestBuilder,
        deadline: Duration,
    ) -> Result<Response, ClientError> {
        let request = builder
            .build()
            .map_err(|err| ClientError::Config(err.to_string()))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, %url, %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(ClientError::from_reqwest(&err, deadline))
            }
        }
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self { timeout: DEFAULT_TIMEOUT, user_agent: None }
    }
}

impl HttpTransportBuilder {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the underlying client cannot be
    /// constructed.
    pub fn build(self) -> Result<HttpTransport, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder
            .build()
            .map_err(|err| ClientError::Config(err.to_string()))?;

        Ok(HttpTransport { client, timeout: self.timeout })
    }
}
