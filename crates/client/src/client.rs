//! Authenticated API client with single-flight token refresh
//!
//! The request pipeline is an explicit middleware chain rather than
//! mutable interceptor callbacks: `prepare` builds the request (query
//! cleaning, bearer attachment happens at send time), `attempt` sends it
//! and splits the outcome into payload / business error / transport error,
//! and `execute` runs the error policy on top — toast suppression, the
//! expired-token check, and the refresh gate.
//!
//! Refresh is single-flight: the first request to observe the expired
//! condition becomes the leader and performs exactly one refresh exchange
//! over the bare transport; every other request that fails with the same
//! condition while the exchange is in flight registers as a waiter. Once
//! the exchange settles the waiters are woken, each replays its own
//! original request with the renewed credentials (replays settle
//! independently, with no relative-order guarantee), and the gate is left
//! empty and idle whatever the outcome.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use mintgate_common::envelope::{BaseResponse, ErrorBody};
use mintgate_common::params::{clean_params, is_empty_value, to_query_string};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::ClientError;
use crate::http::{HttpTransport, DEFAULT_TIMEOUT};
use crate::session::{RefreshTokenResponse, SessionStore, SessionTokens};
use crate::suppress::{is_suppressed, message_key, SuppressionRule, DEFAULT_RULES};
use crate::traits::{
    CredentialStore, Navigator, NoopCredentialStore, NoopNavigator, NoopNotifier, Notifier,
};

/// Refresh exchange endpoint, relative to the base URL.
pub const REFRESH_TOKEN_PATH: &str = "merchants/refresh-token";

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the merchant API (e.g. `https://api.example.com/v1`).
    pub base_url: String,
    /// Per-request deadline.
    pub timeout: Duration,
    /// Toast-suppression table checked against every error response.
    pub suppression: Vec<SuppressionRule>,
}

impl ApiClientConfig {
    /// Configuration with the default timeout and suppression table.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            suppression: DEFAULT_RULES.clone(),
        }
    }
}

/// Per-request options: cleaned query parameters, cancellation, and an
/// optional deadline override.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Option<Value>,
    pub cancel: Option<CancellationToken>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Options carrying the given query parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the parameters fail to serialize.
    pub fn query<T: Serialize>(params: &T) -> Result<Self, ClientError> {
        let value =
            serde_json::to_value(params).map_err(|err| ClientError::Config(err.to_string()))?;
        Ok(Self { query: Some(value), ..Self::default() })
    }

    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A fully built request, ready to send (and re-send on replay).
struct Prepared {
    method: Method,
    path: String,
    url: String,
    body: Option<Value>,
    cancel: Option<CancellationToken>,
    timeout: Option<Duration>,
}

/// Outcome of one send: a business error carries the parsed body and may
/// enter the refresh flow; a transport error never does.
enum AttemptFailure {
    Api(ErrorBody),
    Transport(ClientError),
}

/// Position assigned to a request that hit the expired-token condition.
enum GatePosition {
    /// First to arrive: performs the refresh exchange.
    Leader,
    /// Refresh already in flight: waits for its outcome.
    Follower(oneshot::Receiver<bool>),
}

/// Single-flight refresh coordination: the in-flight flag plus the waiter
/// list, guarded by one mutex and mutated only in short critical sections
/// with no await while held.
#[derive(Default)]
struct RefreshGate {
    state: Mutex<GateState>,
}

#[derive(Default)]
struct GateState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<bool>>,
}

impl RefreshGate {
    fn join(&self) -> GatePosition {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            GatePosition::Follower(rx)
        } else {
            state.refreshing = true;
            GatePosition::Leader
        }
    }

    /// Reset the flag, drain the waiter list, and wake every waiter with
    /// the refresh outcome. Runs on both the success and failure paths.
    fn settle(&self, refreshed: bool) {
        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A waiter may have been cancelled in the meantime.
            let _ = waiter.send(refreshed);
        }
    }

    fn is_idle(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        !state.refreshing && state.waiters.is_empty()
    }
}

/// Authenticated merchant API client.
///
/// All mutable state (session credentials, refresh gate) is owned by the
/// instance; share it with `Arc` where needed.
pub struct ApiClient {
    transport: HttpTransport,
    config: ApiClientConfig,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    gate: RefreshGate,
}

impl ApiClient {
    /// Create a client with default collaborators (no toasts, no redirect,
    /// no persistence).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the transport cannot be built.
    pub fn new(config: ApiClientConfig) -> Result<Self, ClientError> {
        Self::builder().config(config).build()
    }

    /// Create a builder for fluent configuration.
    #[must_use]
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// The session store owned by this client.
    #[must_use]
    pub fn session(&self) -> Arc<SessionStore> {
        self.session.clone()
    }

    /// Whether a token refresh exchange is currently in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        !self.gate.is_idle()
    }

    /// Execute a GET request and return the unwrapped payload.
    ///
    /// # Errors
    ///
    /// Returns the normalized business error body for API failures, or a
    /// transport error for network-level ones.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        self.get_with(path, RequestOptions::default()).await
    }

    /// GET with query parameters, cancellation, or a deadline override.
    #[instrument(skip(self, options), fields(path = %path))]
    pub async fn get_with<R: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let prepared = self.prepare(Method::GET, path, None, options)?;
        self.run(prepared).await
    }

    /// Execute a POST request and return the unwrapped payload.
    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        self.post_with(path, body, RequestOptions::default()).await
    }

    /// POST with per-request options.
    #[instrument(skip(self, body, options), fields(path = %path))]
    pub async fn post_with<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let body = Self::encode_body(body)?;
        let prepared = self.prepare(Method::POST, path, Some(body), options)?;
        self.run(prepared).await
    }

    /// Execute a PUT request and return the unwrapped payload.
    pub async fn put<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        self.put_with(path, body, RequestOptions::default()).await
    }

    /// PUT with per-request options.
    #[instrument(skip(self, body, options), fields(path = %path))]
    pub async fn put_with<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let body = Self::encode_body(body)?;
        let prepared = self.prepare(Method::PUT, path, Some(body), options)?;
        self.run(prepared).await
    }

    /// Execute a PATCH request and return the unwrapped payload.
    pub async fn patch<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        self.patch_with(path, body, RequestOptions::default()).await
    }

    /// PATCH with per-request options.
    #[instrument(skip(self, body, options), fields(path = %path))]
    pub async fn patch_with<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let body = Self::encode_body(body)?;
        let prepared = self.prepare(Method::PATCH, path, Some(body), options)?;
        self.run(prepared).await
    }

    /// Execute a DELETE request and return the unwrapped payload.
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        self.delete_with(path, RequestOptions::default()).await
    }

    /// DELETE with per-request options.
    #[instrument(skip(self, options), fields(path = %path))]
    pub async fn delete_with<R: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<R, ClientError> {
        let prepared = self.prepare(Method::DELETE, path, None, options)?;
        self.run(prepared).await
    }

    // --- pipeline stages ---------------------------------------------------

    fn encode_body<B: Serialize>(body: &B) -> Result<Value, ClientError> {
        serde_json::to_value(body).map_err(|err| ClientError::Config(err.to_string()))
    }

    fn prepare(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Prepared, ClientError> {
        let mut url = self.join_url(path);

        if let Some(query) = &options.query {
            let cleaned = clean_params(query);
            if !is_empty_value(&cleaned) {
                url.push('?');
                url.push_str(&to_query_string(&cleaned));
            }
        }

        Ok(Prepared {
            method,
            path: path.to_string(),
            url,
            body,
            cancel: options.cancel,
            timeout: options.timeout,
        })
    }

    fn join_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    async fn run<R: DeserializeOwned>(&self, prepared: Prepared) -> Result<R, ClientError> {
        let payload = self.execute(&prepared).await?;
        serde_json::from_value(payload).map_err(|err| ClientError::Decode(err.to_string()))
    }

    /// Send one request: attach the bearer token read at send time, race
    /// against cancellation, and split the outcome.
    async fn attempt(&self, prepared: &Prepared) -> Result<Value, AttemptFailure> {
        let mut builder = self.transport.request(prepared.method.clone(), &prepared.url);

        let deadline = prepared.timeout.unwrap_or_else(|| self.transport.timeout());
        if let Some(timeout) = prepared.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(token) = self.session.access_token().await {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &prepared.body {
            builder = builder.json(body);
        }

        let send = self.transport.send_with_deadline(builder, deadline);
        let result = match &prepared.cancel {
            Some(token) if token.is_cancelled() => {
                return Err(AttemptFailure::Transport(ClientError::Cancelled));
            }
            Some(token) => tokio::select! {
                () = token.cancelled() => {
                    return Err(AttemptFailure::Transport(ClientError::Cancelled));
                }
                result = send => result,
            },
            None => send.await,
        };

        let response = result.map_err(AttemptFailure::Transport)?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| AttemptFailure::Transport(ClientError::Network(err.to_string())))?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            let envelope: BaseResponse<Value> = serde_json::from_str(&text)
                .map_err(|err| AttemptFailure::Transport(ClientError::Decode(err.to_string())))?;
            return Ok(envelope.data.unwrap_or(Value::Null));
        }

        // Malformed error bodies still reject cleanly: fall back to the
        // HTTP status, which can never match the expired-token signature
        // check for a response that lacked the message code.
        let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or(ErrorBody {
            code: i64::from(status.as_u16()),
            message: None,
            data: None,
        });
        Err(AttemptFailure::Api(body))
    }

    /// Run the full error policy on a fresh request. Replays go through
    /// [`Self::replay`] instead, which never re-enters the refresh gate.
    async fn execute(&self, prepared: &Prepared) -> Result<Value, ClientError> {
        match self.attempt(prepared).await {
            Ok(payload) => Ok(payload),
            Err(AttemptFailure::Transport(err)) => Err(err),
            Err(AttemptFailure::Api(body)) => {
                self.maybe_toast(&prepared.path, &body);

                if !body.is_token_expired() {
                    return Err(ClientError::Api(body));
                }

                match self.gate.join() {
                    GatePosition::Follower(outcome) => {
                        debug!(path = %prepared.path, "token expired while refresh in flight; queued");
                        match outcome.await {
                            Ok(true) => self.replay(prepared).await,
                            // Refresh failed (or the leader went away):
                            // reject with this request's own original error.
                            _ => Err(ClientError::Api(body)),
                        }
                    }
                    GatePosition::Leader => {
                        info!("access token expired; starting refresh exchange");
                        match self.exchange_refresh_token().await {
                            Ok(tokens) => {
                                self.session.set_tokens(tokens).await;
                                self.gate.settle(true);
                                debug!(path = %prepared.path, "refresh succeeded; replaying request");
                                self.replay(prepared).await
                            }
                            Err(err) => {
                                self.gate.settle(false);
                                warn!(error = %err, "refresh failed; tearing down session");
                                self.session.reset().await;
                                self.navigator.redirect_to_login();
                                Err(err)
                            }
                        }
                    }
                }
            }
        }
    }

    /// Re-send a request after a successful refresh. The original config
    /// is reused exactly; only the bearer header differs, read from the
    /// already-updated session at send time. A replay that fails expired
    /// again rejects outright, bounding every request to one refresh cycle.
    async fn replay(&self, prepared: &Prepared) -> Result<Value, ClientError> {
        match self.attempt(prepared).await {
            Ok(payload) => Ok(payload),
            Err(AttemptFailure::Transport(err)) => Err(err),
            Err(AttemptFailure::Api(body)) => {
                self.maybe_toast(&prepared.path, &body);
                Err(ClientError::Api(body))
            }
        }
    }

    /// The single refresh exchange. Goes through the bare transport so it
    /// can never re-enter the error pipeline above.
    async fn exchange_refresh_token(&self) -> Result<SessionTokens, ClientError> {
        let refresh_token = self
            .session
            .refresh_token()
            .await
            .ok_or_else(|| ClientError::RefreshFailed("no refresh token held".to_string()))?;

        let url = self.join_url(REFRESH_TOKEN_PATH);
        let builder = self
            .transport
            .request(Method::POST, &url)
            .json(&serde_json::json!({ "refreshToken": refresh_token }));

        let response = self
            .transport
            .send(builder)
            .await
            .map_err(|err| ClientError::RefreshFailed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::RefreshFailed(format!(
                "refresh endpoint returned status {status}"
            )));
        }

        let parsed: RefreshTokenResponse = response
            .json()
            .await
            .map_err(|err| ClientError::RefreshFailed(err.to_string()))?;

        let access_token = parsed.access_token.clone().ok_or_else(|| {
            ClientError::RefreshFailed("refresh response missing access token".to_string())
        })?;

        Ok(SessionTokens {
            access_token: Some(access_token),
            expires_at: parsed.expires_at(),
            // Some backends rotate the refresh token, some echo nothing.
            refresh_token: parsed.refresh_token.or(Some(refresh_token)),
        })
    }

    fn maybe_toast(&self, path: &str, body: &ErrorBody) {
        let code = body.message_code();
        if is_suppressed(&self.config.suppression, path, code) {
            debug!(path, code = code.unwrap_or_default(), "error toast suppressed");
            return;
        }
        self.notifier.toast_error(&message_key(code));
    }
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    credentials: Option<Arc<dyn CredentialStore>>,
}

impl ApiClientBuilder {
    /// Set the client configuration.
    #[must_use]
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Shorthand for a default configuration with this base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config = Some(ApiClientConfig::new(base_url));
        self
    }

    /// Set the toast sink.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Set the login-redirect hook.
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Set the credential persistence backing the session store.
    #[must_use]
    pub fn credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is missing or the
    /// transport cannot be built.
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let config = self
            .config
            .ok_or_else(|| ClientError::Config("base URL not set".to_string()))?;

        let transport = HttpTransport::builder().timeout(config.timeout).build()?;
        let credentials =
            self.credentials.unwrap_or_else(|| Arc::new(NoopCredentialStore));

        Ok(ApiClient {
            transport,
            config,
            session: Arc::new(SessionStore::new(credentials)),
            notifier: self.notifier.unwrap_or_else(|| Arc::new(NoopNotifier)),
            navigator: self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator)),
            gate: RefreshGate::default(),
        })
    }
}
