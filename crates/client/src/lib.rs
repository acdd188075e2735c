//! Authenticated HTTP client for the Mintgate merchant API.
//!
//! The client wraps a reqwest transport and layers the behaviour the
//! merchant dashboard depends on:
//!
//! - bearer-token attachment from an owned session store
//! - response-envelope unwrapping (callers only ever see the payload)
//! - business-error parsing with a per-endpoint toast-suppression table
//! - transparent single-flight token refresh: concurrent requests that hit
//!   the expired-token condition share one refresh exchange and are
//!   replayed with the new credentials
//! - session teardown and a login redirect when the refresh itself fails
//!
//! Collaborators that belong to the host application (toast display, login
//! navigation, credential persistence) are injected as traits so the client
//! stays testable in isolation.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod api;
pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod suppress;
pub mod testing;
pub mod traits;

pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig, RequestOptions};
pub use error::{ClientError, ErrorCategory};
pub use http::{HttpTransport, HttpTransportBuilder};
pub use mintgate_common::envelope::{ErrorBody, ErrorData, Paginated, Pagination};
pub use session::{RefreshTokenResponse, SessionStore, SessionTokens};
pub use suppress::{message_key, CodeMatch, PathMatch, SuppressionRule};
pub use traits::{CredentialStore, Navigator, Notifier};
