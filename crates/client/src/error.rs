//! Client error types
//!
//! Error classification for merchant API operations. Business errors carry
//! the parsed response body; transport-level failures never carry one,
//! which is what keeps them out of the refresh and suppression flows.

use std::time::Duration;

use mintgate_common::envelope::ErrorBody;
use thiserror::Error;

/// Categories of client errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Business errors parsed from a response envelope (4xx with a code).
    Business,
    /// Session errors: the refresh exchange itself failed.
    Session,
    /// Network-level failures with no response body.
    Network,
    /// Local misuse: bad base URL, unserializable body, etc.
    Config,
}

/// Merchant API client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a business error envelope.
    #[error("api error {}: {}", .0.code, .0.message.as_deref().unwrap_or("unknown"))]
    Api(ErrorBody),

    /// The token refresh exchange failed; the session has been torn down.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Network failure with no response (connect error, broken pipe, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request was cancelled through its cancellation token.
    #[error("request cancelled")]
    Cancelled,

    /// Local configuration or request-building error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The response body could not be decoded into the expected type.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Get the error category for this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api(_) => ErrorCategory::Business,
            Self::RefreshFailed(_) => ErrorCategory::Session,
            Self::Network(_) | Self::Timeout(_) | Self::Cancelled => ErrorCategory::Network,
            Self::Config(_) | Self::Decode(_) => ErrorCategory::Config,
        }
    }

    /// The parsed error body, when this is a business error.
    #[must_use]
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Api(body) => Some(body),
            _ => None,
        }
    }

    /// Map a reqwest failure onto the client taxonomy.
    ///
    /// Timeouts keep the configured deadline so callers can log it;
    /// everything else without a response is a plain network failure.
    pub(crate) fn from_reqwest(err: &reqwest::Error, deadline: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(deadline)
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
