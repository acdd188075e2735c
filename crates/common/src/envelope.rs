//! Response envelope types for the merchant API
//!
//! Every merchant API response wraps its payload in a
//! `{ data, code, message }` envelope. Error responses reuse the same shape
//! with the business error code in `message` and optional throttling
//! metadata in `data`.

use serde::{Deserialize, Serialize};

/// Generic response envelope returned by every merchant API endpoint.
///
/// Callers of the client never see this type directly: the client unwraps
/// the envelope and hands back only the `data` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    /// The actual payload. Absent on errors and on empty-bodied successes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Numeric status code mirrored from the HTTP layer (e.g. 200, 401).
    #[serde(default)]
    pub code: i64,

    /// Business message code (e.g. `TOKEN_EXPIRED`, `EMAIL_EXISTED`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Throttling metadata attached to some error responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    /// Seconds after which the request may be retried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,

    /// Seconds the account or address stays blocked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_duration: Option<u64>,
}

/// Normalized error body parsed from a failed response.
///
/// All fields except `code` are optional: malformed or truncated error
/// bodies must still parse so the caller can decide what to do with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Numeric status code from the envelope. Defaults to 0 when absent.
    #[serde(default)]
    pub code: i64,

    /// Business error code string, if the backend supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Optional throttling metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

/// Message code signalling that the access token must be renewed.
pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";

impl ErrorBody {
    /// Whether this error is the expired-access-token signature
    /// (numeric 401 plus the `TOKEN_EXPIRED` message code).
    ///
    /// Missing fields never match, so malformed bodies fall through to the
    /// plain rejection path.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        self.code == 401 && self.message.as_deref() == Some(TOKEN_EXPIRED)
    }

    /// Business error code string, if present.
    #[must_use]
    pub fn message_code(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Pagination metadata returned by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub has_next: bool,
    pub has_prev: bool,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

/// Paginated payload wrapper used by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: T,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    //! Unit tests for the response envelope types.
    use super::*;

    #[test]
    fn error_body_parses_full_shape() {
        let json = r#"{"code":429,"message":"TOO_MANY_REQUESTS","data":{"retryAfter":30,"blockDuration":600}}"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap();

        assert_eq!(body.code, 429);
        assert_eq!(body.message_code(), Some("TOO_MANY_REQUESTS"));
        let data = body.data.unwrap();
        assert_eq!(data.retry_after, Some(30));
        assert_eq!(data.block_duration, Some(600));
    }

    #[test]
    fn error_body_tolerates_missing_fields() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();

        assert_eq!(body.code, 0);
        assert!(body.message.is_none());
        assert!(body.data.is_none());
        assert!(!body.is_token_expired());
    }

    #[test]
    fn token_expired_requires_both_code_and_message() {
        let expired: ErrorBody =
            serde_json::from_str(r#"{"code":401,"message":"TOKEN_EXPIRED"}"#).unwrap();
        assert!(expired.is_token_expired());

        let wrong_code: ErrorBody =
            serde_json::from_str(r#"{"code":403,"message":"TOKEN_EXPIRED"}"#).unwrap();
        assert!(!wrong_code.is_token_expired());

        let wrong_message: ErrorBody =
            serde_json::from_str(r#"{"code":401,"message":"UNAUTHORIZED"}"#).unwrap();
        assert!(!wrong_message.is_token_expired());
    }

    #[test]
    fn envelope_unwraps_payload() {
        let json = r#"{"data":{"id":"tx-1"},"code":200,"message":"OK"}"#;
        let envelope: BaseResponse<serde_json::Value> = serde_json::from_str(json).unwrap();

        assert_eq!(envelope.code, 200);
        assert_eq!(envelope.data.unwrap()["id"], "tx-1");
    }

    #[test]
    fn pagination_round_trips_camel_case() {
        let json = r#"{"hasNext":true,"hasPrev":false,"page":2,"pageSize":50,"totalPages":4,"totalCount":180}"#;
        let pagination: Pagination = serde_json::from_str(json).unwrap();

        assert!(pagination.has_next);
        assert_eq!(pagination.page_size, 50);
        assert_eq!(pagination.total_count, 180);
    }
}
