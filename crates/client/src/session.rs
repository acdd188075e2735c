//! Session credential store
//!
//! Holds the access/refresh token pair for one client instance. Created
//! empty at startup, populated on login or refresh, cleared on sign-out or
//! unrecoverable refresh failure. Every mutation is mirrored to the
//! injected [`CredentialStore`] so the session can survive restarts.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::traits::CredentialStore;

/// The access/refresh credential pair with its expiry, if known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,

    /// Absolute access-token expiry (UTC), when the backend reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionTokens {
    /// Whether both credentials are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }
}

/// Wire shape of the refresh-token exchange response.
///
/// All fields are optional on the wire; a response without an access token
/// is treated as a failed refresh by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,

    /// Access-token expiry as epoch milliseconds.
    pub token_expires: Option<i64>,
}

impl RefreshTokenResponse {
    /// Expiry as a UTC timestamp, when present and in range.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.token_expires
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
    }
}

/// Thread-safe session state owned by one client instance.
///
/// No ambient singletons: the store is a plain field of the client, shared
/// through `Arc` where the host needs direct access (login screens,
/// sign-out buttons).
pub struct SessionStore {
    tokens: RwLock<SessionTokens>,
    persistence: Arc<dyn CredentialStore>,
}

impl SessionStore {
    /// Create an empty session backed by the given persistence.
    #[must_use]
    pub fn new(persistence: Arc<dyn CredentialStore>) -> Self {
        Self { tokens: RwLock::new(SessionTokens::default()), persistence }
    }

    /// Load persisted credentials into memory.
    ///
    /// Call once on startup. Returns `true` if tokens were restored.
    pub async fn initialize(&self) -> bool {
        match self.persistence.load().await {
            Some(tokens) => {
                let restored = tokens.is_complete();
                *self.tokens.write().await = tokens;
                if restored {
                    info!("session restored from credential store");
                }
                restored
            }
            None => {
                debug!("no persisted session found");
                false
            }
        }
    }

    /// Current access token, if held.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access_token.clone()
    }

    /// Current refresh token, if held.
    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.refresh_token.clone()
    }

    /// Snapshot of the full credential pair.
    pub async fn tokens(&self) -> SessionTokens {
        self.tokens.read().await.clone()
    }

    /// Whether an access token is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.access_token.is_some()
    }

    /// Store a new credential pair and persist it.
    pub async fn set_tokens(&self, tokens: SessionTokens) {
        self.persistence.save(&tokens).await;
        *self.tokens.write().await = tokens;
        debug!("session tokens updated");
    }

    /// Clear all credentials from memory and persistence (sign-out).
    pub async fn reset(&self) {
        self.persistence.clear().await;
        *self.tokens.write().await = SessionTokens::default();
        info!("session cleared");
    }
}
