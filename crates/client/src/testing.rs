//! In-memory collaborator implementations for tests
//!
//! Deterministic stand-ins for the host-owned seams: a credential store
//! backed by a mutex, and recording notifier/navigator implementations
//! that count their invocations so tests can assert on them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::session::SessionTokens;
use crate::traits::{CredentialStore, Navigator, Notifier};

/// Credential store holding tokens in memory.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tokens: Mutex<Option<SessionTokens>>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Option<SessionTokens> {
        self.tokens.lock().ok().and_then(|guard| guard.clone())
    }

    async fn save(&self, tokens: &SessionTokens) {
        if let Ok(mut guard) = self.tokens.lock() {
            *guard = Some(tokens.clone());
        }
    }

    async fn clear(&self) {
        if let Ok(mut guard) = self.tokens.lock() {
            *guard = None;
        }
    }
}

/// Notifier that records every toast key it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// All recorded toast keys, in arrival order.
    #[must_use]
    pub fn toasts(&self) -> Vec<String> {
        self.toasts.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Number of toasts shown so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.toasts.lock().map(|guard| guard.len()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn toast_error(&self, message_key: &str) {
        if let Ok(mut guard) = self.toasts.lock() {
            guard.push(message_key.to_string());
        }
    }
}

/// Navigator that counts login redirects.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    /// Number of login redirects requested so far.
    #[must_use]
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the test doubles themselves.
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryCredentialStore::default();
        assert!(store.load().await.is_none());

        let tokens = SessionTokens {
            access_token: Some("at".to_string()),
            refresh_token: Some("rt".to_string()),
            expires_at: None,
        };
        store.save(&tokens).await;
        assert_eq!(store.load().await, Some(tokens));

        store.clear().await;
        assert!(store.load().await.is_none());
    }

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::default();
        notifier.toast_error("errors.common.general");
        notifier.toast_error("errors.code.EMAIL_EXISTED");

        assert_eq!(notifier.count(), 2);
        assert_eq!(
            notifier.toasts(),
            vec!["errors.common.general", "errors.code.EMAIL_EXISTED"]
        );
    }

    #[test]
    fn recording_navigator_counts() {
        let navigator = RecordingNavigator::default();
        assert_eq!(navigator.redirects(), 0);
        navigator.redirect_to_login();
        assert_eq!(navigator.redirects(), 1);
    }
}
