//! Collaborator traits owned by the host application
//!
//! The client delegates everything that is not its business to injected
//! collaborators: showing error toasts, navigating to the login entry
//! point, and persisting session credentials across restarts. Traits keep
//! those seams swappable and testable with mocks.

use async_trait::async_trait;

use crate::session::SessionTokens;

/// Fire-and-forget user notification sink.
///
/// Receives the resolved translation key (e.g. `errors.code.EMAIL_EXISTED`
/// or the generic fallback); rendering the localized string is the host's
/// problem. Failures here are invisible to callers, the toast is
/// best-effort UI feedback and not part of the error contract.
pub trait Notifier: Send + Sync {
    fn toast_error(&self, message_key: &str);
}

/// Navigation hook invoked on unrecoverable refresh failure.
pub trait Navigator: Send + Sync {
    /// Redirect the user to the login entry point.
    fn redirect_to_login(&self);
}

/// Persistence for session credentials.
///
/// The session store keeps tokens in memory and mirrors every mutation to
/// this trait so credentials survive restarts. The backing medium (cookie
/// jar, keychain, disk) is the host's choice.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load previously persisted tokens, if any.
    async fn load(&self) -> Option<SessionTokens>;

    /// Persist the current tokens.
    async fn save(&self, tokens: &SessionTokens);

    /// Remove any persisted tokens.
    async fn clear(&self);
}

/// Notifier that drops every toast. Default when the host injects nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn toast_error(&self, _message_key: &str) {}
}

/// Navigator that ignores redirects. Default when the host injects nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {}
}

/// Credential store that persists nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCredentialStore;

#[async_trait]
impl CredentialStore for NoopCredentialStore {
    async fn load(&self) -> Option<SessionTokens> {
        None
    }

    async fn save(&self, _tokens: &SessionTokens) {}

    async fn clear(&self) {}
}
