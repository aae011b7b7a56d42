//! The backend collaborator interface for login resolution.
//!
//! The resolver never talks to Appwrite directly; it is injected with the
//! four operations it needs through [`AuthBackend`], so the whole flow is
//! testable against an in-memory fake.

use async_trait::async_trait;
use thiserror::Error;

/// A social auth provider the app supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    /// Wire name used in API paths and provider tags.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
        }
    }

    /// Human-readable name for user-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Facebook => "Facebook",
        }
    }

    /// Fallback username when the provider profile has no display name.
    pub fn default_username(&self) -> &'static str {
        match self {
            Provider::Google => "Google User",
            Provider::Facebook => "Facebook User",
        }
    }

    /// Deep link the provider redirects to on success.
    pub fn success_deep_link(&self, scheme: &str) -> String {
        format!("{}://auth/{}-success", scheme, self.as_str())
    }

    /// Deep link the provider redirects to on failure.
    pub fn failure_deep_link(&self, scheme: &str) -> String {
        format!("{}://auth/{}-failure", scheme, self.as_str())
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the attempt is a first-time registration or a returning login.
///
/// Both modes resolve identically (lookup-before-create makes them
/// converge); the mode is carried for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    SignIn,
    SignUp,
}

impl LoginMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginMode::SignIn => "sign-in",
            LoginMode::SignUp => "sign-up",
        }
    }
}

/// An established backend session, observed after an OAuth redirect
/// completes.
///
/// Carries the external account profile behind the session: the stable
/// account id the app's user documents are keyed by, plus the profile
/// fields needed to materialize a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSession {
    /// Stable external-account identifier. Empty means "no usable session".
    pub account_id: String,
    pub email: String,
    /// Display name from the provider profile, if any.
    pub name: Option<String>,
    /// Avatar URL from the provider profile, if any.
    pub avatar_url: Option<String>,
}

/// The app-level user record.
#[derive(Debug, Clone, PartialEq)]
pub struct AppUser {
    pub id: String,
    pub account_id: String,
    pub email: String,
    pub username: String,
    pub avatar: String,
    pub provider: Option<String>,
}

/// Payload for creating a new app user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub account_id: String,
    pub email: String,
    pub username: String,
    pub avatar: String,
    pub provider: String,
}

/// Failure of a single backend operation, classified the way the resolver
/// needs: the probe loop treats `SessionAbsent` and `Other` as transient,
/// and `MissingScopes` selects the scope-specific terminal message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// No session exists yet.
    #[error("no active session")]
    SessionAbsent,

    /// A session exists but lacks the scopes to read the account.
    #[error("session missing required scopes: {0}")]
    MissingScopes(String),

    /// Anything else: network failures, server errors.
    #[error("{0}")]
    Other(String),
}

/// The four collaborator operations the resolver consumes.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Start the external browser-based OAuth flow.
    ///
    /// Fire-and-forget: success means the flow was initiated, not that the
    /// user completed it. Completion is only observable via
    /// [`get_active_session`](Self::get_active_session).
    async fn begin_oauth(
        &self,
        provider: Provider,
        success_url: &str,
        failure_url: &str,
    ) -> Result<(), BackendError>;

    /// Probe for an established session, returning the external account
    /// profile behind it.
    async fn get_active_session(&self) -> Result<ExternalSession, BackendError>;

    /// Look up the app user keyed by an external account id.
    async fn find_user_by_account_id(
        &self,
        account_id: &str,
    ) -> Result<Option<AppUser>, BackendError>;

    /// Persist a new app user.
    async fn create_user(&self, user: NewUser) -> Result<AppUser, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_deep_links() {
        assert_eq!(
            Provider::Google.success_deep_link("com.jsm.asabcorp"),
            "com.jsm.asabcorp://auth/google-success"
        );
        assert_eq!(
            Provider::Facebook.failure_deep_link("com.jsm.asabcorp"),
            "com.jsm.asabcorp://auth/facebook-failure"
        );
    }

    #[test]
    fn provider_names() {
        assert_eq!(Provider::Google.as_str(), "google");
        assert_eq!(Provider::Facebook.display_name(), "Facebook");
        assert_eq!(Provider::Google.default_username(), "Google User");
    }

    #[test]
    fn mode_names() {
        assert_eq!(LoginMode::SignIn.as_str(), "sign-in");
        assert_eq!(LoginMode::SignUp.as_str(), "sign-up");
    }
}
