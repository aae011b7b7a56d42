//! Error types for login resolution.

use crate::backend::{BackendError, Provider};
use thiserror::Error;

/// Terminal failure of a login attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoginError {
    /// The external OAuth flow could not be initiated.
    #[error("failed to start login: {0}")]
    Begin(String),

    /// No session appeared within the polling window.
    #[error("no session established after {attempts} attempts")]
    Timeout {
        attempts: u32,
        /// Last probe failure observed, used to select the terminal message.
        last: Option<BackendError>,
    },

    /// A session exists but no external account profile could be read
    /// after retries.
    #[error("no account found - OAuth session may not be ready yet")]
    NoAccount,

    /// Lookup or persistence of the app user failed.
    #[error("failed to create user: {0}")]
    CreateUser(String),

    /// The attempt was torn down before completing.
    #[error("login attempt abandoned")]
    Abandoned,
}

impl LoginError {
    /// The user-facing message for this failure.
    ///
    /// Timeouts whose last probe failure was a scope error get
    /// provider-specific remediation text; other timeouts get guidance to
    /// finish the login in the browser.
    pub fn user_message(&self, provider: Provider) -> String {
        match self {
            LoginError::Timeout { last, .. } => match last {
                Some(BackendError::MissingScopes(_)) => format!(
                    "{name} OAuth session not established properly. Check that \
                     {name} OAuth is configured for this project and that the \
                     redirect URI is registered in the {name} developer console, \
                     then try again.",
                    name = provider.display_name()
                ),
                _ => format!(
                    "{name} login was not completed. Finish the login in your \
                     browser, return to the app, and try again.",
                    name = provider.display_name()
                ),
            },
            LoginError::NoAccount => "Something went wrong. Please try again.".to_string(),
            LoginError::CreateUser(message) => message.clone(),
            LoginError::Begin(message) => message.clone(),
            LoginError::Abandoned => format!(
                "{} login did not complete. Please try again.",
                provider.display_name()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_with_scope_error_selects_scope_message() {
        let err = LoginError::Timeout {
            attempts: 30,
            last: Some(BackendError::MissingScopes("missing scope (account)".into())),
        };
        let msg = err.user_message(Provider::Facebook);
        assert!(msg.contains("Facebook OAuth"));
        assert!(msg.contains("redirect URI"));
    }

    #[test]
    fn timeout_without_scope_error_selects_generic_message() {
        let err = LoginError::Timeout {
            attempts: 30,
            last: Some(BackendError::SessionAbsent),
        };
        let msg = err.user_message(Provider::Google);
        assert!(msg.contains("Google login was not completed"));
        assert!(msg.contains("browser"));
    }

    #[test]
    fn create_user_message_is_verbatim() {
        let err = LoginError::CreateUser("Document is too large".into());
        assert_eq!(err.user_message(Provider::Google), "Document is too large");
    }
}
