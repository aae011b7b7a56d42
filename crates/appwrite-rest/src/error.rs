//! Error types for the Appwrite REST client.

use serde::Deserialize;
use thiserror::Error;

/// Appwrite client error type.
#[derive(Error, Debug)]
pub enum AppwriteError {
    /// HTTP transport error (connection, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error envelope returned by the Appwrite API
    #[error("Appwrite error {code} ({error_type}): {message}")]
    Api {
        code: u16,
        error_type: String,
        message: String,
    },

    /// URL construction error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

/// Result type for Appwrite operations.
pub type AppwriteResult<T> = Result<T, AppwriteError>;

/// Error envelope shape returned by the Appwrite API.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: u16,
    #[serde(rename = "type", default)]
    error_type: String,
}

impl AppwriteError {
    /// Build an [`AppwriteError::Api`] from a raw response body.
    ///
    /// Falls back to [`AppwriteError::Unexpected`] when the body is not the
    /// standard Appwrite error envelope.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => AppwriteError::Api {
                code: if envelope.code != 0 { envelope.code } else { status },
                error_type: envelope.error_type,
                message: envelope.message,
            },
            Err(_) => AppwriteError::Unexpected(format!("status {}: {}", status, body)),
        }
    }

    /// True when the session exists but lacks the scopes required to read
    /// the account. Appwrite reports this as `general_unauthorized_scope`
    /// with a "missing scope" message.
    pub fn is_missing_scopes(&self) -> bool {
        match self {
            AppwriteError::Api {
                error_type,
                message,
                ..
            } => error_type == "general_unauthorized_scope" || message.contains("missing scope"),
            _ => false,
        }
    }

    /// True when no session exists at all (plain 401 without a scope error).
    pub fn is_session_absent(&self) -> bool {
        match self {
            AppwriteError::Api { code, .. } => *code == 401 && !self.is_missing_scopes(),
            _ => false,
        }
    }

    /// True when the server rejected a write because the project is in
    /// readonly mode.
    pub fn is_readonly_mode(&self) -> bool {
        match self {
            AppwriteError::Api { message, .. } => message.contains("readonly"),
            _ => false,
        }
    }
}
