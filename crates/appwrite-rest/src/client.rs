//! Appwrite REST API client: account and session operations.

use crate::config::AppwriteConfig;
use crate::error::{AppwriteError, AppwriteResult};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use url::Url;

/// An Appwrite account, as returned by `GET /account`.
///
/// The account `$id` is the stable external identifier that application user
/// documents are keyed by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    /// Display name; empty for accounts created without one.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub prefs: AccountPrefs,
}

/// User preferences attached to an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountPrefs {
    /// Avatar URL supplied by the OAuth provider, if any.
    #[serde(default)]
    pub avatar: Option<String>,
}

/// An authentication session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub provider: String,
    /// Session secret, present when the server returns one for header-based
    /// authentication.
    #[serde(default)]
    pub secret: String,
}

/// Appwrite REST API client.
///
/// Holds the ambient session established by `create_email_session` (or by a
/// completed OAuth redirect observed through `get_account`), sending it as
/// the `X-Appwrite-Session` header on subsequent requests.
pub struct AppwriteClient {
    http_client: reqwest::Client,
    config: AppwriteConfig,
    session_secret: RwLock<Option<String>>,
}

impl AppwriteClient {
    /// Create a new client for the given project configuration.
    pub fn new(config: AppwriteConfig) -> AppwriteResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http_client,
            config,
            session_secret: RwLock::new(None),
        })
    }

    /// Project configuration this client was built with.
    pub fn config(&self) -> &AppwriteConfig {
        &self.config
    }

    /// Replace the ambient session secret.
    pub fn set_session_secret(&self, secret: impl Into<String>) {
        *self.session_secret.write().expect("lock poisoned") = Some(secret.into());
    }

    /// Drop the ambient session secret.
    pub fn clear_session_secret(&self) {
        *self.session_secret.write().expect("lock poisoned") = None;
    }

    pub(crate) fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, url)
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("Content-Type", "application/json");
        if let Some(secret) = self.session_secret.read().expect("lock poisoned").as_ref() {
            builder = builder.header("X-Appwrite-Session", secret);
        }
        builder
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> AppwriteResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppwriteError::from_response_body(status.as_u16(), &body));
        }
        Ok(response.json().await?)
    }

    async fn send_empty(&self, builder: reqwest::RequestBuilder) -> AppwriteResult<()> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppwriteError::from_response_body(status.as_u16(), &body));
        }
        Ok(())
    }

    /// Register a new account with email and password.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> AppwriteResult<Account> {
        let body = serde_json::json!({
            "userId": uuid::Uuid::new_v4().to_string(),
            "email": email,
            "password": password,
            "name": name,
        });

        tracing::debug!(email = %email, "Creating Appwrite account");
        self.send_json(
            self.request(Method::POST, &self.config.account_url())
                .json(&body),
        )
        .await
    }

    /// Create an email/password session and store its secret as the ambient
    /// session for subsequent requests.
    pub async fn create_email_session(
        &self,
        email: &str,
        password: &str,
    ) -> AppwriteResult<Session> {
        let url = format!("{}/sessions/email", self.config.account_url());
        let body = serde_json::json!({ "email": email, "password": password });

        tracing::debug!(email = %email, "Creating email session");
        let session: Session = self
            .send_json(self.request(Method::POST, &url).json(&body))
            .await?;

        if !session.secret.is_empty() {
            self.set_session_secret(session.secret.clone());
        }
        Ok(session)
    }

    /// Fetch the account behind the current session.
    ///
    /// This is the probe used to detect OAuth redirect completion: it fails
    /// with a 401 while no session exists, and with a scope error when a
    /// session exists but cannot read the account.
    pub async fn get_account(&self) -> AppwriteResult<Account> {
        self.send_json(self.request(Method::GET, &self.config.account_url()))
            .await
    }

    /// Delete the current session (sign out).
    pub async fn delete_current_session(&self) -> AppwriteResult<()> {
        let url = format!("{}/sessions/current", self.config.account_url());
        tracing::debug!("Deleting current session");
        self.send_empty(self.request(Method::DELETE, &url)).await?;
        self.clear_session_secret();
        Ok(())
    }

    /// Build the browser URL that starts an OAuth2 redirect flow.
    ///
    /// The caller is responsible for opening this URL in an external
    /// browser. On completion the provider redirects to `success` or
    /// `failure`, both deep links back into the app.
    pub fn oauth2_redirect_url(
        &self,
        provider: &str,
        success: &str,
        failure: &str,
    ) -> AppwriteResult<Url> {
        let base = format!(
            "{}/sessions/oauth2/{}",
            self.config.account_url(),
            provider
        );
        let mut url = Url::parse(&base)?;
        url.query_pairs_mut()
            .append_pair("project", &self.config.project_id)
            .append_pair("success", success)
            .append_pair("failure", failure);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> AppwriteConfig {
        AppwriteConfig {
            endpoint: "https://cloud.example.com/v1".to_string(),
            project_id: "proj-1".to_string(),
            platform: "com.example.app".to_string(),
            database_id: "db-1".to_string(),
            user_collection_id: "users-1".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_client_creation() {
        let client = AppwriteClient::new(test_config()).unwrap();
        assert_eq!(client.config().project_id, "proj-1");
    }

    #[test]
    fn test_oauth2_redirect_url() {
        let client = AppwriteClient::new(test_config()).unwrap();
        let url = client
            .oauth2_redirect_url(
                "google",
                "com.example.app://auth/google-success",
                "com.example.app://auth/google-failure",
            )
            .unwrap();

        let s = url.as_str();
        assert!(s.starts_with("https://cloud.example.com/v1/account/sessions/oauth2/google?"));
        assert!(s.contains("project=proj-1"));
        assert!(s.contains("success=com.example.app%3A%2F%2Fauth%2Fgoogle-success"));
        assert!(s.contains("failure=com.example.app%3A%2F%2Fauth%2Fgoogle-failure"));
    }

    #[test]
    fn test_session_secret_roundtrip() {
        let client = AppwriteClient::new(test_config()).unwrap();
        client.set_session_secret("s3cret");
        client.clear_session_secret();
        // Clearing twice is a no-op
        client.clear_session_secret();
    }

    #[test]
    fn test_account_deserialization() {
        let json = r#"{
            "$id": "acct-123",
            "email": "jane@example.com",
            "name": "Jane",
            "prefs": { "avatar": "https://example.com/a.png" }
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.id, "acct-123");
        assert_eq!(account.name, "Jane");
        assert_eq!(account.prefs.avatar.as_deref(), Some("https://example.com/a.png"));
    }

    #[test]
    fn test_account_deserialization_defaults() {
        let json = r#"{ "$id": "acct-456" }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.id, "acct-456");
        assert!(account.email.is_empty());
        assert!(account.prefs.avatar.is_none());
    }

    #[test]
    fn test_session_deserialization() {
        let json = r#"{ "$id": "sess-1", "provider": "email", "secret": "abc" }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.id, "sess-1");
        assert_eq!(session.secret, "abc");
    }
}
