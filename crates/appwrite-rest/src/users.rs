//! Users-collection document operations and account registration flows.

use crate::avatars::initials_avatar_url;
use crate::client::AppwriteClient;
use crate::error::{AppwriteError, AppwriteResult};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// An application user document from the users collection.
///
/// Distinct from the Appwrite [`Account`](crate::Account): the document is
/// owned by the app's database and keyed by the account id, at most one
/// document per account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    /// Tag of the auth provider that first created this user
    /// (`google`, `facebook`), absent for email/password registrations.
    #[serde(rename = "authProvider", default)]
    pub auth_provider: Option<String>,
}

/// Payload for creating a new user document.
#[derive(Debug, Clone, Serialize)]
pub struct NewUserDocument {
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub email: String,
    pub username: String,
    pub avatar: String,
    #[serde(rename = "authProvider", skip_serializing_if = "Option::is_none")]
    pub auth_provider: Option<String>,
}

/// Paged document list envelope returned by the databases API.
#[derive(Debug, Deserialize)]
struct DocumentList<T> {
    #[serde(default)]
    #[allow(dead_code)]
    total: u64,
    documents: Vec<T>,
}

/// Replace readonly-mode server errors with a message a user can act on.
fn friendly_write_error(err: AppwriteError) -> AppwriteError {
    if err.is_readonly_mode() {
        if let AppwriteError::Api {
            code, error_type, ..
        } = &err
        {
            return AppwriteError::Api {
                code: *code,
                error_type: error_type.clone(),
                message: "Server is in readonly mode. Please contact support or check your \
                          Appwrite project settings."
                    .to_string(),
            };
        }
    }
    err
}

impl AppwriteClient {
    /// Look up the application user keyed by an account id.
    ///
    /// Returns `Ok(None)` when no user document exists for that account.
    pub async fn find_user_by_account_id(
        &self,
        account_id: &str,
    ) -> AppwriteResult<Option<UserDocument>> {
        let query = serde_json::json!({
            "method": "equal",
            "attribute": "accountId",
            "values": [account_id],
        })
        .to_string();

        let url = self.config().documents_url(&self.config().user_collection_id);
        tracing::debug!(account_id = %account_id, "Looking up user document");

        let list: DocumentList<UserDocument> = self
            .send_json(
                self.request(Method::GET, &url)
                    .query(&[("queries[]", query.as_str())]),
            )
            .await?;
        Ok(list.documents.into_iter().next())
    }

    /// Create a new application user document.
    pub async fn create_user_document(
        &self,
        user: NewUserDocument,
    ) -> AppwriteResult<UserDocument> {
        let url = self.config().documents_url(&self.config().user_collection_id);
        tracing::debug!(account_id = %user.account_id, "Creating user document");
        let body = serde_json::json!({
            "documentId": uuid::Uuid::new_v4().to_string(),
            "data": user,
        });
        self.send_json(self.request(Method::POST, &url).json(&body))
            .await
            .map_err(friendly_write_error)
    }

    /// Fetch the application user behind the current session.
    ///
    /// Returns `Ok(None)` when there is no session or no matching user
    /// document; errors are folded into `None` so callers can treat "not
    /// signed in" uniformly.
    pub async fn current_user(&self) -> AppwriteResult<Option<UserDocument>> {
        let account = match self.get_account().await {
            Ok(account) => account,
            Err(err) => {
                tracing::debug!(error = %err, "No current account");
                return Ok(None);
            }
        };
        self.find_user_by_account_id(&account.id).await
    }

    /// Register a new user with email and password, creating both the
    /// account and its user document.
    ///
    /// Any pre-existing session is deleted first (a leftover session makes
    /// account creation fail), then a fresh session is established before
    /// the document write.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> AppwriteResult<UserDocument> {
        let account = self
            .create_account(email, password, username)
            .await
            .map_err(friendly_write_error)?;

        if let Err(err) = self.delete_current_session().await {
            tracing::debug!(error = %err, "No active session to delete");
        }

        self.create_email_session(email, password)
            .await
            .map_err(friendly_write_error)?;

        self.create_user_document(NewUserDocument {
            account_id: account.id,
            email: email.to_string(),
            username: username.to_string(),
            avatar: initials_avatar_url(username),
            auth_provider: None,
        })
        .await
    }
}
