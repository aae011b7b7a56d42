//! [`AuthBackend`] implementation on top of the Appwrite REST client.
//!
//! The adapter owns no HTTP logic of its own; it translates between the
//! resolver's provider-neutral types and the Appwrite account, session, and
//! users-collection endpoints, and maps Appwrite error shapes onto the
//! resolver's error taxonomy.

use crate::backend::{AppUser, AuthBackend, BackendError, ExternalSession, NewUser, Provider};
use appwrite_rest::{AppwriteClient, AppwriteError, NewUserDocument, UserDocument};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Hands the OAuth redirect URL to the platform shell (system browser,
/// in-app browser tab). Out of process, so failures come back as strings.
pub type UrlOpener = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Appwrite-backed [`AuthBackend`].
pub struct AppwriteAuthBackend {
    client: Arc<AppwriteClient>,
    opener: UrlOpener,
}

impl AppwriteAuthBackend {
    pub fn new(client: Arc<AppwriteClient>, opener: UrlOpener) -> Self {
        Self { client, opener }
    }
}

fn map_error(err: AppwriteError) -> BackendError {
    if err.is_missing_scopes() {
        BackendError::MissingScopes(err.to_string())
    } else if err.is_session_absent() {
        BackendError::SessionAbsent
    } else {
        BackendError::Other(err.to_string())
    }
}

fn user_from_document(doc: UserDocument) -> AppUser {
    AppUser {
        id: doc.id,
        account_id: doc.account_id,
        email: doc.email,
        username: doc.username,
        avatar: doc.avatar,
        provider: doc.auth_provider,
    }
}

#[async_trait]
impl AuthBackend for AppwriteAuthBackend {
    async fn begin_oauth(
        &self,
        provider: Provider,
        success_url: &str,
        failure_url: &str,
    ) -> Result<(), BackendError> {
        let url = self
            .client
            .oauth2_redirect_url(provider.as_str(), success_url, failure_url)
            .map_err(map_error)?;
        debug!(provider = %provider, url = %url, "Opening OAuth redirect URL");
        (self.opener)(url.as_str()).map_err(BackendError::Other)
    }

    async fn get_active_session(&self) -> Result<ExternalSession, BackendError> {
        let account = self.client.get_account().await.map_err(map_error)?;
        Ok(ExternalSession {
            account_id: account.id,
            email: account.email,
            name: Some(account.name).filter(|name| !name.is_empty()),
            avatar_url: account.prefs.avatar.filter(|url| !url.is_empty()),
        })
    }

    async fn find_user_by_account_id(
        &self,
        account_id: &str,
    ) -> Result<Option<AppUser>, BackendError> {
        let doc = self
            .client
            .find_user_by_account_id(account_id)
            .await
            .map_err(map_error)?;
        Ok(doc.map(user_from_document))
    }

    async fn create_user(&self, user: NewUser) -> Result<AppUser, BackendError> {
        let doc = self
            .client
            .create_user_document(NewUserDocument {
                account_id: user.account_id,
                email: user.email,
                username: user.username,
                avatar: user.avatar,
                auth_provider: Some(user.provider),
            })
            .await
            .map_err(map_error)?;
        Ok(user_from_document(doc))
    }
}
