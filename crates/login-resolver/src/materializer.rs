//! Turning an established external session into an application user row.
//!
//! Lookup-before-create keyed on the external account id: a user who signed
//! in before gets their existing row back, a first-time user gets a fresh
//! row created from the session profile.

use crate::backend::{AppUser, AuthBackend, BackendError, ExternalSession, NewUser, Provider};
use crate::error::LoginError;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Configuration for standalone session resolution ([`UserMaterializer::resolve`]).
#[derive(Debug, Clone)]
pub struct MaterializerConfig {
    /// Extra session fetches after the first fails before giving up.
    pub retries: u32,
    /// Fixed delay between session fetches.
    pub backoff: Duration,
}

impl Default for MaterializerConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Duration::from_millis(1500),
        }
    }
}

/// Materializes application users from external sessions.
pub struct UserMaterializer<'a, B: AuthBackend + ?Sized> {
    backend: &'a B,
    provider: Provider,
    config: MaterializerConfig,
}

impl<'a, B: AuthBackend + ?Sized> UserMaterializer<'a, B> {
    pub fn new(backend: &'a B, provider: Provider, config: MaterializerConfig) -> Self {
        Self {
            backend,
            provider,
            config,
        }
    }

    /// Produce the application user for an already-fetched session.
    ///
    /// At most one create call is issued per invocation. Two racing
    /// invocations for the same account can both miss the lookup and both
    /// create; the backend collection is the place to enforce uniqueness,
    /// not this method.
    pub async fn materialize(&self, session: &ExternalSession) -> Result<AppUser, LoginError> {
        match self.backend.find_user_by_account_id(&session.account_id).await {
            Ok(Some(existing)) => {
                info!(user_id = %existing.id, account_id = %existing.account_id, "Existing user found");
                return Ok(existing);
            }
            Ok(None) => {
                debug!(account_id = %session.account_id, "No user document yet, creating one");
            }
            Err(err) => {
                warn!(error = %err, "User lookup failed");
                return Err(LoginError::CreateUser(err.to_string()));
            }
        }

        let profile_name = session.name.as_deref().filter(|name| !name.is_empty());
        let username = profile_name
            .unwrap_or(self.provider.default_username())
            .to_string();
        // The placeholder avatar keys on the raw profile name, falling back
        // to plain "User" rather than the provider-specific username.
        let avatar = session
            .avatar_url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| {
                appwrite_rest::initials_avatar_url(profile_name.unwrap_or("User"))
            });

        let created = self
            .backend
            .create_user(NewUser {
                account_id: session.account_id.clone(),
                email: session.email.clone(),
                username,
                avatar,
                provider: self.provider.as_str().to_string(),
            })
            .await
            .map_err(|err| {
                warn!(error = %err, "User creation failed");
                LoginError::CreateUser(err.to_string())
            })?;

        info!(user_id = %created.id, account_id = %created.account_id, "User created");
        Ok(created)
    }

    /// Fetch the active session with bounded retries, then materialize.
    ///
    /// Used outside the poll loop, where no session is in hand (cold start
    /// with a possibly-live session). A session that never shows up within
    /// the retry budget is [`LoginError::NoAccount`].
    pub async fn resolve(&self) -> Result<AppUser, LoginError> {
        let mut attempt = 0u32;
        let session = loop {
            match self.backend.get_active_session().await {
                Ok(session) if !session.account_id.is_empty() => break session,
                Ok(_) | Err(BackendError::SessionAbsent) | Err(BackendError::MissingScopes(_)) => {
                    if attempt >= self.config.retries {
                        debug!(attempts = attempt + 1, "No session after retries");
                        return Err(LoginError::NoAccount);
                    }
                    attempt += 1;
                    debug!(attempt = attempt, "Session not ready, retrying");
                    sleep(self.config.backoff).await;
                }
                Err(err) => {
                    warn!(error = %err, "Session fetch failed");
                    return Err(LoginError::CreateUser(err.to_string()));
                }
            }
        };
        self.materialize(&session).await
    }
}
