//! End-to-end social login orchestration.
//!
//! Wires the browser handoff, session poller, user materializer, and
//! lifecycle guard into one driveable flow. `run` is cancel-safe: dropping
//! the returned future stops probing immediately.

use crate::backend::{AuthBackend, LoginMode, Provider};
use crate::error::LoginError;
use crate::guard::{GuardConfig, LifecycleGuard, LoginState};
use crate::materializer::{MaterializerConfig, UserMaterializer};
use crate::poller::{PollerConfig, SessionPoller, FACEBOOK_WARMUP};
use crate::AppUser;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

/// Deep link scheme registered by the mobile shells.
pub const DEFAULT_DEEP_LINK_SCHEME: &str = "com.jsm.asabcorp";

/// Full configuration for one login flow.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    pub poller: PollerConfig,
    pub materializer: MaterializerConfig,
    pub guard: GuardConfig,
    pub deep_link_scheme: Option<String>,
}

impl ResolverConfig {
    /// Provider-tuned defaults: Facebook historically needs a beat before
    /// its first probe can succeed, Google does not.
    pub fn for_provider(provider: Provider) -> Self {
        let mut config = Self::default();
        if provider == Provider::Facebook {
            config.poller.warmup = FACEBOOK_WARMUP;
        }
        config
    }
}

/// Drives one social login attempt to a terminal state.
pub struct LoginResolver<B: AuthBackend + ?Sized> {
    backend: Arc<B>,
    provider: Provider,
    mode: LoginMode,
    config: ResolverConfig,
    guard: LifecycleGuard,
}

impl<B: AuthBackend + ?Sized> LoginResolver<B> {
    pub fn new(
        backend: Arc<B>,
        provider: Provider,
        mode: LoginMode,
        config: ResolverConfig,
    ) -> (Self, watch::Receiver<LoginState>) {
        let (guard, rx) = LifecycleGuard::new(config.guard.clone());
        (
            Self {
                backend,
                provider,
                mode,
                config,
                guard,
            },
            rx,
        )
    }

    pub fn guard(&self) -> &LifecycleGuard {
        &self.guard
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn mode(&self) -> LoginMode {
        self.mode
    }

    /// Tear the flow down without a result.
    pub fn abandon(&self) {
        self.guard.abandon();
    }

    /// React to the app returning to the foreground mid-flow.
    pub async fn handle_app_resumed(&self) {
        self.guard.handle_app_resumed().await;
    }

    /// Run the flow: browser handoff, poll, materialize.
    ///
    /// The loading backstop runs alongside the poll. When it fires it only
    /// drops the loading flag; the poll keeps running and a late session
    /// can still authenticate.
    pub async fn run(&self) -> Result<AppUser, LoginError> {
        info!(provider = %self.provider, mode = self.mode.as_str(), "Starting social login");
        self.guard.begin();

        let scheme = self
            .config
            .deep_link_scheme
            .as_deref()
            .unwrap_or(DEFAULT_DEEP_LINK_SCHEME);
        let success_url = self.provider.success_deep_link(scheme);
        let failure_url = self.provider.failure_deep_link(scheme);

        if let Err(err) = self
            .backend
            .begin_oauth(self.provider, &success_url, &failure_url)
            .await
        {
            warn!(provider = %self.provider, error = %err, "OAuth handoff failed");
            self.guard.clear_loading();
            self.guard.transition(LoginState::Abandoned);
            return Err(LoginError::Begin(err.to_string()));
        }

        self.guard.transition(LoginState::Polling);

        let flow = async {
            let poller = SessionPoller::new(&*self.backend, self.config.poller.clone());
            let session = poller.run().await?;
            self.guard.transition(LoginState::Materializing);
            let materializer = UserMaterializer::new(
                &*self.backend,
                self.provider,
                self.config.materializer.clone(),
            );
            materializer.materialize(&session).await
        };
        tokio::pin!(flow);

        let backstop = sleep(self.config.guard.backstop);
        tokio::pin!(backstop);
        let mut backstop_fired = false;

        let outcome = loop {
            tokio::select! {
                result = &mut flow => break result,
                _ = &mut backstop, if !backstop_fired => {
                    backstop_fired = true;
                    if self.guard.clear_loading() {
                        warn!(provider = %self.provider, "Loading backstop fired before login resolved");
                    }
                }
            }
        };

        match outcome {
            Ok(user) => {
                info!(provider = %self.provider, user_id = %user.id, "Social login complete");
                self.guard.complete(user.clone());
                Ok(user)
            }
            Err(err @ LoginError::Timeout { .. }) => {
                self.guard.clear_loading();
                self.guard.transition(LoginState::TimedOut {
                    message: err.user_message(self.provider),
                });
                Err(err)
            }
            Err(err) => {
                warn!(provider = %self.provider, error = %err, "Social login failed");
                self.guard.clear_loading();
                self.guard.transition(LoginState::Abandoned);
                Err(err)
            }
        }
    }
}
