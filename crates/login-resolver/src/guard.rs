//! Login lifecycle state machine and loading-flag hygiene.
//!
//! The guard owns the observable login state (a `tokio::sync::watch`
//! channel, so UI layers can subscribe) and the loading flag. The flag is
//! deliberately separate from the state: several failure paths need to drop
//! the spinner without knowing which terminal state the flow will land in,
//! and the drop must be idempotent.

use crate::backend::AppUser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Observable state of a login flow.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginState {
    /// No flow in progress.
    Idle,
    /// Browser handoff done, waiting for the user to come back.
    AwaitingRedirect,
    /// Probing the backend for an established session.
    Polling,
    /// Session found, producing the application user.
    Materializing,
    /// Flow finished with a signed-in user.
    Authenticated(AppUser),
    /// Poll budget exhausted; message is ready for direct display.
    TimedOut { message: String },
    /// Flow torn down without completing.
    Abandoned,
}

impl LoginState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoginState::Authenticated(_) | LoginState::TimedOut { .. } | LoginState::Abandoned
        )
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginState::Authenticated(_))
    }
}

/// Timing knobs for resume handling and the loading backstop.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Settle delay after the app returns to the foreground.
    pub resume_settle: Duration,
    /// Second look after the settle delay before force-clearing.
    pub resume_recheck: Duration,
    /// Absolute bound on how long the loading flag may stay set.
    pub backstop: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            resume_settle: Duration::from_secs(1),
            resume_recheck: Duration::from_secs(3),
            backstop: Duration::from_secs(15),
        }
    }
}

/// Tracks one login flow's state and loading flag.
pub struct LifecycleGuard {
    state: watch::Sender<LoginState>,
    loading: AtomicBool,
    config: GuardConfig,
}

impl LifecycleGuard {
    pub fn new(config: GuardConfig) -> (Self, watch::Receiver<LoginState>) {
        let (state, rx) = watch::channel(LoginState::Idle);
        (
            Self {
                state,
                loading: AtomicBool::new(false),
                config,
            },
            rx,
        )
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn state(&self) -> LoginState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Move to a new state. Terminal states are sticky: once reached, no
    /// further transition is applied.
    pub fn transition(&self, next: LoginState) -> bool {
        let applied = self.state.send_if_modified(|current| {
            if current.is_terminal() {
                return false;
            }
            debug!(from = ?current, to = ?next, "Login state transition");
            *current = next.clone();
            true
        });
        if !applied {
            debug!(refused = ?next, "Transition refused from terminal state");
        }
        applied
    }

    /// Start a flow: raise the loading flag and await the redirect.
    pub fn begin(&self) {
        self.loading.store(true, Ordering::SeqCst);
        self.transition(LoginState::AwaitingRedirect);
    }

    /// Drop the loading flag. Returns true only for the call that actually
    /// cleared it, so callers can log the first clear and stay silent on
    /// repeats.
    pub fn clear_loading(&self) -> bool {
        self.loading.swap(false, Ordering::SeqCst)
    }

    /// Terminal success: clear loading and publish the user.
    pub fn complete(&self, user: AppUser) {
        self.clear_loading();
        self.transition(LoginState::Authenticated(user));
    }

    /// Terminal teardown without a result.
    pub fn abandon(&self) {
        if self.clear_loading() {
            info!("Login abandoned while loading");
        }
        self.transition(LoginState::Abandoned);
    }

    /// Handle the app returning to the foreground mid-flow.
    ///
    /// Waits a settle beat for any in-flight completion to land; if the
    /// flow authenticated in the meantime the flag drops immediately.
    /// Otherwise one more recheck window is granted before the flag is
    /// force-cleared. No state transition happens here: a slow poll can
    /// still finish and win.
    pub async fn handle_app_resumed(&self) {
        if !self.is_loading() {
            return;
        }
        sleep(self.config.resume_settle).await;
        if self.state().is_authenticated() {
            self.clear_loading();
            return;
        }
        sleep(self.config.resume_recheck).await;
        if !self.state().is_authenticated() && self.clear_loading() {
            warn!("Loading flag force-cleared after app resume");
        }
    }
}
