//! Session polling after an OAuth redirect.
//!
//! Once the browser flow has been started, the only way the app learns that
//! login completed is by probing the backend for an established session.
//! The poller runs a chained wait → probe → wait loop (rather than a raw
//! fixed-interval timer) so slow probes cannot pile up on each other.

use crate::backend::{AuthBackend, BackendError, ExternalSession};
use crate::error::LoginError;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Warm-up the Facebook call sites historically used before the first
/// probe. Kept as an explicit opt-in rather than a baked-in default; see
/// [`PollerConfig::warmup`].
pub const FACEBOOK_WARMUP: Duration = Duration::from_secs(3);

/// Configuration for the session poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay before the first probe. Defaults to zero; call sites that want
    /// the legacy Facebook behavior pass [`FACEBOOK_WARMUP`] explicitly.
    pub warmup: Duration,
    /// Delay between consecutive probes.
    pub interval: Duration,
    /// Number of probes before giving up.
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            warmup: Duration::ZERO,
            interval: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

/// Polls the backend for an established session within a bounded window.
pub struct SessionPoller<'a, B: AuthBackend + ?Sized> {
    backend: &'a B,
    config: PollerConfig,
}

impl<'a, B: AuthBackend + ?Sized> SessionPoller<'a, B> {
    pub fn new(backend: &'a B, config: PollerConfig) -> Self {
        Self { backend, config }
    }

    /// Run the poll loop to its terminal outcome.
    ///
    /// Terminates on the first of:
    /// - a probe returning a session with a non-empty account id, or
    /// - `max_attempts` probes exhausted, yielding [`LoginError::Timeout`]
    ///   carrying the last observed probe failure.
    ///
    /// Exactly `max_attempts` probes are issued in the timeout case, never
    /// more. Cancellation is cooperative: dropping the future stops the
    /// loop with no further probes.
    pub async fn run(&self) -> Result<ExternalSession, LoginError> {
        if !self.config.warmup.is_zero() {
            sleep(self.config.warmup).await;
        }

        let mut last_error: Option<BackendError> = None;

        for attempt in 1..=self.config.max_attempts {
            match self.backend.get_active_session().await {
                Ok(session) if !session.account_id.is_empty() => {
                    info!(attempt = attempt, account_id = %session.account_id, "Session found via polling");
                    return Ok(session);
                }
                Ok(_) => {
                    debug!(attempt = attempt, "Probe returned session without an id");
                    last_error = Some(BackendError::SessionAbsent);
                }
                Err(err) => {
                    // Transient until proven terminal; keep only the most
                    // recent classification for the timeout message.
                    if attempt % 5 == 0 {
                        info!(
                            attempt = attempt,
                            max_attempts = self.config.max_attempts,
                            error = %err,
                            "Session not ready yet"
                        );
                    } else {
                        debug!(attempt = attempt, error = %err, "Session probe failed");
                    }
                    last_error = Some(err);
                }
            }

            if attempt < self.config.max_attempts {
                sleep(self.config.interval).await;
            }
        }

        warn!(
            attempts = self.config.max_attempts,
            last_error = ?last_error,
            "Polling timeout - no session found"
        );
        Err(LoginError::Timeout {
            attempts: self.config.max_attempts,
            last: last_error,
        })
    }
}
