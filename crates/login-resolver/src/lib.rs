//! Social login completion for redirect-based OAuth flows.
//!
//! Mobile OAuth hands the user off to a browser and gets nothing back but a
//! deep link; whether the backend actually established a session has to be
//! discovered by polling. This crate drives that discovery to a terminal
//! outcome:
//!
//! - [`SessionPoller`] probes for an established session on a fixed cadence
//!   with a bounded attempt budget.
//! - [`UserMaterializer`] turns a found session into an application user,
//!   looking up an existing row before creating one.
//! - [`LifecycleGuard`] tracks the observable [`LoginState`] and keeps the
//!   loading flag honest across app backgrounding and slow flows.
//! - [`LoginResolver`] wires the three together behind an [`AuthBackend`],
//!   with [`AppwriteAuthBackend`] as the production implementation.

pub mod appwrite;
pub mod backend;
pub mod error;
pub mod guard;
pub mod materializer;
pub mod poller;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use appwrite::{AppwriteAuthBackend, UrlOpener};
pub use backend::{
    AppUser, AuthBackend, BackendError, ExternalSession, LoginMode, NewUser, Provider,
};
pub use error::LoginError;
pub use guard::{GuardConfig, LifecycleGuard, LoginState};
pub use materializer::{MaterializerConfig, UserMaterializer};
pub use poller::{PollerConfig, SessionPoller, FACEBOOK_WARMUP};
pub use resolver::{LoginResolver, ResolverConfig, DEFAULT_DEEP_LINK_SCHEME};
