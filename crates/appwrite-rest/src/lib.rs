//! Appwrite REST API client for the ASAB app's authentication slice.
//!
//! This crate provides a thin typed client for:
//! - Account registration and email/password sessions
//! - OAuth2 redirect URL construction for browser-based login
//! - The current-account probe used to detect OAuth completion
//! - Users-collection document lookup and creation
//! - Placeholder avatar URL generation

mod avatars;
mod client;
mod config;
mod error;
mod users;

pub use avatars::initials_avatar_url;
pub use client::{Account, AccountPrefs, AppwriteClient, Session};
pub use config::AppwriteConfig;
pub use error::{AppwriteError, AppwriteResult};
pub use users::{NewUserDocument, UserDocument};
