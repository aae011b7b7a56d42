//! Drive a real social login against an Appwrite project from the terminal.
//!
//! Reads the project from the `APPWRITE_*` environment variables, prints
//! the OAuth redirect URL for you to open in a browser, and then polls for
//! the resulting session.
//!
//! ```sh
//! cargo run --example login -- google
//! ```

use appwrite_rest::{AppwriteClient, AppwriteConfig};
use login_resolver::{
    AppwriteAuthBackend, LoginMode, LoginResolver, Provider, ResolverConfig,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,login_resolver=debug")),
        )
        .init();

    let provider = match std::env::args().nth(1).as_deref() {
        Some("facebook") => Provider::Facebook,
        _ => Provider::Google,
    };

    let client = Arc::new(AppwriteClient::new(AppwriteConfig::from_env())?);
    let backend = AppwriteAuthBackend::new(
        client,
        Box::new(|url| {
            println!("Open this URL in your browser to sign in:\n\n  {url}\n");
            Ok(())
        }),
    );

    let (resolver, mut state) = LoginResolver::new(
        Arc::new(backend),
        provider,
        LoginMode::SignIn,
        ResolverConfig::for_provider(provider),
    );

    tokio::spawn(async move {
        while state.changed().await.is_ok() {
            println!("state: {:?}", *state.borrow());
        }
    });

    match resolver.run().await {
        Ok(user) => println!("Signed in as {} <{}>", user.username, user.email),
        Err(err) => println!("Login failed: {}", err.user_message(provider)),
    }
    Ok(())
}
