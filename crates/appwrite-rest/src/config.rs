//! Configuration for the Appwrite REST client.

use std::time::Duration;

/// Appwrite project configuration.
///
/// Identifies the hosted project, the database holding the users collection,
/// and the platform scheme used to build OAuth deep links back into the app.
#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    /// Appwrite API endpoint, e.g. `https://nyc.cloud.appwrite.io/v1`
    pub endpoint: String,

    /// Project ID
    pub project_id: String,

    /// Platform identifier, doubles as the deep-link scheme (`<platform>://...`)
    pub platform: String,

    /// Database ID
    pub database_id: String,

    /// Collection ID for application user documents
    pub user_collection_id: String,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl AppwriteConfig {
    /// Create a configuration from environment variables, falling back to
    /// the project defaults for anything unset.
    ///
    /// Recognized variables: `APPWRITE_ENDPOINT`, `APPWRITE_PROJECT_ID`,
    /// `APPWRITE_PLATFORM`, `APPWRITE_DATABASE_ID`,
    /// `APPWRITE_USER_COLLECTION_ID`, `APPWRITE_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("APPWRITE_ENDPOINT")
            .unwrap_or_else(|_| "https://nyc.cloud.appwrite.io/v1".to_string());
        let project_id = std::env::var("APPWRITE_PROJECT_ID")
            .unwrap_or_else(|_| "6854922e0036a1e8dee6".to_string());
        let platform = std::env::var("APPWRITE_PLATFORM")
            .unwrap_or_else(|_| "com.jsm.asabcorp".to_string());
        let database_id = std::env::var("APPWRITE_DATABASE_ID")
            .unwrap_or_else(|_| "685494a1002f8417c2b2".to_string());
        let user_collection_id = std::env::var("APPWRITE_USER_COLLECTION_ID")
            .unwrap_or_else(|_| "685494cd001135a4d108".to_string());

        let timeout_secs: u64 = std::env::var("APPWRITE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Self {
            endpoint,
            project_id,
            platform,
            database_id,
            user_collection_id,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Base URL for the account API.
    pub fn account_url(&self) -> String {
        format!("{}/account", self.endpoint)
    }

    /// URL for a collection's documents endpoint.
    pub fn documents_url(&self, collection_id: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint, self.database_id, collection_id
        )
    }
}
