//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. Secrets (JWT signing key, storage
//! token) come from the environment, which Cloud Run populates from
//! Secret Manager bindings.

use std::env;

/// Default Cloud Storage endpoint for both API calls and public URLs.
pub const DEFAULT_STORAGE_URL: &str = "https://storage.googleapis.com";

/// Which collaborator implementations the server is wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Firestore + Cloud Storage.
    Gcp,
    /// In-process stores; data is lost on restart. Local development only.
    Memory,
}

/// How the Cloud Storage client authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageAuth {
    /// No credentials (storage emulator).
    None,
    /// A fixed OAuth access token.
    Static(String),
    /// Tokens fetched from the GCE/Cloud Run metadata server.
    Metadata,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Collaborator wiring
    pub backend: Backend,
    /// Bucket that receives avatar uploads
    pub avatar_bucket: String,
    /// Base URL for Cloud Storage JSON API calls
    pub storage_api_url: String,
    /// Base URL used to build public avatar links
    pub storage_public_url: String,

    // --- Secrets ---
    /// JWT signing key for access tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Cloud Storage credentials
    pub storage_auth: StorageAuth,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local runs.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend = match env::var("APP_BACKEND")
            .unwrap_or_else(|_| "gcp".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "gcp" => Backend::Gcp,
            "memory" => Backend::Memory,
            other => return Err(ConfigError::Invalid("APP_BACKEND", other.to_string())),
        };

        let emulator_host = env::var("STORAGE_EMULATOR_HOST").ok();

        let storage_api_url = env::var("STORAGE_API_URL")
            .ok()
            .or_else(|| emulator_host.clone())
            .unwrap_or_else(|| DEFAULT_STORAGE_URL.to_string());

        let storage_auth = match env::var("STORAGE_ACCESS_TOKEN") {
            Ok(token) => StorageAuth::Static(token.trim().to_string()),
            Err(_) if emulator_host.is_some() => StorageAuth::None,
            Err(_) => StorageAuth::Metadata,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            backend,
            avatar_bucket: env::var("AVATAR_BUCKET")
                .map_err(|_| ConfigError::Missing("AVATAR_BUCKET"))?,
            storage_public_url: env::var("STORAGE_PUBLIC_URL")
                .unwrap_or_else(|_| storage_api_url.clone()),
            storage_api_url,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            storage_auth,
        })
    }

    /// Config for tests: in-memory backend, fixed signing key.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            backend: Backend::Memory,
            avatar_bucket: "test-avatars".to_string(),
            storage_api_url: DEFAULT_STORAGE_URL.to_string(),
            storage_public_url: DEFAULT_STORAGE_URL.to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            storage_auth: StorageAuth::None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
