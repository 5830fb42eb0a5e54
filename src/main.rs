// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile API Server
//!
//! Creates user profiles: validates the submitted form and avatar, stores the
//! avatar in Cloud Storage and the profile in Firestore.

use profile_api::{
    config::{Backend, Config},
    db::{FirestoreDb, MemoryRepository, ProfileRepository},
    middleware::JwtAuthenticator,
    storage::{BlobStorage, GcsStorage, MemoryStorage},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, backend = ?config.backend, "Starting Profile API");

    let authenticator = Arc::new(JwtAuthenticator::new(&config.jwt_signing_key));

    let repository: Arc<dyn ProfileRepository>;
    let storage: Arc<dyn BlobStorage>;
    match config.backend {
        Backend::Gcp => {
            repository = Arc::new(FirestoreDb::new(&config.gcp_project_id).await?);
            storage = Arc::new(GcsStorage::new(&config)?);
        }
        Backend::Memory => {
            tracing::warn!("Using in-memory stores; data will not persist");
            repository = Arc::new(MemoryRepository::new());
            storage = Arc::new(MemoryStorage::new(format!(
                "http://localhost:{}/avatars",
                config.port
            )));
        }
    }

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        repository,
        storage,
    ));

    // Build router
    let app = profile_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,profile_api=debug")),
        )
        .with(format)
        .init();
}
