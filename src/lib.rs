// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Profile API: create user profiles with an uploaded avatar.
//!
//! This crate provides the HTTP endpoint that validates a profile form,
//! authorizes the caller, stores the avatar in Cloud Storage and the profile
//! record in Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod validation;

use config::Config;
use db::ProfileRepository;
use middleware::Authenticator;
use services::ProfileCreator;
use std::sync::Arc;
use storage::BlobStorage;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub profile_creator: ProfileCreator,
}

impl AppState {
    /// Wire the collaborators into the request pipeline.
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        repository: Arc<dyn ProfileRepository>,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            config,
            profile_creator: ProfileCreator::new(authenticator, repository, storage),
        }
    }
}
