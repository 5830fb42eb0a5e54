// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts with their authorization group)
//! - Profiles (one per user, document ID is the user ID)
//! - Counters (sequence for generated profile ids)

use crate::db::{collections, ProfileRepository, PROFILE_EXISTS};
use crate::error::AppError;
use crate::models::{NewProfile, UserProfile, UserRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Counter document holding the last issued profile id.
const PROFILE_SEQUENCE: &str = "profiles";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Sequence {
    last_id: u64,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Create or update a user. Accounts are owned elsewhere; this is used
    /// for seeding and tests.
    pub async fn upsert_user(&self, user: &UserRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user.id.to_string())
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for FirestoreDb {
    async fn get_user(&self, user_id: u64) -> Result<Option<UserRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_profile_by_user_id(&self, user_id: u64) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a profile and bump the id sequence in one transaction.
    ///
    /// The profile document is re-read inside the transaction, so two
    /// concurrent inserts for the same user cannot both commit; Firestore
    /// retries the loser, which then sees the winner's document.
    async fn insert_profile(&self, profile: NewProfile) -> Result<UserProfile, AppError> {
        let user_id = profile.user_id;

        let inserted = self
            .get_client()?
            .run_transaction(|db, transaction| {
                let profile = profile.clone();
                Box::pin(async move {
                    let existing: Option<UserProfile> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::PROFILES)
                        .obj()
                        .one(&profile.user_id.to_string())
                        .await?;

                    if existing.is_some() {
                        return Ok(None);
                    }

                    let sequence: Option<Sequence> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::COUNTERS)
                        .obj()
                        .one(PROFILE_SEQUENCE)
                        .await?;

                    let next = Sequence {
                        last_id: sequence.unwrap_or_default().last_id + 1,
                    };
                    let stored = profile.with_id(next.last_id);

                    db.fluent()
                        .update()
                        .in_col(collections::COUNTERS)
                        .document_id(PROFILE_SEQUENCE)
                        .object(&next)
                        .add_to_transaction(transaction)?;

                    db.fluent()
                        .update()
                        .in_col(collections::PROFILES)
                        .document_id(stored.user_id.to_string())
                        .object(&stored)
                        .add_to_transaction(transaction)?;

                    Ok(Some(stored))
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Profile insert failed: {}", e)))?;

        match inserted {
            Some(stored) => {
                tracing::info!(user_id, profile_id = stored.id, "Profile stored");
                Ok(stored)
            }
            None => Err(AppError::Conflict(PROFILE_EXISTS.to_string())),
        }
    }
}
