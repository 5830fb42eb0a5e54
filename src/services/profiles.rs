// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile creation pipeline.
//!
//! Steps run in a fixed order and the first failure ends the request:
//! 1. Validate form fields and the avatar image
//! 2. Decode the access token
//! 3. Authorize (own profile, or an elevated group)
//! 4. Check the target user exists and is active
//! 5. Reject users that already have a profile
//! 6. Upload the avatar
//! 7. Insert the profile
//! 8. Resolve the avatar URL
//!
//! Nothing is written before step 6.

use crate::db::{ProfileRepository, PROFILE_EXISTS};
use crate::error::{AppError, FieldError, Result};
use crate::middleware::auth::Authenticator;
use crate::models::{AvatarUpload, ProfileForm, ProfileResponse};
use crate::storage::{avatar_key, BlobStorage};
use crate::validation::validate_image;
use std::sync::Arc;

/// Detail for callers acting on another user's profile without rights.
pub const FORBIDDEN_DETAIL: &str = "You don't have permission to edit this profile.";
/// Detail for targets that are missing or deactivated.
pub const INACTIVE_USER_DETAIL: &str = "User not found or not active.";

/// Creates user profiles from validated form submissions.
pub struct ProfileCreator {
    authenticator: Arc<dyn Authenticator>,
    repository: Arc<dyn ProfileRepository>,
    storage: Arc<dyn BlobStorage>,
}

impl ProfileCreator {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        repository: Arc<dyn ProfileRepository>,
        storage: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            authenticator,
            repository,
            storage,
        }
    }

    /// Create the profile of `user_id` on behalf of the token's subject.
    pub async fn create(
        &self,
        user_id: u64,
        form: ProfileForm,
        avatar: Option<AvatarUpload>,
        token: &str,
    ) -> Result<ProfileResponse> {
        // 1. Field and image validation
        let mut errors = form.check();
        let image = match avatar.as_ref() {
            Some(upload) => validate_image(upload)
                .map_err(|err| FieldError::from_validation("avatar", &err)),
            None => Err(FieldError::new("avatar", "This field is required.")),
        };

        let (avatar, format) = match (avatar, image) {
            (Some(avatar), Ok(format)) if errors.is_empty() => (avatar, format),
            (_, image) => {
                if let Err(field) = image {
                    errors.push(field);
                }
                tracing::debug!(user_id, rejected = errors.len(), "Profile form rejected");
                return Err(AppError::Validation(errors));
            }
        };

        let key = avatar_key(user_id, &avatar.filename);
        let new_profile = form
            .into_new_profile(user_id, key.clone())
            .map_err(|field| AppError::Validation(vec![field]))?;

        // 2. Token
        let acting = self.authenticator.decode_access_token(token).map_err(|err| {
            tracing::warn!(user_id, reason = %err, "Rejected access token");
            AppError::from(err)
        })?;

        // 3. Authorization
        if acting.user_id != user_id {
            let group = self
                .repository
                .get_user(acting.user_id)
                .await?
                .map(|user| user.group);

            if !group.is_some_and(|g| g.is_elevated()) {
                tracing::warn!(
                    user_id,
                    acting_user_id = acting.user_id,
                    group = ?group,
                    "Blocked profile creation for another user"
                );
                return Err(AppError::Forbidden(FORBIDDEN_DETAIL.to_string()));
            }
        }

        // 4. Target user
        let target = self.repository.get_user(user_id).await?;
        if !target.is_some_and(|user| user.is_active) {
            return Err(AppError::Unauthenticated(INACTIVE_USER_DETAIL.to_string()));
        }

        // 5. Duplicate
        if self
            .repository
            .get_profile_by_user_id(user_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(PROFILE_EXISTS.to_string()));
        }

        // 6. Avatar upload
        self.storage
            .upload(&key, avatar.data, format.mime_type())
            .await
            .map_err(|err| AppError::AvatarUpload(err.to_string()))?;

        // 7. Persistence
        let profile = match self.repository.insert_profile(new_profile).await {
            Ok(profile) => profile,
            Err(err) => {
                // A conflict here means a concurrent request won the insert;
                // the blob under this key may be the winner's, so leave it.
                if !matches!(err, AppError::Conflict(_)) {
                    self.discard_avatar(&key).await;
                }
                return Err(err);
            }
        };

        // 8. Response
        let avatar_url = self
            .storage
            .public_url(&profile.avatar)
            .await
            .map_err(|err| AppError::Storage(err.to_string()))?;

        tracing::info!(
            user_id,
            acting_user_id = acting.user_id,
            profile_id = profile.id,
            avatar_key = %key,
            "Profile created"
        );

        Ok(ProfileResponse::from_profile(profile, avatar_url))
    }

    /// Remove an uploaded avatar whose profile row could not be written.
    async fn discard_avatar(&self, key: &str) {
        match self.storage.delete(key).await {
            Ok(()) => tracing::info!(avatar_key = key, "Removed orphaned avatar"),
            Err(err) => {
                tracing::error!(avatar_key = key, error = %err, "Failed to remove orphaned avatar")
            }
        }
    }
}
