// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes.

use crate::error::{AppError, FieldError, Result};
use crate::middleware::auth::BearerToken;
use crate::models::{AvatarUpload, ProfileForm, ProfileResponse};
use crate::validation::{AVATAR_TOO_LARGE, MAX_AVATAR_BYTES};
use crate::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::PathRejection,
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Room for the text fields and multipart framing on top of the avatar.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/{user_id}/profile/", post(create_profile))
        // Oversized avatars must reach the image validator (422) instead of
        // tripping the body limit (413), so allow some slack above the ceiling.
        .layer(DefaultBodyLimit::max(2 * MAX_AVATAR_BYTES + FORM_OVERHEAD_BYTES))
}

/// Create the profile of `user_id` from a multipart form.
///
/// Fields: `first_name`, `last_name`, `gender`, `date_of_birth`
/// (YYYY-MM-DD), `info`, and the `avatar` file.
async fn create_profile(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<u64>, PathRejection>,
    BearerToken(token): BearerToken,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ProfileResponse>)> {
    let Path(user_id) = path.map_err(|_| {
        AppError::Validation(vec![FieldError::new(
            "user_id",
            "User ID must be a non-negative integer.",
        )])
    })?;

    let multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let (form, avatar) = read_form(multipart).await?;

    let profile = state
        .profile_creator
        .create(user_id, form, avatar, &token)
        .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Only the avatar can overrun the body limit, so an oversized body is
/// reported as an oversized image rather than a malformed request.
fn bad_multipart(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!(error = %err.body_text(), "Multipart body over limit");
        return AppError::Validation(vec![FieldError::new("avatar", AVATAR_TOO_LARGE)]);
    }
    AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
}

/// Collect the known form fields; unknown fields are ignored.
async fn read_form(mut multipart: Multipart) -> Result<(ProfileForm, Option<AvatarUpload>)> {
    let mut form = ProfileForm::default();
    let mut avatar = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "first_name" => form.first_name = field.text().await.map_err(bad_multipart)?,
            "last_name" => form.last_name = field.text().await.map_err(bad_multipart)?,
            "gender" => form.gender = field.text().await.map_err(bad_multipart)?,
            "date_of_birth" => form.date_of_birth = field.text().await.map_err(bad_multipart)?,
            "info" => form.info = field.text().await.map_err(bad_multipart)?,
            "avatar" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(bad_multipart)?;

                avatar = Some(AvatarUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => continue,
        }
    }

    Ok((form, avatar))
}
