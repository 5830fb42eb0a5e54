// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::ValidationError;

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Report a validator failure, falling back to its code when it has no message.
    pub fn from_validation(field: impl Into<String>, err: &ValidationError) -> Self {
        let message = err
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
        Self::new(field, message)
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Avatar upload failed: {0}")]
    AvatarUpload(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Detail returned to callers when the avatar could not be stored.
    pub const AVATAR_UPLOAD_FAILED: &'static str =
        "Failed to upload avatar. Please try again later.";

    /// Status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AvatarUpload(_)
            | AppError::Storage(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Either a plain message or the list of rejected fields.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<ErrorDetail>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, detail) = match self {
            AppError::Validation(fields) => ("validation_error", Some(ErrorDetail::Fields(fields))),
            AppError::Unauthenticated(msg) => ("unauthorized", Some(ErrorDetail::Message(msg))),
            AppError::Forbidden(msg) => ("forbidden", Some(ErrorDetail::Message(msg))),
            AppError::Conflict(msg) => ("conflict", Some(ErrorDetail::Message(msg))),
            AppError::BadRequest(msg) => ("bad_request", Some(ErrorDetail::Message(msg))),
            AppError::AvatarUpload(cause) => {
                tracing::error!(error = %cause, "Avatar upload failed");
                (
                    "upload_failed",
                    Some(ErrorDetail::Message(Self::AVATAR_UPLOAD_FAILED.to_string())),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (
                    "storage_error",
                    Some(ErrorDetail::Message("Avatar storage is unavailable.".to_string())),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    "database_error",
                    Some(ErrorDetail::Message("Database operation failed.".to_string())),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", None)
            }
        };

        (status, Json(ErrorResponse { error, detail })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
