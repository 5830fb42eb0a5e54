// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile models: the submitted form, the stored record and the API view.

use crate::error::FieldError;
use crate::validation::{
    validate_birth_date_field, validate_gender, validate_info, validate_name, DATE_FORMAT,
};
use axum::body::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationErrors};

/// Raw text fields of a create-profile form.
///
/// Absent fields stay empty and are reported as required.
#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileForm {
    #[validate(custom(function = "validate_name"))]
    pub first_name: String,
    #[validate(custom(function = "validate_name"))]
    pub last_name: String,
    #[validate(custom(function = "validate_gender"))]
    pub gender: String,
    #[validate(custom(function = "validate_birth_date_field"))]
    pub date_of_birth: String,
    #[validate(custom(function = "validate_info"))]
    pub info: String,
}

impl ProfileForm {
    /// Run every field rule and collect the failures, sorted by field name.
    pub fn check(&self) -> Vec<FieldError> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => field_errors(&errors),
        }
    }

    /// Normalize a form that passed [`ProfileForm::check`] into a record to insert.
    ///
    /// Names are stored lower-cased.
    pub fn into_new_profile(self, user_id: u64, avatar_key: String) -> Result<NewProfile, FieldError> {
        let date_of_birth = NaiveDate::parse_from_str(self.date_of_birth.trim(), DATE_FORMAT)
            .map_err(|_| FieldError::new("date_of_birth", "Invalid date format. Use YYYY-MM-DD."))?;

        Ok(NewProfile {
            user_id,
            first_name: self.first_name.trim().to_lowercase(),
            last_name: self.last_name.trim().to_lowercase(),
            gender: self.gender.trim().to_lowercase(),
            date_of_birth,
            info: self.info,
            avatar: avatar_key,
        })
    }
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |err| FieldError::from_validation(field.to_string(), err))
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Uploaded avatar file as received from the multipart body.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub filename: String,
    /// Content type declared by the client, if any
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Profile fields ready for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub user_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub info: String,
    /// Storage key of the avatar blob
    pub avatar: String,
}

impl NewProfile {
    pub fn with_id(self, id: u64) -> UserProfile {
        UserProfile {
            id,
            user_id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            info: self.info,
            avatar: self.avatar,
        }
    }
}

/// User profile stored in Firestore (document ID is the user ID).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub user_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub info: String,
    /// Storage key of the avatar blob
    pub avatar: String,
}

/// Profile returned by the API, with the avatar resolved to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub info: String,
    pub avatar: String,
}

impl ProfileResponse {
    pub fn from_profile(profile: UserProfile, avatar_url: String) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            gender: profile.gender,
            date_of_birth: profile.date_of_birth,
            info: profile.info,
            avatar: avatar_url,
        }
    }
}
