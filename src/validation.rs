// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reusable field validators for profile forms and avatar images.

use crate::models::AvatarUpload;
use chrono::{Datelike, NaiveDate, Utc};
use std::borrow::Cow;
use validator::ValidationError;

/// Accepted `date_of_birth` format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Largest accepted avatar, in bytes.
pub const MAX_AVATAR_BYTES: usize = 1024 * 1024;

/// Message for avatars over [`MAX_AVATAR_BYTES`].
pub const AVATAR_TOO_LARGE: &str = "Image size exceeds 1 MB";

const MAX_NAME_LEN: usize = 100;
const MIN_BIRTH_YEAR: i32 = 1900;
const MIN_AGE_YEARS: u32 = 18;

/// Allowed gender vocabulary.
pub const GENDERS: &[&str] = &["male", "female"];

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn required() -> ValidationError {
    error("required", "This field is required.")
}

/// Names are 1-100 English letters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(required());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(error(
            "length",
            format!("Name must be at most {MAX_NAME_LEN} characters."),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(error(
            "format",
            format!("{name} contains non-english letters"),
        ));
    }
    Ok(())
}

pub fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    let gender = gender.trim();
    if gender.is_empty() {
        return Err(required());
    }
    if !GENDERS.contains(&gender.to_lowercase().as_str()) {
        return Err(error(
            "choice",
            format!("Gender must be one of: {}", GENDERS.join(", ")),
        ));
    }
    Ok(())
}

/// Birth date must not be in the future, not before 1900, and the user
/// must be at least 18 on `today`.
pub fn validate_birth_date(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date > today {
        return Err(error("future", "Birth date cannot be in the future."));
    }
    if date.year() < MIN_BIRTH_YEAR {
        return Err(error(
            "range",
            "Invalid birth date - year must be greater than 1900.",
        ));
    }
    let age = today.years_since(date).unwrap_or(0);
    if age < MIN_AGE_YEARS {
        return Err(error(
            "age",
            "You must be at least 18 years old to register.",
        ));
    }
    Ok(())
}

/// Form-level wrapper: parse `YYYY-MM-DD`, then check against today (UTC).
pub fn validate_birth_date_field(raw: &str) -> Result<(), ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(required());
    }
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| error("format", "Invalid date format. Use YYYY-MM-DD."))?;
    validate_birth_date(date, Utc::now().date_naive())
}

pub fn validate_info(info: &str) -> Result<(), ValidationError> {
    if info.trim().is_empty() {
        return Err(error(
            "blank",
            "Info field cannot be empty or contain only spaces.",
        ));
    }
    Ok(())
}

/// Image formats recognized from file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// Check size, format and integrity of an uploaded avatar.
///
/// The format is detected from the file content and the image must decode
/// fully. Returns the detected format on success.
pub fn validate_image(avatar: &AvatarUpload) -> Result<ImageFormat, ValidationError> {
    let data = avatar.data.as_ref();

    if data.is_empty() {
        return Err(required());
    }
    if data.len() > MAX_AVATAR_BYTES {
        return Err(error("size", AVATAR_TOO_LARGE));
    }

    if let Some(declared) = avatar.content_type.as_deref() {
        let declared = declared.to_ascii_lowercase();
        if declared != "application/octet-stream"
            && !ALLOWED_CONTENT_TYPES.contains(&declared.as_str())
        {
            return Err(error(
                "content_type",
                format!("Unsupported content type: {declared}. Use one of: JPEG, PNG"),
            ));
        }
    }

    let (format, detected) = match image::guess_format(data) {
        Ok(detected @ image::ImageFormat::Jpeg) => (ImageFormat::Jpeg, detected),
        Ok(detected @ image::ImageFormat::Png) => (ImageFormat::Png, detected),
        Ok(other) => {
            return Err(error(
                "format",
                format!(
                    "Unsupported image format: {}. Use one of: JPEG, PNG",
                    format!("{other:?}").to_uppercase()
                ),
            ))
        }
        Err(_) => return Err(error("format", "Invalid image format")),
    };

    image::load_from_memory_with_format(data, detected)
        .map_err(|_| error("corrupt", "Image file is corrupted"))?;

    Ok(format)
}
