// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Blob storage for avatar images.

pub mod gcs;
pub mod memory;

pub use gcs::GcsStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use axum::body::Bytes;

/// Prefix under which all avatars are stored.
pub const AVATAR_PREFIX: &str = "avatars";

/// Blob storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Credentials unavailable: {0}")]
    Auth(String),
}

/// Object store holding avatar blobs.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `data` under `key`, replacing any existing object.
    async fn upload(&self, key: &str, data: Bytes, content_type: &str)
        -> Result<(), StorageError>;

    /// Remove the object under `key`. Missing objects are not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Retrievable URL for the object under `key`.
    async fn public_url(&self, key: &str) -> Result<String, StorageError>;
}

/// Deterministic storage key for a user's avatar.
///
/// Only the final path component of the client filename is kept.
pub fn avatar_key(user_id: u64, filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or("avatar");
    format!("{AVATAR_PREFIX}/{user_id}_{name}")
}

/// Percent-encode each path segment of an object key, keeping the slashes.
pub(crate) fn encode_key_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
