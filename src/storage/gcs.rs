// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cloud Storage client for avatar blobs (JSON API).
//!
//! Handles:
//! - Media uploads and object deletion
//! - Public URL construction
//! - Access tokens from the metadata server, cached until shortly before expiry

use crate::config::{Config, StorageAuth};
use crate::storage::{encode_key_path, BlobStorage, StorageError};
use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Refresh tokens this long before they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

/// Cloud Storage client.
pub struct GcsStorage {
    http: reqwest::Client,
    api_url: String,
    public_url: String,
    bucket: String,
    auth: StorageAuth,
    token_cache: RwLock<Option<CachedToken>>,
}

impl GcsStorage {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;

        tracing::info!(
            bucket = %config.avatar_bucket,
            api_url = %config.storage_api_url,
            "Cloud Storage client initialized"
        );

        Ok(Self {
            http,
            api_url: config.storage_api_url.trim_end_matches('/').to_string(),
            public_url: config.storage_public_url.trim_end_matches('/').to_string(),
            bucket: config.avatar_bucket.clone(),
            auth: config.storage_auth.clone(),
            token_cache: RwLock::new(None),
        })
    }

    /// Bearer token for the next request, if the configured auth needs one.
    async fn access_token(&self) -> Result<Option<String>, StorageError> {
        match &self.auth {
            StorageAuth::None => Ok(None),
            StorageAuth::Static(token) => Ok(Some(token.clone())),
            StorageAuth::Metadata => self.metadata_token().await.map(Some),
        }
    }

    async fn metadata_token(&self) -> Result<String, StorageError> {
        {
            let cache = self.token_cache.read().await;
            if let Some(entry) = cache
                .as_ref()
                .filter(|entry| entry.expires_at > Instant::now())
            {
                return Ok(entry.access_token.clone());
            }
        }

        let response = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| StorageError::Auth(format!("metadata request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(StorageError::Auth(format!(
                "metadata server returned status {}",
                response.status()
            )));
        }

        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| StorageError::Auth(format!("invalid metadata token JSON: {e}")))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *self.token_cache.write().await = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        tracing::debug!(ttl_secs = lifetime.as_secs(), "Storage access token refreshed");
        Ok(token.access_token)
    }

    fn authorize(
        request: reqwest::RequestBuilder,
        token: Option<String>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl BlobStorage for GcsStorage {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = format!("{}/upload/storage/v1/b/{}/o", self.api_url, self.bucket);
        let token = self
            .access_token()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let size = data.len();
        let request = self
            .http
            .post(&url)
            .query(&[("uploadType", "media"), ("name", key)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data);

        let response = Self::authorize(request, token)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Upload(format!("status {}: {}", status, body)));
        }

        tracing::debug!(key, size, "Object uploaded");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.api_url,
            self.bucket,
            urlencoding::encode(key)
        );
        let token = self
            .access_token()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;

        let response = Self::authorize(self.http.delete(&url), token)
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(StorageError::Delete(format!("status {}", status)))
        }
    }

    async fn public_url(&self, key: &str) -> Result<String, StorageError> {
        Ok(format!(
            "{}/{}/{}",
            self.public_url,
            self.bucket,
            encode_key_path(key)
        ))
    }
}
