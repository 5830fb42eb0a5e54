// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request},
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use profile_api::config::Config;
use profile_api::db::{FirestoreDb, MemoryRepository};
use profile_api::middleware::auth::Claims;
use profile_api::middleware::JwtAuthenticator;
use profile_api::models::{UserGroup, UserRecord};
use profile_api::routes::create_router;
use profile_api::storage::MemoryStorage;
use profile_api::AppState;
use std::sync::{Arc, LazyLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Base URL of the in-memory avatar store.
#[allow(dead_code)]
pub const AVATAR_BASE_URL: &str = "https://cdn.test/avatars";

/// A small valid JPEG.
#[allow(dead_code)]
pub static TINY_JPEG: LazyLock<Vec<u8>> = LazyLock::new(|| {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([30, 120, 200]));
    let mut data = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut data),
            image::ImageOutputFormat::Jpeg(90),
        )
        .unwrap();
    data
});

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Connect to the Firestore emulator.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// App wired with in-memory collaborators the test can inspect.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub repo: Arc<MemoryRepository>,
    pub storage: Arc<MemoryStorage>,
}

#[allow(dead_code)]
pub fn user(id: u64, group: UserGroup, is_active: bool) -> UserRecord {
    UserRecord {
        id,
        email: format!("user{id}@example.com"),
        is_active,
        group,
    }
}

/// Create a test app with in-memory stores.
///
/// Seeded users: 5 (user), 6 (user), 7 (moderator), 8 (admin),
/// 9 (user, inactive).
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let config = Config::test_default();
    let repo = Arc::new(MemoryRepository::new());
    let storage = Arc::new(MemoryStorage::new(AVATAR_BASE_URL));

    repo.upsert_user(user(5, UserGroup::User, true));
    repo.upsert_user(user(6, UserGroup::User, true));
    repo.upsert_user(user(7, UserGroup::Moderator, true));
    repo.upsert_user(user(8, UserGroup::Admin, true));
    repo.upsert_user(user(9, UserGroup::User, false));

    let authenticator = Arc::new(JwtAuthenticator::new(&config.jwt_signing_key));
    let state = Arc::new(AppState::new(
        config,
        authenticator,
        repo.clone(),
        storage.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        repo,
        storage,
    }
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn sign(claims: &Claims, signing_key: &[u8]) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// Create a test JWT token valid for one day.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: u64, signing_key: &[u8]) -> String {
    let now = now();
    sign(
        &Claims {
            sub: user_id.to_string(),
            exp: now + 86400,
            iat: now,
        },
        signing_key,
    )
}

/// Create a JWT that expired an hour ago.
#[allow(dead_code)]
pub fn create_expired_jwt(user_id: u64, signing_key: &[u8]) -> String {
    let now = now();
    sign(
        &Claims {
            sub: user_id.to_string(),
            exp: now - 3600,
            iat: now - 7200,
        },
        signing_key,
    )
}

const BOUNDARY: &str = "profile-test-boundary";

/// File part of a multipart form.
#[allow(dead_code)]
pub struct FilePart<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

/// Encode text fields and an optional `avatar` file as multipart/form-data.
#[allow(dead_code)]
pub fn multipart_body(fields: &[(&str, &str)], avatar: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some(file) = avatar {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"avatar\"; filename=\"{}\"\r\n",
                file.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes());
        body.extend_from_slice(file.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// The John Doe form used across tests.
#[allow(dead_code)]
pub fn valid_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("first_name", "John"),
        ("last_name", "Doe"),
        ("gender", "male"),
        ("date_of_birth", "1990-01-01"),
        ("info", "hello"),
    ]
}

#[allow(dead_code)]
pub fn jpeg_avatar() -> FilePart<'static> {
    FilePart {
        filename: "me.jpg",
        content_type: "image/jpeg",
        data: TINY_JPEG.as_slice(),
    }
}

/// POST a create-profile request.
#[allow(dead_code)]
pub fn profile_request(user_id: &str, token: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/users/{user_id}/profile/"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    builder.body(Body::from(body)).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
