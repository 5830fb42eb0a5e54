// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request extractors and token handling.

pub mod auth;

pub use auth::{Authenticator, AuthUser, BearerToken, JwtAuthenticator, TokenError};
