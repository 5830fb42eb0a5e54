// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process repository for tests and local runs without Firestore.

use crate::db::{ProfileRepository, PROFILE_EXISTS};
use crate::error::AppError;
use crate::models::{NewProfile, UserProfile, UserRecord};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Repository backed by concurrent maps.
#[derive(Default)]
pub struct MemoryRepository {
    users: DashMap<u64, UserRecord>,
    /// Keyed by user_id, which makes the one-profile-per-user rule atomic.
    profiles: DashMap<u64, UserProfile>,
    last_profile_id: AtomicU64,
    fail_inserts: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a user.
    pub fn upsert_user(&self, user: UserRecord) {
        self.users.insert(user.id, user);
    }

    /// Make subsequent inserts fail with a database error.
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }
}

#[async_trait]
impl ProfileRepository for MemoryRepository {
    async fn get_user(&self, user_id: u64) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }

    async fn get_profile_by_user_id(&self, user_id: u64) -> Result<Option<UserProfile>, AppError> {
        Ok(self.profiles.get(&user_id).map(|p| p.clone()))
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<UserProfile, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(
                "insert rejected (simulated failure)".to_string(),
            ));
        }

        match self.profiles.entry(profile.user_id) {
            Entry::Occupied(_) => Err(AppError::Conflict(PROFILE_EXISTS.to_string())),
            Entry::Vacant(slot) => {
                let id = self.last_profile_id.fetch_add(1, Ordering::SeqCst) + 1;
                let stored = profile.with_id(id);
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }
}
