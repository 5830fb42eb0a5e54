//! Database layer: the repository contract and its backends.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryRepository;

use crate::error::AppError;
use crate::models::{NewProfile, UserProfile, UserRecord};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Profiles keyed by user_id
    pub const PROFILES: &str = "profiles";
    /// Sequence documents for generated ids
    pub const COUNTERS: &str = "counters";
}

/// Detail reported when a user already has a profile.
pub const PROFILE_EXISTS: &str = "User already has a profile.";

/// Storage operations the profile pipeline depends on.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Get a user (with its group) by ID.
    async fn get_user(&self, user_id: u64) -> Result<Option<UserRecord>, AppError>;

    /// Get the profile owned by `user_id`, if any.
    async fn get_profile_by_user_id(&self, user_id: u64) -> Result<Option<UserProfile>, AppError>;

    /// Insert a profile and return it with its generated id.
    ///
    /// Fails with [`AppError::Conflict`] if the user already has one.
    async fn insert_profile(&self, profile: NewProfile) -> Result<UserProfile, AppError>;
}
