//! User model as stored by the account service.

use serde::{Deserialize, Serialize};

/// Authorization group a user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserGroup {
    User,
    Moderator,
    Admin,
}

impl UserGroup {
    /// Whether members may act on behalf of other users.
    pub fn is_elevated(self) -> bool {
        !matches!(self, UserGroup::User)
    }
}

/// User account stored in Firestore (read-only for this service).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// User ID (also used as document ID)
    pub id: u64,
    pub email: String,
    /// Inactive accounts cannot receive a profile
    pub is_active: bool,
    pub group: UserGroup,
}
