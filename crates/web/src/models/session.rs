//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use pandi_dorty_core::{AdminUserId, Email};

use super::AdminUser;

/// Session-stored admin identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
