//! Admin user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pandi_dorty_core::{AdminUserId, Email};

/// An admin user as exposed to the API. The password hash never leaves the
/// repository.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Login state of an admin, read when checking a password.
#[derive(Debug, Clone)]
pub struct AdminLogin {
    pub user: AdminUser,
    pub password_hash: String,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl AdminLogin {
    /// Whether the account is locked at `now`.
    #[must_use]
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}
