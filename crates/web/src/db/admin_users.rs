//! Admin user repository, including login bookkeeping.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pandi_dorty_core::{AdminUserId, Email};

use super::{RepositoryError, conflict_on_unique};
use crate::models::AdminUser;
use crate::models::admin_user::AdminLogin;

/// Failed attempts before an account is locked.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Lock duration after too many failed attempts.
pub const LOCKOUT_MINUTES: i32 = 15;

const USER_COLUMNS: &str = "id, email, name, is_active, last_login, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    email: String,
    name: String,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AdminUserId::new(row.id),
            email,
            name: row.name,
            is_active: row.is_active,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminLoginRow {
    #[sqlx(flatten)]
    user: AdminUserRow,
    password_hash: String,
    failed_login_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
}

impl TryFrom<AdminLoginRow> for AdminLogin {
    type Error = RepositoryError;

    fn try_from(row: AdminLoginRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user: row.user.try_into()?,
            password_hash: row.password_hash,
            failed_login_attempts: row.failed_login_attempts,
            locked_until: row.locked_until,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM bakery.admin_user ORDER BY created_at");
        let rows = sqlx::query_as::<_, AdminUserRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an admin user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM bakery.admin_user WHERE id = $1");
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the login state of an admin by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_login(&self, email: &Email) -> Result<Option<AdminLogin>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, password_hash, failed_login_attempts, locked_until \
             FROM bakery.admin_user WHERE email = $1"
        );
        let row = sqlx::query_as::<_, AdminLoginRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let sql = format!(
            "INSERT INTO bakery.admin_user (email, name, password_hash) \
             VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AdminUserRow>(&sql)
            .bind(email.as_str())
            .bind(name)
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "admin user"))?;

        row.try_into()
    }

    /// Count one failed login, locking the account once the limit is hit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn record_failed_login(
        &self,
        id: AdminUserId,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let locked_until = sqlx::query_scalar(
            r"
            UPDATE bakery.admin_user
            SET failed_login_attempts = failed_login_attempts + 1,
                locked_until = CASE
                    WHEN failed_login_attempts + 1 >= $2
                    THEN NOW() + make_interval(mins => $3)
                    ELSE locked_until
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING locked_until
            ",
        )
        .bind(id)
        .bind(MAX_FAILED_ATTEMPTS)
        .bind(LOCKOUT_MINUTES)
        .fetch_one(self.pool)
        .await?;

        Ok(locked_until)
    }

    /// Reset the failure counter and record the login time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn record_successful_login(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE bakery.admin_user
            SET failed_login_attempts = 0,
                locked_until = NULL,
                last_login = NOW(),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
