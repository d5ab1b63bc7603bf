//! Admin password authentication.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use pandi_dorty_core::Email;

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::AdminUser;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] pandi_dorty_core::EmailError),

    /// Wrong password, unknown or inactive user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Too many failed attempts.
    #[error("account locked until {until}")]
    AccountLocked { until: DateTime<Utc> },

    /// Admin already exists.
    #[error("admin user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// Admin authentication service.
pub struct AuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: AdminUserRepository::new(pool),
        }
    }

    /// Check an admin's email and password.
    ///
    /// Failed attempts are counted; the fifth in a row locks the account for
    /// fifteen minutes. A successful login resets the counter.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown or inactive
    /// admin or a wrong password.
    /// Returns `AuthError::AccountLocked` while the account is locked.
    /// Returns `AuthError::Repository` if the database fails.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminUser, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let login = self
            .users
            .get_login(&email)
            .await?
            .filter(|login| login.user.is_active)
            .ok_or(AuthError::InvalidCredentials)?;

        let now = Utc::now();
        if let Some(until) = login.locked_until.filter(|_| login.is_locked(now)) {
            return Err(AuthError::AccountLocked { until });
        }

        if verify_password(password, &login.password_hash).is_err() {
            let locked_until = self.users.record_failed_login(login.user.id).await?;
            tracing::warn!(admin_id = %login.user.id, "Failed admin login attempt");
            return match locked_until.filter(|until| *until > now) {
                Some(until) => Err(AuthError::AccountLocked { until }),
                None => Err(AuthError::InvalidCredentials),
            };
        }

        self.users.record_successful_login(login.user.id).await?;
        tracing::info!(admin_id = %login.user.id, "Admin logged in");
        Ok(login.user)
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::WeakPassword` for bad
    /// input, `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn create_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let hash = hash_password(password)?;

        self.users
            .create(&email, name.trim(), &hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }
}

/// Validate password requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
