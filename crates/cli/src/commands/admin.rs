//! Admin user management commands.
//!
//! ```bash
//! ADMIN_EMAIL=jana@pandidorty.cz ADMIN_PASSWORD=... pd-cli admin create "Jana Nováková"
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `ADMIN_EMAIL` - Email of the new admin
//! - `ADMIN_PASSWORD` - Password of the new admin (at least 8 characters)

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use pandi_dorty_core::AdminUserId;
use pandi_dorty_web::services::{AuthError, AuthService};

use super::{CommandError, connect, required_env};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Admin name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error if the environment is incomplete, the input is invalid or
/// an admin with the same email exists.
pub async fn create_user(name: &str) -> Result<AdminUserId, AdminError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::EmptyName);
    }
    let email = required_env("ADMIN_EMAIL")?;
    let password = SecretString::from(required_env("ADMIN_PASSWORD")?);

    let pool = connect().await?;

    tracing::info!("Creating admin user: {email}");
    let user = AuthService::new(&pool)
        .create_admin(&email, name, password.expose_secret())
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}
