//! CLI command implementations.

pub mod admin;
pub mod capacity;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;

use pandi_dorty_web::db::RepositoryError;

/// Errors shared by commands that talk to the database.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Query error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Read a required environment variable, loading `.env` first.
///
/// # Errors
///
/// Returns `CommandError::MissingEnvVar` if the variable is unset or blank.
pub fn required_env(key: &'static str) -> Result<String, CommandError> {
    dotenvy::dotenv().ok();
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(CommandError::MissingEnvVar(key))
}

/// Connect to `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the variable is missing or the connection fails.
pub async fn connect() -> Result<PgPool, CommandError> {
    let database_url = SecretString::from(required_env("DATABASE_URL")?);
    tracing::info!("Connecting to database...");
    Ok(pandi_dorty_web::db::create_pool(&database_url).await?)
}
