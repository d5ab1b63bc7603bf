//! Database operations for the bakery `PostgreSQL` schema.
//!
//! ## Tables (schema `bakery`)
//!
//! - `orders` - Orders of every kind (wide table, see [`orders`])
//! - `order_photo` - Inspiration photos for custom cakes, base64 encoded
//! - `admin_user` - Admin accounts with argon2 password hashes
//! - `blocked_date` - Dates with no deliveries
//! - `session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p pandi-dorty-cli -- migrate
//! ```

pub mod admin_users;
pub mod blocked_dates;
pub mod orders;
pub mod photos;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use blocked_dates::BlockedDateRepository;
pub use orders::{AdmissionError, OrderRepository};
pub use photos::PhotoRepository;

/// SQLSTATE codes worth retrying the whole transaction for.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique date).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Serialization failures and deadlocks succeed when the transaction is
    /// simply run again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => db_err
                .code()
                .is_some_and(|code| code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED),
            _ => false,
        }
    }
}

/// Map a unique violation to `Conflict`, everything else to `Database`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
