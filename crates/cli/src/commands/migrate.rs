//! Database migration command.
//!
//! ```bash
//! pd-cli migrate
//! ```
//!
//! Migrations live in `crates/web/migrations/` and create the `bakery`
//! schema: orders, order photos, blocked dates, admin users and sessions.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use super::{CommandError, connect};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
