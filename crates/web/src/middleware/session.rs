//! Session middleware configuration.
//!
//! `PostgreSQL`-backed sessions via tower-sessions, stored in
//! `bakery.session`.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pd_admin_session";

/// Session expiry on inactivity (8 hours).
const SESSION_EXPIRY_SECONDS: i64 = 8 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// # Errors
///
/// Returns the store's message if the schema or table name is rejected.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AppConfig,
) -> Result<SessionManagerLayer<PostgresStore>, String> {
    // Table is created by migration, never by the store.
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("bakery")?
        .with_table_name("session")?;

    let is_secure = config.base_url.starts_with("https://");

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/"))
}
