//! Authentication extractor for admin endpoints.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires a logged-in admin. Rejects with a 401 JSON error.
///
/// ```rust,ignore
/// async fn handler(RequireAdminAuth(admin): RequireAdminAuth) -> String {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let unauthorized = || AppError::Unauthorized("Přihlášení je vyžadováno".to_owned());

        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(unauthorized)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(unauthorized)?;

        Ok(Self(admin))
    }
}

/// Store the logged-in admin in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Drop the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
