//! Admin login, logout and session lookup.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, set_sentry_user};
use crate::middleware::{RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::routes::json_body;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub success: bool,
    pub user: CurrentAdmin,
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AdminResponse>, AppError> {
    let body = json_body(payload)?;
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    let admin = CurrentAdmin::from(&user);
    set_current_admin(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(admin.id.as_i32());

    Ok(Json(AdminResponse {
        success: true,
        user: admin,
    }))
}

pub async fn logout(session: Session) -> Result<Json<Value>, AppError> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    Ok(Json(json!({ "success": true })))
}

pub async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<AdminResponse> {
    Json(AdminResponse {
        success: true,
        user: admin,
    })
}
