//! Admin account listing.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::db::AdminUserRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::AdminUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<AdminUser>,
}

pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<UsersResponse>, AppError> {
    let users = AdminUserRepository::new(state.pool()).list_all().await?;
    Ok(Json(UsersResponse { users }))
}
