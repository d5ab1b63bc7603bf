//! Blocked delivery dates.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use pandi_dorty_core::BlockedDateId;

use super::json_body;
use crate::db::BlockedDateRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::BlockedDate;
use crate::services::orders::today;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/blocked-dates", get(list))
        .route("/api/blocked-dates/add", post(add))
        .route("/api/blocked-dates/remove", delete(remove))
        .route("/api/blocked-dates/public", get(public))
}

#[derive(Debug, Deserialize)]
pub struct AddBlockedDate {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveBlockedDate {
    pub id: BlockedDateId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedDatesResponse {
    pub blocked_dates: Vec<BlockedDate>,
}

pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<BlockedDatesResponse>, AppError> {
    let blocked_dates = BlockedDateRepository::new(state.pool()).list().await?;
    Ok(Json(BlockedDatesResponse { blocked_dates }))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn add(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    payload: Result<Json<AddBlockedDate>, JsonRejection>,
) -> Result<Json<BlockedDate>, AppError> {
    let body = json_body(payload)?;
    let date = NaiveDate::parse_from_str(body.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Neplatné datum: {}", body.date)))?;

    let blocked = BlockedDateRepository::new(state.pool())
        .add(date, admin.id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(_) => {
                AppError::Conflict(format!("Datum {date} je již blokováno"))
            }
            other => other.into(),
        })?;

    tracing::info!(%date, "Date blocked");
    Ok(Json(blocked))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn remove(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    payload: Result<Json<RemoveBlockedDate>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let body = json_body(payload)?;
    BlockedDateRepository::new(state.pool())
        .remove(body.id)
        .await?;

    tracing::info!(blocked_date_id = %body.id, "Date unblocked");
    Ok(Json(json!({ "success": true })))
}

/// Upcoming blocked dates for the order forms (no login).
pub async fn public(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let dates = BlockedDateRepository::new(state.pool())
        .list_from(today())
        .await?;
    Ok(Json(json!({ "dates": dates })))
}
