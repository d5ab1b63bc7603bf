//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Readiness (database)
//!
//! # Public order forms
//! POST   /api/submit-order                - Custom cake/dessert (multipart, photos)
//! POST   /api/submit-wedding-tasting      - Wedding tasting (capacity limited)
//! GET    /api/wedding-tasting/capacity    - Remaining wedding tastings
//! POST   /api/submit-christmas-order      - Christmas sweets
//! POST   /api/submit-christmas-tasting    - Christmas tasting
//! GET    /api/blocked-dates/public        - Upcoming blocked dates
//! GET    /photo/{id}                      - Order photo
//!
//! # Admin (session required)
//! POST   /admin/login                     - Log in
//! POST   /admin/logout                    - Log out
//! GET    /admin/me                        - Current admin
//! GET    /api/orders                      - Filtered, sorted, paged orders
//! GET    /api/orders/stats                - Counts per status
//! GET    /api/orders/by-number/{number}   - Order by number
//! PATCH  /api/orders/{id}/paid            - Set/clear paid
//! PATCH  /api/orders/{id}/delivered       - Set/clear delivered
//! GET    /api/blocked-dates               - Blocked dates
//! POST   /api/blocked-dates/add           - Block a date
//! DELETE /api/blocked-dates/remove        - Unblock a date
//! GET    /api/admin-users                 - Admin accounts
//! POST   /api/test-email                  - Send a test email
//! ```

pub mod admin;
pub mod blocked_dates;
pub mod orders;
pub mod photos;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(orders::routes())
        .merge(blocked_dates::routes())
        .route("/photo/{id}", get(photos::show))
        .merge(admin::routes())
        .route("/api/test-email", post(admin::email::send_test))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Unwrap a JSON body, reporting rejections in the API's error format.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

/// Parse a numeric path segment into an ID.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Neplatné ID ({what}): {raw}")))
}

#[cfg(test)]
mod tests {
    use pandi_dorty_core::OrderId;

    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id::<OrderId>("42", "order").ok(), Some(OrderId::new(42)));
        assert!(matches!(
            parse_id::<OrderId>("abc", "order"),
            Err(AppError::BadRequest(_))
        ));
    }
}
