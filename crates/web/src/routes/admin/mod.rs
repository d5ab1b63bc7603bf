//! Admin API. Everything here except login requires a session.

pub mod auth;
pub mod email;
pub mod orders;
pub mod users;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/admin/me", get(auth::me))
        .route("/api/orders", get(orders::list))
        .route("/api/orders/stats", get(orders::stats))
        .route("/api/orders/by-number/{order_number}", get(orders::by_number))
        .route("/api/orders/{id}/paid", patch(orders::set_paid))
        .route("/api/orders/{id}/delivered", patch(orders::set_delivered))
        .route("/api/admin-users", get(users::list))
}
