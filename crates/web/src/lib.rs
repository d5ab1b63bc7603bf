//! Pandí Dorty web library.
//!
//! Order forms API, admin API and photo serving. The binary in `main.rs`
//! wires configuration, logging and Sentry around [`app`].
//!
//! # Order admission
//!
//! Orders are inserted through [`services::OrderService`]. Kinds with a
//! capacity (wedding tastings) are admitted inside one transaction that
//! serializes concurrent submissions, so the stored count never exceeds the
//! configured maximum.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::Span;

use state::AppState;

/// Build the application with sessions and request tracing.
pub fn app(state: AppState, session_layer: SessionManagerLayer<PostgresStore>) -> Router {
    routes::routes()
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
