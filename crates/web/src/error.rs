//! Unified error handling for the HTTP layer.
//!
//! Every error renders as `{"success": false, "error", "code", "fields"?}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::orders::FieldError;
use crate::services::{AuthError, EmailError, OrderError, ValidationErrors};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Submitted fields are invalid.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Deliveries are blocked on the requested date.
    #[error("Date unavailable: {0}")]
    DateUnavailable(NaiveDate),

    /// The order kind is full.
    #[error("Capacity of {max} orders reached")]
    CapacityExceeded { max: u32 },

    /// Admission retries ran out.
    #[error("Service busy")]
    Busy,

    /// Sending email failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Too many failed logins.
    #[error("Account locked until {0}")]
    AccountLocked(DateTime<Utc>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint hit.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound("Záznam nebyl nalezen".to_owned()),
            RepositoryError::Conflict(what) => Self::Conflict(what),
            other => Self::Database(other),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Validation(errors) => Self::Validation(errors),
            OrderError::DateUnavailable(date) => Self::DateUnavailable(date),
            OrderError::CapacityExceeded { max } => Self::CapacityExceeded { max },
            OrderError::Busy => Self::Busy,
            OrderError::Repository(e) => e.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidEmail(_) | AuthError::InvalidCredentials => {
                Self::Unauthorized("Neplatný email nebo heslo".to_owned())
            }
            AuthError::AccountLocked { until } => Self::AccountLocked(until),
            AuthError::UserAlreadyExists => Self::Conflict("admin user already exists".to_owned()),
            AuthError::WeakPassword(msg) => Self::BadRequest(msg),
            AuthError::Repository(e) => e.into(),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_owned()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: String,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::DateUnavailable(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::CapacityExceeded { .. } | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Busy => StatusCode::SERVICE_UNAVAILABLE,
            Self::Email(_) => StatusCode::BAD_GATEWAY,
            Self::AccountLocked(_) => StatusCode::LOCKED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    const fn code(&self) -> &'static str {
        match self {
            Self::Database(_) | Self::Internal(_) => "internal_error",
            Self::Validation(_) => "validation_failed",
            Self::DateUnavailable(_) => "date_unavailable",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::Busy => "try_again_later",
            Self::Email(_) => "email_failed",
            Self::AccountLocked(_) => "account_locked",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Unauthorized(_) => "unauthorized",
            Self::BadRequest(_) => "bad_request",
        }
    }

    /// Message shown to the client. Internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => {
                "Došlo k chybě při zpracování požadavku. Zkuste to prosím později.".to_owned()
            }
            Self::Validation(errors) => errors.to_string(),
            Self::DateUnavailable(_) => {
                "Vybraný termín není dostupný. Zvolte prosím jiný termín.".to_owned()
            }
            Self::CapacityExceeded { max } => format!(
                "Omlouváme se, ale kapacita je již naplněna ({max} objednávek). \
                 Zkuste to prosím později nebo nás kontaktujte přímo."
            ),
            Self::Busy => {
                "Systém je momentálně vytížený. Zkuste to prosím znovu za chvíli.".to_owned()
            }
            Self::Email(e) => format!("Odeslání emailu selhalo: {e}"),
            Self::AccountLocked(until) => format!(
                "Účet je dočasně zablokován do {} UTC",
                until.format("%H:%M")
            ),
            Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if matches!(self, Self::Email(_) | Self::Busy) {
            tracing::warn!(error = %self, "Request failed");
        }

        let fields = match &self {
            Self::Validation(errors) => Some(errors.fields()),
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            error: self.public_message(),
            code: self.code(),
            fields,
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Set the Sentry user context from an admin user ID.
pub fn set_sentry_user(admin_user_id: i32) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order-123".to_string());
        assert_eq!(err.to_string(), "Not found: order-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::CapacityExceeded { max: 15 }),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(AppError::Busy), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            get_status(AppError::Email(EmailError::NotConfigured)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::default();
        errors.add("name", "Jméno je povinné");
        errors.add("phone", "Telefon je povinný");

        let (status, json) = body_json(AppError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "validation_failed");
        assert_eq!(json["error"], "Jméno je povinné, Telefon je povinný");
        assert_eq!(json["fields"][1]["field"], "phone");
    }

    #[tokio::test]
    async fn test_exhausted_retries_ask_to_try_again() {
        let (status, json) = body_json(AppError::from(OrderError::Busy)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], "try_again_later");
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, json) = body_json(AppError::Database(RepositoryError::DataCorruption(
            "order 5: secret detail".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "internal_error");
        assert!(!json["error"].as_str().unwrap().contains("secret"));
        assert!(json.get("fields").is_none());
    }

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            AppError::from(RepositoryError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::Conflict("blocked date already exists".into())),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(OrderError::CapacityExceeded { max: 2 }),
            AppError::CapacityExceeded { max: 2 }
        ));
        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::Unauthorized(_)
        ));
    }
}
