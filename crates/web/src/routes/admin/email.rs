//! Test email endpoint.

use axum::{Json, body::Bytes, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use pandi_dorty_core::Email;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TestEmailRequest {
    /// Recipient; defaults to the logged-in admin.
    #[serde(default)]
    pub to: Option<String>,
}

impl TestEmailRequest {
    /// An empty body is the same as `{}`.
    fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))
    }

    fn recipient(self, fallback: &Email) -> Result<Email, AppError> {
        match self.to.filter(|to| !to.trim().is_empty()) {
            Some(to) => {
                Email::parse(&to).map_err(|_| AppError::BadRequest(format!("Neplatný email: {to}")))
            }
            None => Ok(fallback.clone()),
        }
    }
}

/// Send a test email to check the mail configuration.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn send_test(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let to = TestEmailRequest::from_body(&body)?.recipient(&admin.email)?;

    state.email().send_test(to.as_str()).await?;
    tracing::info!(to = %to, "Test email sent");

    Ok(Json(json!({
        "success": true,
        "message": format!("Testovací email odeslán na {to}"),
    })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn admin_email() -> Email {
        Email::parse("admin@pandidorty.cz").unwrap()
    }

    #[test]
    fn test_empty_body_defaults_to_admin() {
        let to = TestEmailRequest::from_body(b"").unwrap().recipient(&admin_email());
        assert_eq!(to.unwrap(), admin_email());

        let to = TestEmailRequest::from_body(br#"{"to": "  "}"#)
            .unwrap()
            .recipient(&admin_email());
        assert_eq!(to.unwrap(), admin_email());
    }

    #[test]
    fn test_explicit_recipient() {
        let to = TestEmailRequest::from_body(br#"{"to": "jana@seznam.cz"}"#)
            .unwrap()
            .recipient(&admin_email())
            .unwrap();
        assert_eq!(to.as_str(), "jana@seznam.cz");
    }

    #[test]
    fn test_bad_input_is_rejected() {
        assert!(matches!(
            TestEmailRequest::from_body(b"{not json"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            TestEmailRequest::from_body(br#"{"to": "nope"}"#)
                .unwrap()
                .recipient(&admin_email()),
            Err(AppError::BadRequest(_))
        ));
    }
}
