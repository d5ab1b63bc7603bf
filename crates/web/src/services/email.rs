//! Order notification emails.
//!
//! Plain-text bodies rendered with Askama templates and delivered through the
//! Resend HTTP API. Without an API key the service runs with a disabled
//! transport: every send fails with [`EmailError::NotConfigured`].

use std::sync::Arc;

use askama::Template;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

use pandi_dorty_core::catalog::{DEPOSIT, PaymentDetails, TastingBox, calculate_payment_details};
use pandi_dorty_core::{Czk, Order, OrderDetails, OrderKind};

use crate::config::EmailConfig;
use crate::models::NewPhoto;

/// Resend API endpoint for sending a single email.
pub const RESEND_URL: &str = "https://api.resend.com/emails";

/// Resend's limit on the encoded size of one message's attachments.
const MAX_ATTACHMENT_BYTES: usize = 40 * 1024 * 1024;

#[derive(Template)]
#[template(path = "email/admin_new_order.txt")]
struct AdminNewOrderEmail<'a> {
    order_number: &'a str,
    kind_label: &'a str,
    customer_name: &'a str,
    customer_email: &'a str,
    customer_phone: &'a str,
    delivery_date: Option<String>,
    lines: Vec<String>,
    total: Option<Czk>,
    photo_names: Vec<&'a str>,
    admin_url: String,
}

#[derive(Template)]
#[template(path = "email/customer_confirmation.txt")]
struct CustomerConfirmationEmail<'a> {
    customer_name: &'a str,
    order_number: &'a str,
    kind_label: &'a str,
    delivery_date: Option<String>,
    lines: Vec<String>,
    total: Option<Czk>,
    payment: Option<PaymentDetails>,
}

#[derive(Template)]
#[template(path = "email/test.txt")]
struct TestEmail<'a> {
    sent_at: String,
    from_address: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// No API key configured.
    #[error("email delivery is not configured")]
    NotConfigured,

    /// Nobody to send to.
    #[error("no recipients")]
    NoRecipients,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resend rejected the message.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API key cannot be used as a header value.
    #[error("invalid API key format: {0}")]
    InvalidApiKey(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<ResendAttachment<'a>>,
}

/// A file attached to a message, base64 encoded.
#[derive(Debug, PartialEq, Eq, Serialize)]
struct ResendAttachment<'a> {
    filename: &'a str,
    content: String,
}

/// Encode photos as attachments. Photos that would push the message over
/// `budget` encoded bytes are left out.
fn attachments(photos: &[NewPhoto], budget: usize) -> Vec<ResendAttachment<'_>> {
    let mut used = 0;
    let mut encoded = Vec::with_capacity(photos.len());
    for photo in photos {
        let content = BASE64.encode(photo.bytes());
        if used + content.len() > budget {
            tracing::warn!(
                photo = photo.original_name(),
                "Photo too large to attach, skipping"
            );
            continue;
        }
        used += content.len();
        encoded.push(ResendAttachment {
            filename: photo.original_name(),
            content,
        });
    }
    encoded
}

/// Resend API client.
#[derive(Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ResendClient {
    /// Create a client authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(api_key: &SecretString) -> Result<Self, EmailError> {
        Self::with_endpoint(api_key, RESEND_URL)
    }

    /// Create a client posting to `endpoint` instead of the Resend API.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn with_endpoint(
        api_key: &SecretString,
        endpoint: impl Into<String>,
    ) -> Result<Self, EmailError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| EmailError::InvalidApiKey(e.to_string()))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn send(&self, email: &ResendEmail<'_>) -> Result<(), EmailError> {
        let response = self.client.post(&self.endpoint).json(email).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// How messages leave the service.
#[derive(Clone)]
pub enum MailTransport {
    Resend(ResendClient),
    Disabled,
}

/// Email service for order notifications.
#[derive(Clone)]
pub struct EmailService {
    inner: Arc<EmailServiceInner>,
}

struct EmailServiceInner {
    transport: MailTransport,
    from_address: String,
    admin_recipients: Vec<String>,
    admin_url: String,
}

impl EmailService {
    /// Create the service from configuration; without an API key the
    /// transport is disabled.
    ///
    /// # Errors
    ///
    /// Returns error if the Resend client cannot be built.
    pub fn new(config: &EmailConfig, base_url: &str) -> Result<Self, EmailError> {
        let transport = match &config.resend_api_key {
            Some(key) => MailTransport::Resend(ResendClient::new(key)?),
            None => MailTransport::Disabled,
        };
        Ok(Self::with_transport(transport, config, base_url))
    }

    #[must_use]
    pub fn with_transport(transport: MailTransport, config: &EmailConfig, base_url: &str) -> Self {
        Self {
            inner: Arc::new(EmailServiceInner {
                transport,
                from_address: config.from_address.clone(),
                admin_recipients: config.admin_recipients.clone(),
                admin_url: base_url.trim_end_matches('/').to_owned(),
            }),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self.inner.transport, MailTransport::Resend(_))
    }

    /// Send a test message to `to`.
    ///
    /// # Errors
    ///
    /// Returns error if delivery is disabled or fails.
    pub async fn send_test(&self, to: &str) -> Result<(), EmailError> {
        let text = TestEmail {
            sent_at: Utc::now().format("%d.%m.%Y %H:%M:%S UTC").to_string(),
            from_address: &self.inner.from_address,
        }
        .render()?;
        self.send(
            &[to.to_owned()],
            "Testovací e-mail - Pandí Dorty",
            &text,
            Vec::new(),
        )
        .await
    }

    /// Notify the admins about a new order, attaching its photos.
    ///
    /// # Errors
    ///
    /// Returns error if delivery is disabled, no admin recipients are
    /// configured, or sending fails.
    pub async fn send_admin_notification(
        &self,
        order: &Order,
        photos: &[NewPhoto],
    ) -> Result<(), EmailError> {
        if self.inner.admin_recipients.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        let (subject, text) = self.admin_notification(order, photos)?;
        self.send(
            &self.inner.admin_recipients,
            &subject,
            &text,
            attachments(photos, MAX_ATTACHMENT_BYTES),
        )
        .await
    }

    /// Send the customer their order confirmation.
    ///
    /// # Errors
    ///
    /// Returns error if delivery is disabled or sending fails.
    pub async fn send_customer_confirmation(&self, order: &Order) -> Result<(), EmailError> {
        let (subject, text) = customer_confirmation(order)?;
        self.send(
            &[order.customer.email.as_str().to_owned()],
            &subject,
            &text,
            Vec::new(),
        )
        .await
    }

    fn admin_notification(
        &self,
        order: &Order,
        photos: &[NewPhoto],
    ) -> Result<(String, String), EmailError> {
        let subject = format!(
            "Nová objednávka {} - {}",
            order.order_number,
            order.kind().label()
        );
        let text = AdminNewOrderEmail {
            order_number: order.order_number.as_str(),
            kind_label: order.kind().label(),
            customer_name: order.customer.name.as_str(),
            customer_email: order.customer.email.as_str(),
            customer_phone: order.customer.phone.as_str(),
            delivery_date: display_date(order),
            lines: order_lines(&order.details),
            total: order.total_amount,
            photo_names: photos.iter().map(NewPhoto::original_name).collect(),
            admin_url: format!(
                "{}/api/orders/by-number/{}",
                self.inner.admin_url, order.order_number
            ),
        }
        .render()?;
        Ok((subject, text))
    }

    async fn send(
        &self,
        to: &[String],
        subject: &str,
        text: &str,
        attachments: Vec<ResendAttachment<'_>>,
    ) -> Result<(), EmailError> {
        let MailTransport::Resend(client) = &self.inner.transport else {
            return Err(EmailError::NotConfigured);
        };
        if to.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        client
            .send(&ResendEmail {
                from: &self.inner.from_address,
                to,
                subject,
                text,
                attachments,
            })
            .await?;

        tracing::info!(to = ?to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

fn customer_confirmation(order: &Order) -> Result<(String, String), EmailError> {
    let subject = format!(
        "Potvrzení objednávky {} - Pandí Dorty",
        order.order_number
    );
    let payment = match order.kind() {
        OrderKind::ChristmasSweets | OrderKind::ChristmasTasting => order
            .total_amount
            .map(|total| calculate_payment_details(total, Czk::from_whole(DEPOSIT))),
        OrderKind::Regular | OrderKind::WeddingTasting => None,
    };
    let text = CustomerConfirmationEmail {
        customer_name: order.customer.name.as_str(),
        order_number: order.order_number.as_str(),
        kind_label: order.kind().label(),
        delivery_date: display_date(order),
        lines: order_lines(&order.details),
        total: order.total_amount,
        payment,
    }
    .render()?;
    Ok((subject, text))
}

/// Delivery date as shown to people; sweets orders have no real date.
fn display_date(order: &Order) -> Option<String> {
    match &order.details {
        OrderDetails::ChristmasSweets(_) => None,
        details => Some(details.delivery_date().format("%d.%m.%Y").to_string()),
    }
}

/// One human-readable line per ordered item.
fn order_lines(details: &OrderDetails) -> Vec<String> {
    let mut lines = Vec::new();
    match details {
        OrderDetails::Regular(o) => {
            if let Some(cake) = o.cake() {
                lines.push(format!("Dort: {}, příchuť {}", cake.size, cake.flavor));
                if let Some(message) = &cake.message {
                    lines.push(format!("Nápis: {message}"));
                }
            }
            if let Some(dessert) = o.dessert() {
                lines.push(format!("Dezerty: {}", dessert.choice));
            }
        }
        OrderDetails::WeddingTasting(o) => {
            for (selected, tasting_box) in [
                (o.cake_box(), TastingBox::Cake),
                (o.sweetbar_box(), TastingBox::Sweetbar),
            ] {
                if selected {
                    lines.push(tasting_box.name().to_owned());
                }
            }
        }
        OrderDetails::ChristmasSweets(o) => {
            lines.extend(o.items().iter().map(|line| {
                format!(
                    "{}: {} g ({})",
                    line.name,
                    line.grams(),
                    line.line_total()
                )
            }));
        }
        OrderDetails::ChristmasTasting(o) => {
            for (qty, tasting_box) in [
                (o.cake_box_qty(), TastingBox::Cake),
                (o.sweetbar_box_qty(), TastingBox::Sweetbar),
            ] {
                if qty > 0 {
                    lines.push(format!(
                        "{}: {qty}x ({})",
                        tasting_box.name(),
                        tasting_box.price() * qty
                    ));
                }
            }
            if let Some(notes) = o.notes() {
                lines.push(format!("Poznámka: {notes}"));
            }
        }
    }
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use pandi_dorty_core::catalog::{build_sweets_order, find_sweet};
    use pandi_dorty_core::{
        CakeDetails, ChristmasTasting, Customer, CustomerName, Email, OrderId, OrderNumber, Phone,
        RegularOrder, WeddingTasting,
    };

    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            resend_api_key: None,
            from_address: "Pandí Dorty <objednavky@pandidorty.cz>".into(),
            admin_recipients: vec!["pandidorty@gmail.com".into()],
        }
    }

    fn order(details: OrderDetails, total: Option<Czk>) -> Order {
        Order {
            id: OrderId::new(7),
            order_number: OrderNumber::from_stored("XMAS-1700000000000-ABC234".into()),
            customer: Customer {
                name: CustomerName::parse("Jana Nováková").unwrap(),
                email: Email::parse("jana@seznam.cz").unwrap(),
                phone: Phone::parse("+420 777 123 456").unwrap(),
            },
            details,
            total_amount: total,
            paid_at: None,
            delivered_at: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 20).unwrap()
    }

    #[test]
    fn test_regular_order_lines() {
        let details = OrderDetails::Regular(
            RegularOrder::new(
                date(),
                Some(CakeDetails {
                    size: "20 cm".into(),
                    flavor: "malina".into(),
                    message: Some("Pro Aničku".into()),
                }),
                None,
            )
            .unwrap(),
        );
        assert_eq!(
            order_lines(&details),
            vec!["Dort: 20 cm, příchuť malina", "Nápis: Pro Aničku"]
        );
    }

    #[test]
    fn test_wedding_tasting_lines() {
        let details = OrderDetails::WeddingTasting(WeddingTasting::new(date(), false, true).unwrap());
        assert_eq!(order_lines(&details), vec!["Ochutnávka sweetbaru"]);
    }

    #[test]
    fn test_sweets_confirmation_includes_deposit() {
        let sweets =
            build_sweets_order([(find_sweet("pernicky").unwrap(), 10)]).unwrap();
        let total = sweets.total();
        let order = order(OrderDetails::ChristmasSweets(sweets), Some(total));

        let (subject, text) = customer_confirmation(&order).unwrap();
        assert!(subject.contains("XMAS-1700000000000-ABC234"));
        assert!(text.contains("Perníčky: 1000 g (1200 Kč)"));
        assert!(text.contains("zálohu 450 Kč"));
        assert!(text.contains("750 Kč"));
        assert!(!text.contains("Požadované datum"));
    }

    #[test]
    fn test_small_tasting_pays_in_full() {
        let details = OrderDetails::ChristmasTasting(
            ChristmasTasting::new(date(), 1, 0, None).unwrap(),
        );
        let order = order(details, Some(Czk::from_whole(400)));
        let (_, text) = customer_confirmation(&order).unwrap();
        assert!(text.contains("částku 400 Kč"));
        assert!(text.contains("20.12.2026"));
    }

    #[test]
    fn test_admin_notification_links_order() {
        let service = EmailService::with_transport(
            MailTransport::Disabled,
            &config(),
            "https://objednavky.pandidorty.cz/",
        );
        let details = OrderDetails::WeddingTasting(WeddingTasting::new(date(), true, true).unwrap());
        let (subject, text) = service
            .admin_notification(&order(details, Some(Czk::from_whole(1300))), &[])
            .unwrap();
        assert!(subject.starts_with("Nová objednávka"));
        assert!(text.contains(
            "https://objednavky.pandidorty.cz/api/orders/by-number/XMAS-1700000000000-ABC234"
        ));
        assert!(text.contains("jana@seznam.cz"));
        assert!(!text.contains("Přiložené fotografie"));
    }

    fn photo(name: &str, bytes: Vec<u8>) -> NewPhoto {
        NewPhoto::from_upload(Some(name), Some("image/png"), bytes)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_admin_notification_lists_photos() {
        let service =
            EmailService::with_transport(MailTransport::Disabled, &config(), "http://localhost");
        let details = OrderDetails::Regular(
            RegularOrder::new(
                date(),
                Some(CakeDetails {
                    size: "20 cm".into(),
                    flavor: "malina".into(),
                    message: None,
                }),
                None,
            )
            .unwrap(),
        );
        let photos = [photo("dort.png", vec![1]), photo("vzor.png", vec![2])];
        let (_, text) = service
            .admin_notification(&order(details, None), &photos)
            .unwrap();
        assert!(text.contains("Přiložené fotografie: dort.png, vzor.png"));
    }

    #[test]
    fn test_attachments_are_base64() {
        let photos = [photo("dort.png", vec![137, 80, 78, 71])];
        assert_eq!(
            attachments(&photos, MAX_ATTACHMENT_BYTES),
            vec![ResendAttachment {
                filename: "dort.png",
                content: "iVBORw==".into(),
            }]
        );
    }

    #[test]
    fn test_attachments_over_budget_are_skipped() {
        let photos = [
            photo("velka.png", vec![0; 30]),
            photo("mala.png", vec![0; 3]),
        ];
        let names: Vec<_> = attachments(&photos, 20)
            .into_iter()
            .map(|a| a.filename)
            .collect();
        assert_eq!(names, vec!["mala.png"]);
    }

    #[test]
    fn test_payload_omits_empty_attachments() {
        let to = ["jana@seznam.cz".to_owned()];
        let email = ResendEmail {
            from: "Pandí Dorty <objednavky@pandidorty.cz>",
            to: &to,
            subject: "Test",
            text: "Ahoj",
            attachments: Vec::new(),
        };
        let json = serde_json::to_value(&email).unwrap();
        assert!(json.get("attachments").is_none());
        assert_eq!(json["to"][0], "jana@seznam.cz");
    }

    #[tokio::test]
    async fn test_rejected_send_reports_api_error() {
        use axum::{Router, http::StatusCode, routing::post};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route(
            "/emails",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "invalid from address") }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await });

        let client = ResendClient::with_endpoint(
            &SecretString::from("re_test_key"),
            format!("http://{addr}/emails"),
        )
        .unwrap();
        let service =
            EmailService::with_transport(MailTransport::Resend(client), &config(), "http://localhost");
        assert!(service.is_enabled());

        match service.send_test("jana@seznam.cz").await {
            Err(EmailError::Api { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "invalid from address");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disabled_transport_reports_not_configured() {
        let service = EmailService::new(&config(), "http://localhost:3000").unwrap();
        assert!(!service.is_enabled());
        assert!(matches!(
            service.send_test("jana@seznam.cz").await,
            Err(EmailError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_missing_admin_recipients() {
        let config = EmailConfig {
            admin_recipients: Vec::new(),
            ..config()
        };
        let service = EmailService::new(&config, "http://localhost:3000").unwrap();
        let details = OrderDetails::WeddingTasting(WeddingTasting::new(date(), true, false).unwrap());
        assert!(matches!(
            service
                .send_admin_notification(&order(details, None), &[])
                .await,
            Err(EmailError::NoRecipients)
        ));
    }
}
