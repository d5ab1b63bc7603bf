//! Public order submission endpoints.

use std::collections::HashMap;

use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

use pandi_dorty_core::catalog::{DEPOSIT, PaymentDetails, calculate_payment_details};
use pandi_dorty_core::{Czk, OrderDetails, OrderId, OrderKind, OrderNumber};

use crate::error::AppError;
use crate::models::NewPhoto;
use crate::services::ValidationErrors;
use crate::services::orders::{
    CapacityStatus, ChristmasTastingForm, RegularOrderForm, SubmittedOrder, WeddingTastingForm,
    today, validate_christmas_sweets, validate_christmas_tasting, validate_regular_order,
    validate_wedding_tasting,
};
use crate::state::AppState;

/// Request body limit for the photo upload form.
const MAX_UPLOAD_BYTES: usize = 60 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/submit-order",
            post(submit_order).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/submit-wedding-tasting", post(submit_wedding_tasting))
        .route("/api/wedding-tasting/capacity", get(wedding_tasting_capacity))
        .route("/api/submit-christmas-order", post(submit_christmas_order))
        .route("/api/submit-christmas-tasting", post(submit_christmas_tasting))
}

/// Successful submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub order_id: String,
    pub order_details: OrderSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub order_kind: OrderKind,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Czk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentDetails>,
}

impl SubmitResponse {
    fn new(submitted: SubmittedOrder, message: &'static str) -> Self {
        let SubmittedOrder { order, photo_count } = submitted;
        let kind = order.kind();
        let delivery_date = match &order.details {
            OrderDetails::ChristmasSweets(_) => None,
            details => Some(details.delivery_date()),
        };
        let payment = match kind {
            OrderKind::ChristmasSweets | OrderKind::ChristmasTasting => order
                .total_amount
                .map(|total| calculate_payment_details(total, Czk::from_whole(DEPOSIT))),
            OrderKind::Regular | OrderKind::WeddingTasting => None,
        };

        Self {
            success: true,
            message,
            order_id: order.id.to_string(),
            order_details: OrderSummary {
                id: order.id,
                order_kind: kind,
                customer_name: order.customer.name.as_str().to_owned(),
                delivery_date,
                photo_count: (kind == OrderKind::Regular).then_some(photo_count),
                total_amount: order.total_amount,
                payment,
                order_number: order.order_number,
            },
        }
    }
}

/// Read the multipart order form. Photo problems are returned as field
/// errors so they are reported together with the other fields.
async fn read_order_form(
    mut multipart: Multipart,
) -> Result<(RegularOrderForm, Vec<NewPhoto>, ValidationErrors), AppError> {
    let mut form = RegularOrderForm::default();
    let mut photos = Vec::new();
    let mut errors = ValidationErrors::default();
    let bad_body = |e: axum::extract::multipart::MultipartError| AppError::BadRequest(e.body_text());

    while let Some(field) = multipart.next_field().await.map_err(bad_body)? {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "photos" {
            let file_name = field.file_name().map(ToOwned::to_owned);
            let content_type = field.content_type().map(ToOwned::to_owned);
            let bytes = field.bytes().await.map_err(bad_body)?;
            match NewPhoto::from_upload(file_name.as_deref(), content_type.as_deref(), bytes.to_vec())
            {
                Ok(Some(photo)) => photos.push(photo),
                Ok(None) => {}
                Err(e) => errors.add("photos", e.to_string()),
            }
        } else {
            let value = field.text().await.map_err(bad_body)?;
            form.set_field(&name, value);
        }
    }

    Ok((form, photos, errors))
}

/// Custom cake/dessert order with optional inspiration photos.
#[instrument(skip_all)]
pub async fn submit_order(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, AppError> {
    let (form, photos, photo_errors) = read_order_form(multipart).await?;

    let order = match validate_regular_order(&form, today()) {
        Ok(order) if photo_errors.is_empty() => order,
        Ok(_) => return Err(AppError::Validation(photo_errors)),
        Err(mut errors) => {
            errors.extend(photo_errors);
            return Err(AppError::Validation(errors));
        }
    };

    let submitted = state.orders().submit(order, photos).await?;
    Ok(Json(SubmitResponse::new(
        submitted,
        "Objednávka byla úspěšně odeslána! Brzy vás budeme kontaktovat.",
    )))
}

#[instrument(skip_all)]
pub async fn submit_wedding_tasting(
    State(state): State<AppState>,
    Form(form): Form<WeddingTastingForm>,
) -> Result<Json<SubmitResponse>, AppError> {
    let order = validate_wedding_tasting(&form, today()).map_err(AppError::Validation)?;
    let submitted = state.orders().submit(order, Vec::new()).await?;
    Ok(Json(SubmitResponse::new(
        submitted,
        "Objednávka svatební ochutnávky byla úspěšně odeslána!",
    )))
}

pub async fn wedding_tasting_capacity(
    State(state): State<AppState>,
) -> Result<Json<CapacityStatus>, AppError> {
    Ok(Json(state.orders().wedding_tasting_capacity().await?))
}

/// Christmas sweets; quantities arrive as `quantity_<sweet id>` fields.
#[instrument(skip_all)]
pub async fn submit_christmas_order(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<SubmitResponse>, AppError> {
    let order = validate_christmas_sweets(&fields).map_err(AppError::Validation)?;
    let submitted = state.orders().submit(order, Vec::new()).await?;
    Ok(Json(SubmitResponse::new(
        submitted,
        "Objednávka vánočního cukroví byla úspěšně odeslána!",
    )))
}

#[instrument(skip_all)]
pub async fn submit_christmas_tasting(
    State(state): State<AppState>,
    Form(form): Form<ChristmasTastingForm>,
) -> Result<Json<SubmitResponse>, AppError> {
    let order = validate_christmas_tasting(&form, today()).map_err(AppError::Validation)?;
    let submitted = state.orders().submit(order, Vec::new()).await?;
    Ok(Json(SubmitResponse::new(
        submitted,
        "Objednávka vánoční ochutnávky byla úspěšně odeslána!",
    )))
}
