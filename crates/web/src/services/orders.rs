//! Order submission: form validation, admission, photos and notifications.
//!
//! Validation is pure and takes `today` explicitly; every problem is
//! collected as a [`FieldError`] before anything touches the database.

use std::collections::HashMap;
use std::fmt;

use chrono::{Days, NaiveDate, Utc};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use pandi_dorty_core::catalog::{
    CHRISTMAS_MINIMUM_ORDER, CHRISTMAS_SWEETS, SweetsOrderError, build_sweets_order, tasting_total,
};
use pandi_dorty_core::{
    CakeDetails, ChristmasSweets, ChristmasTasting, ContactError, Customer, CustomerName, Czk,
    DessertDetails, Email, EmailError as EmailAddressError, NewOrder, Order, OrderDetails,
    OrderKind, OrderNumber, OrderShapeError, Phone, RegularOrder, WeddingTasting,
};

use crate::db::{AdmissionError, BlockedDateRepository, OrderRepository, PhotoRepository, RepositoryError};
use crate::models::NewPhoto;
use crate::services::email::EmailService;

/// Days between today and the earliest delivery of a custom order.
pub const REGULAR_LEAD_DAYS: u64 = 7;
/// Days between today and a wedding tasting pickup.
pub const WEDDING_TASTING_LEAD_DAYS: u64 = 7;
/// Days between today and the earliest Christmas tasting pickup.
pub const CHRISTMAS_TASTING_LEAD_DAYS: u64 = 3;

/// Insert attempts before giving up on serialization failures.
const MAX_ATTEMPTS: u32 = 3;

const MAX_BOX_QTY: u32 = 20;
const MAX_SWEET_QTY: u32 = 100;

/// Characters of the random order number suffix.
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const SUFFIX_LEN: usize = 6;

// =============================================================================
// Errors
// =============================================================================

/// A problem with one submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every problem found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors from submitting an order.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("delivery date {0} is not available")]
    DateUnavailable(NaiveDate),

    #[error("capacity of {max} orders reached")]
    CapacityExceeded { max: u32 },

    #[error("order could not be stored, retries exhausted")]
    Busy,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// =============================================================================
// Forms
// =============================================================================

/// Fields of the custom cake/dessert order form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegularOrderForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub order_cake: Option<String>,
    pub order_dessert: Option<String>,
    pub size: String,
    pub flavor: String,
    pub dessert_choice: String,
    pub message: String,
}

impl RegularOrderForm {
    /// Set a text field by its form name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "email" => self.email = value,
            "phone" => self.phone = value,
            "date" => self.date = value,
            "orderCake" => self.order_cake = Some(value),
            "orderDessert" => self.order_dessert = Some(value),
            "size" => self.size = value,
            "flavor" => self.flavor = value,
            "dessertChoice" => self.dessert_choice = value,
            "message" => self.message = value,
            _ => {}
        }
    }
}

/// Fields of the wedding tasting form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeddingTastingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cake_box: Option<String>,
    pub sweetbar_box: Option<String>,
}

/// Fields of the Christmas tasting form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChristmasTastingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub cake_box_qty: Option<String>,
    pub sweetbar_box_qty: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Validation
// =============================================================================

/// Checkbox values sent by browsers and the order forms. The forms send
/// `true`; plain HTML checkboxes send `on`.
fn is_checked(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.trim(), "true" | "on" | "1" | "yes"))
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn lead_date(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

fn validate_customer(
    name: &str,
    email: &str,
    phone: &str,
    errors: &mut ValidationErrors,
) -> Option<Customer> {
    let name = CustomerName::parse(name)
        .map_err(|e| {
            let message = match e {
                ContactError::Missing => "Jméno je povinné",
                ContactError::TooShort { .. } => "Jméno musí mít alespoň 2 znaky",
                ContactError::TooLong { .. } | ContactError::InvalidPhoneCharacters => {
                    "Jméno je příliš dlouhé"
                }
            };
            errors.add("name", message);
        })
        .ok();

    let email = Email::parse(email)
        .map_err(|e| {
            let message = match e {
                EmailAddressError::Empty => "Email je povinný",
                _ => "Neplatný email",
            };
            errors.add("email", message);
        })
        .ok();

    let phone = Phone::parse(phone)
        .map_err(|e| {
            let message = match e {
                ContactError::Missing => "Telefon je povinný",
                ContactError::TooShort { .. } => "Telefon musí mít alespoň 9 číslic",
                ContactError::TooLong { .. } => "Telefon je příliš dlouhý",
                ContactError::InvalidPhoneCharacters => "Zadejte platné telefonní číslo",
            };
            errors.add("phone", message);
        })
        .ok();

    Some(Customer {
        name: name?,
        email: email?,
        phone: phone?,
    })
}

fn validate_date(
    value: &str,
    today: NaiveDate,
    lead_days: u64,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        errors.add("date", "Datum dodání je povinné");
        return None;
    }
    let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") else {
        errors.add("date", "Neplatné datum");
        return None;
    };
    if date < lead_date(today, lead_days) {
        errors.add(
            "date",
            format!("Datum dodání musí být alespoň {lead_days} dní od dnes"),
        );
        return None;
    }
    Some(date)
}

fn parse_quantity(
    value: Option<&str>,
    field: &str,
    max: u32,
    errors: &mut ValidationErrors,
) -> u32 {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return 0;
    }
    match value.parse::<u32>() {
        Ok(qty) if qty <= max => qty,
        Ok(_) => {
            errors.add(field, format!("Maximální množství je {max}"));
            0
        }
        Err(_) => {
            errors.add(field, "Zadejte platné množství");
            0
        }
    }
}

fn add_shape_error(error: &OrderShapeError, errors: &mut ValidationErrors) {
    let (field, message) = match error {
        OrderShapeError::NothingOrdered => (
            "orderCake",
            "Vyberte alespoň jednu možnost: Dort nebo Dezert".to_owned(),
        ),
        OrderShapeError::IncompleteCake => (
            "size",
            "Při objednávce dortu jsou povinné údaje o velikosti a příchuti".to_owned(),
        ),
        OrderShapeError::IncompleteDessert => (
            "dessertChoice",
            "Při objednávce dezertů je povinný výběr dezertů".to_owned(),
        ),
        OrderShapeError::NoTastingBox => (
            "cakeBox",
            "Vyberte alespoň jednu ochutnávkovou krabičku (dort nebo sweetbar)".to_owned(),
        ),
        OrderShapeError::NoItems => ("items", "Vyberte alespoň jedno cukroví".to_owned()),
        OrderShapeError::ZeroQuantity(what) => ("items", format!("Neplatné množství: {what}")),
    };
    errors.add(field, message);
}

fn finish(
    customer: Option<Customer>,
    details: Option<OrderDetails>,
    total_amount: Option<Czk>,
    errors: ValidationErrors,
) -> Result<NewOrder, ValidationErrors> {
    match (customer, details) {
        (Some(customer), Some(details)) if errors.is_empty() => Ok(NewOrder {
            customer,
            details,
            total_amount,
        }),
        _ => Err(errors),
    }
}

/// Validate a custom cake/dessert order.
///
/// # Errors
///
/// Returns every field problem found.
pub fn validate_regular_order(
    form: &RegularOrderForm,
    today: NaiveDate,
) -> Result<NewOrder, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let customer = validate_customer(&form.name, &form.email, &form.phone, &mut errors);
    let date = validate_date(&form.date, today, REGULAR_LEAD_DAYS, &mut errors);

    let cake = is_checked(form.order_cake.as_deref()).then(|| CakeDetails {
        size: form.size.trim().to_owned(),
        flavor: form.flavor.trim().to_owned(),
        message: non_blank(&form.message),
    });
    let dessert = is_checked(form.order_dessert.as_deref()).then(|| DessertDetails {
        choice: form.dessert_choice.trim().to_owned(),
    });

    // Shape is checked even when the date is bad so all errors are reported.
    let details = match RegularOrder::new(date.unwrap_or(today), cake, dessert) {
        Ok(order) => date.map(|_| OrderDetails::Regular(order)),
        Err(e) => {
            add_shape_error(&e, &mut errors);
            None
        }
    };

    finish(customer, details, None, errors)
}

/// Validate a wedding tasting order. Pickup is one week from `today`.
///
/// # Errors
///
/// Returns every field problem found.
pub fn validate_wedding_tasting(
    form: &WeddingTastingForm,
    today: NaiveDate,
) -> Result<NewOrder, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let customer = validate_customer(&form.name, &form.email, &form.phone, &mut errors);
    let cake_box = is_checked(form.cake_box.as_deref());
    let sweetbar_box = is_checked(form.sweetbar_box.as_deref());

    let details = WeddingTasting::new(
        lead_date(today, WEDDING_TASTING_LEAD_DAYS),
        cake_box,
        sweetbar_box,
    )
    .map(OrderDetails::WeddingTasting)
    .map_err(|e| add_shape_error(&e, &mut errors))
    .ok();
    let total = tasting_total(u32::from(cake_box), u32::from(sweetbar_box));

    finish(customer, details, Some(total), errors)
}

/// Validate a Christmas sweets order from raw form fields, where each
/// sweet's quantity arrives as `quantity_<sweet id>` in units of 100 g.
///
/// # Errors
///
/// Returns every field problem found.
pub fn validate_christmas_sweets(
    fields: &HashMap<String, String>,
) -> Result<NewOrder, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let field = |name: &str| fields.get(name).map_or("", String::as_str);
    let customer = validate_customer(field("name"), field("email"), field("phone"), &mut errors);

    let quantities: Vec<_> = CHRISTMAS_SWEETS
        .iter()
        .map(|sweet| {
            let name = sweet.quantity_field();
            let qty = parse_quantity(
                fields.get(&name).map(String::as_str),
                &name,
                MAX_SWEET_QTY,
                &mut errors,
            );
            (sweet, qty)
        })
        .collect();

    let sweets: Option<ChristmasSweets> = match build_sweets_order(quantities) {
        Ok(order) => Some(order),
        Err(SweetsOrderError::Shape(e)) => {
            // A bad quantity field already explains an empty order.
            if !errors.fields().iter().any(|e| e.field.starts_with("quantity_")) {
                add_shape_error(&e, &mut errors);
            }
            None
        }
        Err(SweetsOrderError::BelowMinimum { .. }) => {
            errors.add(
                "items",
                format!("Minimální hodnota objednávky je {CHRISTMAS_MINIMUM_ORDER} Kč"),
            );
            None
        }
    };

    let total = sweets.as_ref().map(ChristmasSweets::total);
    finish(
        customer,
        sweets.map(OrderDetails::ChristmasSweets),
        total,
        errors,
    )
}

/// Validate a Christmas tasting order.
///
/// # Errors
///
/// Returns every field problem found.
pub fn validate_christmas_tasting(
    form: &ChristmasTastingForm,
    today: NaiveDate,
) -> Result<NewOrder, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let customer = validate_customer(&form.name, &form.email, &form.phone, &mut errors);
    let date = validate_date(&form.date, today, CHRISTMAS_TASTING_LEAD_DAYS, &mut errors);
    let cake_qty = parse_quantity(
        form.cake_box_qty.as_deref(),
        "cakeBoxQty",
        MAX_BOX_QTY,
        &mut errors,
    );
    let sweetbar_qty = parse_quantity(
        form.sweetbar_box_qty.as_deref(),
        "sweetbarBoxQty",
        MAX_BOX_QTY,
        &mut errors,
    );

    let details = match ChristmasTasting::new(
        date.unwrap_or(today),
        cake_qty,
        sweetbar_qty,
        form.notes.clone(),
    ) {
        Ok(tasting) => date.map(|_| OrderDetails::ChristmasTasting(tasting)),
        Err(e) => {
            if !errors.has_field("cakeBoxQty") && !errors.has_field("sweetbarBoxQty") {
                add_shape_error(&e, &mut errors);
            }
            None
        }
    };

    finish(
        customer,
        details,
        Some(tasting_total(cake_qty, sweetbar_qty)),
        errors,
    )
}

/// Today's date for lead-time checks.
#[must_use]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Generate `<PREFIX>-<unix millis>-<6 random characters>`.
#[must_use]
pub fn generate_order_number(kind: OrderKind) -> OrderNumber {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .filter_map(|_| SUFFIX_ALPHABET.choose(&mut rng))
        .map(|&b| char::from(b))
        .collect();
    OrderNumber::compose(kind, Utc::now().timestamp_millis(), &suffix)
}

// =============================================================================
// Service
// =============================================================================

/// Occupancy of a capacity-limited order kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityStatus {
    pub current: i64,
    pub max: u32,
    pub remaining: i64,
    pub is_available: bool,
}

impl CapacityStatus {
    #[must_use]
    pub fn new(current: i64, max: u32) -> Self {
        let remaining = (i64::from(max) - current).max(0);
        Self {
            current,
            max,
            remaining,
            is_available: remaining > 0,
        }
    }
}

/// A stored order and how many of its photos were saved.
#[derive(Debug, Clone)]
pub struct SubmittedOrder {
    pub order: Order,
    pub photo_count: usize,
}

/// Stores validated orders and sends their notifications.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    email: &'a EmailService,
    wedding_tasting_capacity: u32,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService, wedding_tasting_capacity: u32) -> Self {
        Self {
            pool,
            email,
            wedding_tasting_capacity,
        }
    }

    /// Capacity limit of a kind, if it has one.
    #[must_use]
    pub const fn capacity_of(&self, kind: OrderKind) -> Option<u32> {
        match kind {
            OrderKind::WeddingTasting => Some(self.wedding_tasting_capacity),
            OrderKind::Regular | OrderKind::ChristmasSweets | OrderKind::ChristmasTasting => None,
        }
    }

    /// Current occupancy of the wedding tastings.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the count fails.
    pub async fn wedding_tasting_capacity(&self) -> Result<CapacityStatus, OrderError> {
        let current = OrderRepository::new(self.pool)
            .count_by_kind(OrderKind::WeddingTasting)
            .await?;
        Ok(CapacityStatus::new(current, self.wedding_tasting_capacity))
    }

    /// Store a validated order with its photos, then notify.
    ///
    /// Kinds with a chosen date are refused on blocked dates. Capacity-limited
    /// kinds go through the admission-controlled insert. Photos and emails
    /// never fail an order that was stored.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::DateUnavailable` for a blocked date,
    /// `OrderError::CapacityExceeded` when the kind is full,
    /// `OrderError::Busy` when retries run out, or
    /// `OrderError::Repository` for other database errors.
    #[tracing::instrument(skip_all, fields(kind = %order.kind()))]
    pub async fn submit(
        &self,
        order: NewOrder,
        photos: Vec<NewPhoto>,
    ) -> Result<SubmittedOrder, OrderError> {
        if matches!(
            order.kind(),
            OrderKind::Regular | OrderKind::ChristmasTasting
        ) {
            let date = order.details.delivery_date();
            if BlockedDateRepository::new(self.pool).is_blocked(date).await? {
                tracing::info!(%date, "Order refused for blocked date");
                return Err(OrderError::DateUnavailable(date));
            }
        }

        let stored = self.insert_with_retry(&order).await?;
        tracing::info!(
            order_id = %stored.id,
            order_number = %stored.order_number,
            "Order submitted"
        );

        let photo_count = self.store_photos(&stored, &photos).await;
        self.notify(&stored, &photos).await;

        Ok(SubmittedOrder {
            order: stored,
            photo_count,
        })
    }

    async fn insert_with_retry(&self, order: &NewOrder) -> Result<Order, OrderError> {
        let repo = OrderRepository::new(self.pool);
        let capacity = self.capacity_of(order.kind());

        for attempt in 1..=MAX_ATTEMPTS {
            let number = generate_order_number(order.kind());
            let result = match capacity {
                Some(max) => repo.insert_with_capacity(&number, order, max).await,
                None => repo.insert(&number, order).await.map_err(AdmissionError::from),
            };

            match result {
                Ok(stored) => return Ok(stored),
                Err(AdmissionError::CapacityExceeded { max }) => {
                    tracing::warn!(max, "Order refused, capacity reached");
                    return Err(OrderError::CapacityExceeded { max });
                }
                Err(AdmissionError::Repository(e))
                    if e.is_retryable() || matches!(e, RepositoryError::Conflict(_)) =>
                {
                    tracing::warn!(attempt, error = %e, "Order insert failed, retrying");
                }
                Err(AdmissionError::Repository(e)) => return Err(e.into()),
            }
        }

        tracing::error!(attempts = MAX_ATTEMPTS, "Order insert retries exhausted");
        Err(OrderError::Busy)
    }

    async fn store_photos(&self, order: &Order, photos: &[NewPhoto]) -> usize {
        let repo = PhotoRepository::new(self.pool);
        let mut stored = 0;
        for photo in photos {
            match repo.insert(order.id, photo).await {
                Ok(_) => stored += 1,
                Err(e) => tracing::error!(
                    order_id = %order.id,
                    photo = photo.original_name(),
                    error = %e,
                    "Failed to store order photo"
                ),
            }
        }
        stored
    }

    async fn notify(&self, order: &Order, photos: &[NewPhoto]) {
        if !self.email.is_enabled() {
            tracing::warn!(
                order_number = %order.order_number,
                "Email not configured, skipping order notifications"
            );
            return;
        }
        if let Err(e) = self.email.send_admin_notification(order, photos).await {
            tracing::warn!(order_number = %order.order_number, error = %e, "Admin notification failed");
        }
        if let Err(e) = self.email.send_customer_confirmation(order).await {
            tracing::warn!(order_number = %order.order_number, error = %e, "Customer confirmation failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn today_fixed() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
    }

    fn regular_form() -> RegularOrderForm {
        RegularOrderForm {
            name: "Jana Nováková".into(),
            email: "jana@seznam.cz".into(),
            phone: "+420 777 123 456".into(),
            date: "2026-11-09".into(),
            order_cake: Some("true".into()),
            order_dessert: Some("false".into()),
            size: "20 cm".into(),
            flavor: "vanilka".into(),
            dessert_choice: String::new(),
            message: "  ".into(),
        }
    }

    fn field_names(errors: &ValidationErrors) -> Vec<&str> {
        errors.fields().iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_regular_order() {
        let order = validate_regular_order(&regular_form(), today_fixed()).unwrap();
        let OrderDetails::Regular(details) = &order.details else {
            panic!("expected a regular order");
        };
        assert_eq!(details.delivery_date(), NaiveDate::from_ymd_opt(2026, 11, 9).unwrap());
        assert!(details.cake().unwrap().message.is_none());
        assert!(details.dessert().is_none());
        assert!(order.total_amount.is_none());
    }

    #[test]
    fn test_regular_order_collects_all_errors() {
        let form = RegularOrderForm {
            name: String::new(),
            email: "not-an-email".into(),
            date: "2026-11-08".into(),
            size: String::new(),
            ..regular_form()
        };
        let errors = validate_regular_order(&form, today_fixed()).unwrap_err();
        assert_eq!(field_names(&errors), vec!["name", "email", "date", "size"]);
        assert_eq!(errors.fields()[0].message, "Jméno je povinné");
        assert!(errors.to_string().contains("Neplatný email"));
    }

    #[test]
    fn test_regular_order_needs_cake_or_dessert() {
        let form = RegularOrderForm {
            order_cake: None,
            order_dessert: None,
            ..regular_form()
        };
        let errors = validate_regular_order(&form, today_fixed()).unwrap_err();
        assert_eq!(field_names(&errors), vec!["orderCake"]);
    }

    #[test]
    fn test_regular_order_bad_date_format() {
        let form = RegularOrderForm {
            date: "9.11.2026".into(),
            ..regular_form()
        };
        let errors = validate_regular_order(&form, today_fixed()).unwrap_err();
        assert_eq!(errors.fields()[0].message, "Neplatné datum");
    }

    #[test]
    fn test_regular_form_set_field() {
        let mut form = RegularOrderForm::default();
        form.set_field("dessertChoice", "makronky".into());
        form.set_field("orderDessert", "on".into());
        form.set_field("unknown", "x".into());
        assert_eq!(form.dessert_choice, "makronky");
        assert!(is_checked(form.order_dessert.as_deref()));
    }

    #[test]
    fn test_checkbox_values() {
        for checked in ["true", "on", "1", "yes", " true "] {
            assert!(is_checked(Some(checked)), "{checked}");
        }
        for unchecked in ["false", "off", "0", "", "TRUE"] {
            assert!(!is_checked(Some(unchecked)), "{unchecked}");
        }
        assert!(!is_checked(None));
    }

    #[test]
    fn test_wedding_tasting_date_and_total() {
        let form = WeddingTastingForm {
            name: "Petr Svoboda".into(),
            email: "petr@email.cz".into(),
            phone: "777123456".into(),
            cake_box: Some("true".into()),
            sweetbar_box: None,
        };
        let order = validate_wedding_tasting(&form, today_fixed()).unwrap();
        assert_eq!(
            order.details.delivery_date(),
            NaiveDate::from_ymd_opt(2026, 11, 9).unwrap()
        );
        assert_eq!(order.total_amount, Some(Czk::from_whole(550)));
        assert_eq!(order.kind(), OrderKind::WeddingTasting);
    }

    #[test]
    fn test_wedding_tasting_missing_contact_and_box() {
        let form = WeddingTastingForm {
            phone: "12ab".into(),
            ..WeddingTastingForm::default()
        };
        let errors = validate_wedding_tasting(&form, today_fixed()).unwrap_err();
        assert_eq!(field_names(&errors), vec!["name", "email", "phone", "cakeBox"]);
    }

    fn sweets_fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut fields: HashMap<String, String> = [
            ("name", "Jana Nováková"),
            ("email", "jana@seznam.cz"),
            ("phone", "777 123 456"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        fields.extend(pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())));
        fields
    }

    #[test]
    fn test_christmas_sweets_valid() {
        let fields = sweets_fields(&[("quantity_pernicky", "3"), ("quantity_vosi-hnizda", "2")]);
        let order = validate_christmas_sweets(&fields).unwrap();
        assert_eq!(order.total_amount, Some(Czk::from_whole(640)));
        assert_eq!(
            order.details.delivery_date(),
            ChristmasSweets::placeholder_delivery_date()
        );
    }

    #[test]
    fn test_christmas_sweets_minimum() {
        let fields = sweets_fields(&[("quantity_pernicky", "1")]);
        let errors = validate_christmas_sweets(&fields).unwrap_err();
        assert_eq!(
            errors.fields()[0].message,
            "Minimální hodnota objednávky je 500 Kč"
        );
    }

    #[test]
    fn test_christmas_sweets_bad_quantity() {
        let fields = sweets_fields(&[("quantity_pernicky", "-2")]);
        let errors = validate_christmas_sweets(&fields).unwrap_err();
        assert_eq!(field_names(&errors), vec!["quantity_pernicky"]);
    }

    #[test]
    fn test_christmas_sweets_nothing_selected() {
        let errors = validate_christmas_sweets(&sweets_fields(&[])).unwrap_err();
        assert_eq!(errors.fields()[0].message, "Vyberte alespoň jedno cukroví");
    }

    #[test]
    fn test_christmas_tasting_lead_time() {
        let form = ChristmasTastingForm {
            name: "Jana Nováková".into(),
            email: "jana@seznam.cz".into(),
            phone: "777123456".into(),
            date: "2026-11-05".into(),
            cake_box_qty: Some("2".into()),
            sweetbar_box_qty: Some(String::new()),
            notes: Some("  ".into()),
        };
        let order = validate_christmas_tasting(&form, today_fixed()).unwrap();
        assert_eq!(order.total_amount, Some(Czk::from_whole(1100)));
        let OrderDetails::ChristmasTasting(tasting) = &order.details else {
            panic!("expected a christmas tasting");
        };
        assert!(tasting.notes().is_none());

        let early = ChristmasTastingForm {
            date: "2026-11-04".into(),
            ..form
        };
        let errors = validate_christmas_tasting(&early, today_fixed()).unwrap_err();
        assert_eq!(
            errors.fields()[0].message,
            "Datum dodání musí být alespoň 3 dní od dnes"
        );
    }

    #[test]
    fn test_christmas_tasting_needs_a_box() {
        let form = ChristmasTastingForm {
            name: "Jana Nováková".into(),
            email: "jana@seznam.cz".into(),
            phone: "777123456".into(),
            date: "2026-11-20".into(),
            ..ChristmasTastingForm::default()
        };
        let errors = validate_christmas_tasting(&form, today_fixed()).unwrap_err();
        assert_eq!(field_names(&errors), vec!["cakeBox"]);
    }

    #[test]
    fn test_order_number_format() {
        let number = generate_order_number(OrderKind::WeddingTasting);
        let parts: Vec<&str> = number.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "WEDDING");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_capacity_status() {
        assert_eq!(
            CapacityStatus::new(3, 15),
            CapacityStatus {
                current: 3,
                max: 15,
                remaining: 12,
                is_available: true
            }
        );
        let full = CapacityStatus::new(17, 15);
        assert_eq!(full.remaining, 0);
        assert!(!full.is_available);
    }
}
