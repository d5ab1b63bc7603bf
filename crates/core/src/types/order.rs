//! The order model.
//!
//! Every order shares contact data and milestones; the product-specific part
//! lives in [`OrderDetails`], one variant per [`OrderKind`]. Constructors of
//! the variant structs enforce the shape rules, so an `OrderDetails` value is
//! always internally consistent.

use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::contact::{CustomerName, Phone};
use super::email::Email;
use super::id::{AdminUserId, OrderId};
use super::money::Czk;

// =============================================================================
// OrderKind
// =============================================================================

/// Discriminator selecting which product-specific fields an order carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Regular,
    WeddingTasting,
    ChristmasSweets,
    ChristmasTasting,
}

impl OrderKind {
    pub const ALL: [Self; 4] = [
        Self::Regular,
        Self::WeddingTasting,
        Self::ChristmasSweets,
        Self::ChristmasTasting,
    ];

    /// Value stored in the `order_kind` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::WeddingTasting => "wedding_tasting",
            Self::ChristmasSweets => "christmas_sweets",
            Self::ChristmasTasting => "christmas_tasting",
        }
    }

    /// Prefix of generated order numbers.
    #[must_use]
    pub const fn number_prefix(self) -> &'static str {
        match self {
            Self::Regular => "ORD",
            Self::WeddingTasting => "WEDDING",
            Self::ChristmasSweets => "XMAS",
            Self::ChristmasTasting => "XMASTASTE",
        }
    }

    /// Czech label used in notification emails.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Regular => "Objednávka dortu / dezertu",
            Self::WeddingTasting => "Svatební ochutnávka",
            Self::ChristmasSweets => "Vánoční cukroví",
            Self::ChristmasTasting => "Vánoční ochutnávka",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known [`OrderKind`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown order kind: {0}")]
pub struct UnknownOrderKind(pub String);

impl FromStr for OrderKind {
    type Err = UnknownOrderKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownOrderKind(s.to_owned()))
    }
}

// =============================================================================
// OrderStatus
// =============================================================================

/// Fulfilment status, derived from the order's milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Delivered,
}

impl OrderStatus {
    /// Delivery wins over payment; an order with neither is `Created`.
    #[must_use]
    pub const fn from_milestones(
        paid_at: Option<DateTime<Utc>>,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Self {
        if delivered_at.is_some() {
            Self::Delivered
        } else if paid_at.is_some() {
            Self::Paid
        } else {
            Self::Created
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Paid => "paid",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// OrderNumber
// =============================================================================

/// Human-facing order reference, e.g. `WEDDING-1734000000000-K3D9QZ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Assemble `<PREFIX>-<unix millis>-<suffix>`.
    #[must_use]
    pub fn compose(kind: OrderKind, unix_millis: i64, suffix: &str) -> Self {
        Self(format!("{}-{unix_millis}-{suffix}", kind.number_prefix()))
    }

    /// Wrap a stored order number without re-validating it.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Order details
// =============================================================================

/// Shape violations of an [`OrderDetails`] payload.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderShapeError {
    #[error("order must contain a cake or a dessert")]
    NothingOrdered,
    #[error("cake size and flavor are required")]
    IncompleteCake,
    #[error("dessert choice is required")]
    IncompleteDessert,
    #[error("at least one tasting box must be selected")]
    NoTastingBox,
    #[error("at least one item must be ordered")]
    NoItems,
    #[error("quantity of {0} must be positive")]
    ZeroQuantity(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CakeDetails {
    pub size: String,
    pub flavor: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DessertDetails {
    pub choice: String,
}

/// A custom cake and/or dessert for a chosen date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularOrder {
    delivery_date: NaiveDate,
    cake: Option<CakeDetails>,
    dessert: Option<DessertDetails>,
}

impl RegularOrder {
    /// # Errors
    ///
    /// Fails if neither part is present or a present part has blank fields.
    pub fn new(
        delivery_date: NaiveDate,
        cake: Option<CakeDetails>,
        dessert: Option<DessertDetails>,
    ) -> Result<Self, OrderShapeError> {
        if cake.is_none() && dessert.is_none() {
            return Err(OrderShapeError::NothingOrdered);
        }
        if let Some(c) = &cake
            && (c.size.trim().is_empty() || c.flavor.trim().is_empty())
        {
            return Err(OrderShapeError::IncompleteCake);
        }
        if let Some(d) = &dessert
            && d.choice.trim().is_empty()
        {
            return Err(OrderShapeError::IncompleteDessert);
        }
        Ok(Self {
            delivery_date,
            cake,
            dessert,
        })
    }

    #[must_use]
    pub const fn delivery_date(&self) -> NaiveDate {
        self.delivery_date
    }

    #[must_use]
    pub const fn cake(&self) -> Option<&CakeDetails> {
        self.cake.as_ref()
    }

    #[must_use]
    pub const fn dessert(&self) -> Option<&DessertDetails> {
        self.dessert.as_ref()
    }
}

/// Wedding tasting: one cake box and/or one sweetbar box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeddingTasting {
    delivery_date: NaiveDate,
    cake_box: bool,
    sweetbar_box: bool,
}

impl WeddingTasting {
    /// # Errors
    ///
    /// Fails if no box is selected.
    pub const fn new(
        delivery_date: NaiveDate,
        cake_box: bool,
        sweetbar_box: bool,
    ) -> Result<Self, OrderShapeError> {
        if !cake_box && !sweetbar_box {
            return Err(OrderShapeError::NoTastingBox);
        }
        Ok(Self {
            delivery_date,
            cake_box,
            sweetbar_box,
        })
    }

    #[must_use]
    pub const fn delivery_date(&self) -> NaiveDate {
        self.delivery_date
    }

    #[must_use]
    pub const fn cake_box(&self) -> bool {
        self.cake_box
    }

    #[must_use]
    pub const fn sweetbar_box(&self) -> bool {
        self.sweetbar_box
    }
}

/// One line of a Christmas sweets order, priced per 100 g.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweetLine {
    pub sweet_id: String,
    pub name: String,
    /// Units of 100 g.
    pub quantity: u32,
    pub price_per_100g: Czk,
}

impl SweetLine {
    #[must_use]
    pub fn line_total(&self) -> Czk {
        self.price_per_100g * self.quantity
    }

    #[must_use]
    pub const fn grams(&self) -> u32 {
        self.quantity.saturating_mul(100)
    }
}

/// Christmas sweets picked from the catalog. No delivery date is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChristmasSweets {
    items: Vec<SweetLine>,
}

impl ChristmasSweets {
    /// Delivery date stored for sweets orders; pickup is arranged by phone.
    pub const PLACEHOLDER_DELIVERY_DATE: (i32, u32, u32) = (2099, 12, 31);

    /// # Errors
    ///
    /// Fails when the list is empty or a line has zero quantity.
    pub fn new(items: Vec<SweetLine>) -> Result<Self, OrderShapeError> {
        if items.is_empty() {
            return Err(OrderShapeError::NoItems);
        }
        if let Some(line) = items.iter().find(|l| l.quantity == 0) {
            return Err(OrderShapeError::ZeroQuantity(line.sweet_id.clone()));
        }
        Ok(Self { items })
    }

    #[must_use]
    pub fn items(&self) -> &[SweetLine] {
        &self.items
    }

    #[must_use]
    pub fn total(&self) -> Czk {
        self.items.iter().map(SweetLine::line_total).sum()
    }

    #[must_use]
    pub fn total_grams(&self) -> u32 {
        self.items.iter().map(SweetLine::grams).sum()
    }

    /// One-line summary, e.g. `Vanilkové rohlíčky: 3x100g (300 Kč)`.
    #[must_use]
    pub fn summary(&self) -> String {
        self.items
            .iter()
            .map(|l| format!("{}: {}x100g ({})", l.name, l.quantity, l.line_total()))
            .collect::<Vec<_>>()
            .join("; ")
    }

    #[must_use]
    pub fn placeholder_delivery_date() -> NaiveDate {
        let (y, m, d) = Self::PLACEHOLDER_DELIVERY_DATE;
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MAX)
    }
}

/// Christmas tasting boxes for a chosen date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChristmasTasting {
    delivery_date: NaiveDate,
    cake_box_qty: u32,
    sweetbar_box_qty: u32,
    notes: Option<String>,
}

impl ChristmasTasting {
    /// # Errors
    ///
    /// Fails if both quantities are zero.
    pub fn new(
        delivery_date: NaiveDate,
        cake_box_qty: u32,
        sweetbar_box_qty: u32,
        notes: Option<String>,
    ) -> Result<Self, OrderShapeError> {
        if cake_box_qty == 0 && sweetbar_box_qty == 0 {
            return Err(OrderShapeError::NoTastingBox);
        }
        Ok(Self {
            delivery_date,
            cake_box_qty,
            sweetbar_box_qty,
            notes: notes.filter(|n| !n.trim().is_empty()),
        })
    }

    #[must_use]
    pub const fn delivery_date(&self) -> NaiveDate {
        self.delivery_date
    }

    #[must_use]
    pub const fn cake_box_qty(&self) -> u32 {
        self.cake_box_qty
    }

    #[must_use]
    pub const fn sweetbar_box_qty(&self) -> u32 {
        self.sweetbar_box_qty
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Product-specific payload of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "orderKind", rename_all = "snake_case")]
pub enum OrderDetails {
    Regular(RegularOrder),
    WeddingTasting(WeddingTasting),
    ChristmasSweets(ChristmasSweets),
    ChristmasTasting(ChristmasTasting),
}

impl OrderDetails {
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        match self {
            Self::Regular(_) => OrderKind::Regular,
            Self::WeddingTasting(_) => OrderKind::WeddingTasting,
            Self::ChristmasSweets(_) => OrderKind::ChristmasSweets,
            Self::ChristmasTasting(_) => OrderKind::ChristmasTasting,
        }
    }

    #[must_use]
    pub fn delivery_date(&self) -> NaiveDate {
        match self {
            Self::Regular(o) => o.delivery_date(),
            Self::WeddingTasting(o) => o.delivery_date(),
            Self::ChristmasSweets(_) => ChristmasSweets::placeholder_delivery_date(),
            Self::ChristmasTasting(o) => o.delivery_date(),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// Contact data shared by every order kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: CustomerName,
    pub email: Email,
    pub phone: Phone,
}

/// A validated order that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer: Customer,
    pub details: OrderDetails,
    /// Order total for priced kinds, `None` for custom cakes.
    pub total_amount: Option<Czk>,
}

impl NewOrder {
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        self.details.kind()
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer: Customer,
    #[serde(flatten)]
    pub details: OrderDetails,
    pub total_amount: Option<Czk>,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub updated_by: Option<AdminUserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        self.details.kind()
    }

    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        OrderStatus::from_milestones(self.paid_at, self.delivered_at)
    }

    #[must_use]
    pub const fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        self.delivered_at.is_some()
    }
}
