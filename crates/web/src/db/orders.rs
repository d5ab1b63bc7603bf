//! Order repository, including the capacity-checked insert.
//!
//! All order kinds live in `bakery.orders`. Each kind writes only its own
//! columns; everything else stays NULL (or `false` for the two regular-order
//! flags). Reading a row back rebuilds the [`OrderDetails`] variant for its
//! `order_kind` and rejects rows whose columns contradict the kind.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use thiserror::Error;

use pandi_dorty_core::{
    AdminUserId, CakeDetails, ChristmasSweets, ChristmasTasting, Customer, CustomerName, Czk,
    DessertDetails, Email, NewOrder, Order, OrderDetails, OrderId, OrderKind, OrderNumber,
    OrderShapeError, OrderStatus, Phone, RegularOrder, SweetLine, WeddingTasting,
};

use super::{RepositoryError, conflict_on_unique};

/// Columns selected for every order query.
const ORDER_COLUMNS: &str = "id, order_number, customer_name, customer_email, customer_phone, \
    delivery_date, order_kind, order_cake, order_dessert, cake_size, cake_flavor, cake_message, \
    dessert_choice, tasting_cake_box_qty, tasting_sweetbar_box_qty, tasting_notes, sweet_items, \
    total_amount, notes, paid_at, delivered_at, updated_by_id, created_at, updated_at";

// =============================================================================
// Errors
// =============================================================================

/// Outcome of a capacity-checked insert that did not produce an order.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The kind already holds `max` committed orders.
    #[error("capacity of {max} orders reached")]
    CapacityExceeded { max: u32 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for AdmissionError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    delivery_date: NaiveDate,
    order_kind: String,
    order_cake: bool,
    order_dessert: bool,
    cake_size: Option<String>,
    cake_flavor: Option<String>,
    cake_message: Option<String>,
    dessert_choice: Option<String>,
    tasting_cake_box_qty: Option<i32>,
    tasting_sweetbar_box_qty: Option<i32>,
    tasting_notes: Option<String>,
    sweet_items: Option<Json<Vec<SweetLine>>>,
    total_amount: Option<Decimal>,
    /// Text summary of sweet lines; only sweets orders write it.
    notes: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    updated_by_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn corrupt(&self, what: impl std::fmt::Display) -> RepositoryError {
        RepositoryError::DataCorruption(format!("order {}: {what}", self.order_number))
    }

    const fn regular_columns_empty(&self) -> bool {
        !self.order_cake
            && !self.order_dessert
            && self.cake_size.is_none()
            && self.cake_flavor.is_none()
            && self.cake_message.is_none()
            && self.dessert_choice.is_none()
    }

    const fn tasting_columns_empty(&self) -> bool {
        self.tasting_cake_box_qty.is_none()
            && self.tasting_sweetbar_box_qty.is_none()
            && self.tasting_notes.is_none()
    }

    fn box_qty(&self, value: Option<i32>, column: &str) -> Result<u32, RepositoryError> {
        let qty = value.ok_or_else(|| self.corrupt(format!("{column} is NULL")))?;
        u32::try_from(qty).map_err(|_| self.corrupt(format!("{column} is negative")))
    }

    fn details(&self) -> Result<OrderDetails, RepositoryError> {
        let kind: OrderKind = self.order_kind.parse().map_err(|e| self.corrupt(e))?;
        let shape = |e: OrderShapeError| self.corrupt(e);

        match kind {
            OrderKind::Regular => {
                if !self.tasting_columns_empty() || self.sweet_items.is_some() || self.notes.is_some()
                {
                    return Err(self.corrupt("regular order carries tasting or sweets data"));
                }
                let cake = self.order_cake.then(|| CakeDetails {
                    size: self.cake_size.clone().unwrap_or_default(),
                    flavor: self.cake_flavor.clone().unwrap_or_default(),
                    message: self.cake_message.clone(),
                });
                let dessert = self.order_dessert.then(|| DessertDetails {
                    choice: self.dessert_choice.clone().unwrap_or_default(),
                });
                RegularOrder::new(self.delivery_date, cake, dessert)
                    .map(OrderDetails::Regular)
                    .map_err(shape)
            }
            OrderKind::WeddingTasting => {
                if !self.regular_columns_empty()
                    || self.sweet_items.is_some()
                    || self.tasting_notes.is_some()
                    || self.notes.is_some()
                {
                    return Err(self.corrupt("wedding tasting carries data of another kind"));
                }
                let cake = self.box_qty(self.tasting_cake_box_qty, "tasting_cake_box_qty")?;
                let sweetbar =
                    self.box_qty(self.tasting_sweetbar_box_qty, "tasting_sweetbar_box_qty")?;
                WeddingTasting::new(self.delivery_date, cake > 0, sweetbar > 0)
                    .map(OrderDetails::WeddingTasting)
                    .map_err(shape)
            }
            OrderKind::ChristmasSweets => {
                if !self.regular_columns_empty() || !self.tasting_columns_empty() {
                    return Err(self.corrupt("sweets order carries data of another kind"));
                }
                let Some(Json(items)) = &self.sweet_items else {
                    return Err(self.corrupt("sweet_items is NULL"));
                };
                ChristmasSweets::new(items.clone())
                    .map(OrderDetails::ChristmasSweets)
                    .map_err(shape)
            }
            OrderKind::ChristmasTasting => {
                if !self.regular_columns_empty() || self.sweet_items.is_some() || self.notes.is_some()
                {
                    return Err(self.corrupt("christmas tasting carries data of another kind"));
                }
                let cake = self.box_qty(self.tasting_cake_box_qty, "tasting_cake_box_qty")?;
                let sweetbar =
                    self.box_qty(self.tasting_sweetbar_box_qty, "tasting_sweetbar_box_qty")?;
                ChristmasTasting::new(
                    self.delivery_date,
                    cake,
                    sweetbar,
                    self.tasting_notes.clone(),
                )
                .map(OrderDetails::ChristmasTasting)
                .map_err(shape)
            }
        }
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let details = row.details()?;
        let customer = Customer {
            name: CustomerName::parse(&row.customer_name)
                .map_err(|e| row.corrupt(format!("invalid customer name: {e}")))?,
            email: Email::parse(&row.customer_email)
                .map_err(|e| row.corrupt(format!("invalid email in database: {e}")))?,
            phone: Phone::parse(&row.customer_phone)
                .map_err(|e| row.corrupt(format!("invalid phone in database: {e}")))?,
        };

        Ok(Self {
            id: OrderId::new(row.id),
            order_number: OrderNumber::from_stored(row.order_number),
            customer,
            details,
            total_amount: row.total_amount.map(Czk::new),
            paid_at: row.paid_at,
            delivered_at: row.delivered_at,
            updated_by: row.updated_by_id.map(AdminUserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Kind-specific column values for an insert.
#[derive(Debug, Default, PartialEq)]
struct OrderColumns {
    order_cake: bool,
    order_dessert: bool,
    cake_size: Option<String>,
    cake_flavor: Option<String>,
    cake_message: Option<String>,
    dessert_choice: Option<String>,
    tasting_cake_box_qty: Option<i32>,
    tasting_sweetbar_box_qty: Option<i32>,
    tasting_notes: Option<String>,
    sweet_items: Option<Json<Vec<SweetLine>>>,
    notes: Option<String>,
}

fn qty_column(qty: u32) -> Option<i32> {
    Some(i32::try_from(qty).unwrap_or(i32::MAX))
}

impl From<&OrderDetails> for OrderColumns {
    fn from(details: &OrderDetails) -> Self {
        match details {
            OrderDetails::Regular(o) => Self {
                order_cake: o.cake().is_some(),
                order_dessert: o.dessert().is_some(),
                cake_size: o.cake().map(|c| c.size.clone()),
                cake_flavor: o.cake().map(|c| c.flavor.clone()),
                cake_message: o.cake().and_then(|c| c.message.clone()),
                dessert_choice: o.dessert().map(|d| d.choice.clone()),
                ..Self::default()
            },
            OrderDetails::WeddingTasting(o) => Self {
                tasting_cake_box_qty: qty_column(u32::from(o.cake_box())),
                tasting_sweetbar_box_qty: qty_column(u32::from(o.sweetbar_box())),
                ..Self::default()
            },
            OrderDetails::ChristmasSweets(o) => Self {
                sweet_items: Some(Json(o.items().to_vec())),
                notes: Some(o.summary()),
                ..Self::default()
            },
            OrderDetails::ChristmasTasting(o) => Self {
                tasting_cake_box_qty: qty_column(o.cake_box_qty()),
                tasting_sweetbar_box_qty: qty_column(o.sweetbar_box_qty()),
                tasting_notes: o.notes().map(ToOwned::to_owned),
                ..Self::default()
            },
        }
    }
}

async fn insert_row(
    conn: &mut PgConnection,
    number: &OrderNumber,
    order: &NewOrder,
) -> Result<OrderRow, RepositoryError> {
    let columns = OrderColumns::from(&order.details);
    let sql = format!(
        r"
        INSERT INTO bakery.orders (
            order_number, customer_name, customer_email, customer_phone,
            delivery_date, order_kind, order_cake, order_dessert,
            cake_size, cake_flavor, cake_message, dessert_choice,
            tasting_cake_box_qty, tasting_sweetbar_box_qty, tasting_notes,
            sweet_items, total_amount, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        RETURNING {ORDER_COLUMNS}
        "
    );

    sqlx::query_as::<_, OrderRow>(&sql)
        .bind(number.as_str())
        .bind(order.customer.name.as_str())
        .bind(order.customer.email.as_str())
        .bind(order.customer.phone.as_str())
        .bind(order.details.delivery_date())
        .bind(order.kind().as_str())
        .bind(columns.order_cake)
        .bind(columns.order_dessert)
        .bind(columns.cake_size)
        .bind(columns.cake_flavor)
        .bind(columns.cake_message)
        .bind(columns.dessert_choice)
        .bind(columns.tasting_cake_box_qty)
        .bind(columns.tasting_sweetbar_box_qty)
        .bind(columns.tasting_notes)
        .bind(columns.sweet_items)
        .bind(order.total_amount.map(|t| t.amount()))
        .bind(columns.notes)
        .fetch_one(conn)
        .await
        .map_err(|e| conflict_on_unique(e, "order number"))
}

// =============================================================================
// Listing
// =============================================================================

/// Which orders an admin listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    /// Unknown values fall back to `All`.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("created") => Self::Only(OrderStatus::Created),
            Some("paid") => Self::Only(OrderStatus::Paid),
            Some("delivered") => Self::Only(OrderStatus::Delivered),
            _ => Self::All,
        }
    }

    const fn sql_condition(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Only(OrderStatus::Created) => " AND paid_at IS NULL AND delivered_at IS NULL",
            Self::Only(OrderStatus::Paid) => " AND paid_at IS NOT NULL AND delivered_at IS NULL",
            Self::Only(OrderStatus::Delivered) => " AND delivered_at IS NOT NULL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    DeliveryDate,
    OrderNumber,
    CustomerName,
    Status,
}

impl SortField {
    /// Unknown values fall back to `CreatedAt`.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("deliveryDate") => Self::DeliveryDate,
            Some("orderNumber") => Self::OrderNumber,
            Some("customerName") => Self::CustomerName,
            Some("status") => Self::Status,
            _ => Self::CreatedAt,
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::DeliveryDate => "delivery_date",
            Self::OrderNumber => "order_number",
            Self::CustomerName => "customer_name",
            Self::Status => {
                "CASE WHEN delivered_at IS NOT NULL THEN 2 WHEN paid_at IS NOT NULL THEN 1 ELSE 0 END"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filters, ordering and paging of the admin order list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListQuery {
    pub status: StatusFilter,
    pub sort: SortField,
    pub direction: SortDirection,
    pub search: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl OrderListQuery {
    pub const DEFAULT_PER_PAGE: u32 = 20;
    pub const MAX_PER_PAGE: u32 = 100;

    /// Clamp paging values into range and drop a blank search.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.per_page = self.per_page.clamp(1, Self::MAX_PER_PAGE);
        self.search = self
            .search
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        self
    }

    fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    /// `ILIKE` pattern with the wildcard characters of the input escaped.
    fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|s| {
            let escaped = s
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
    }

    fn push_filters(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(self.status.sql_condition());
        if let Some(pattern) = self.search_pattern() {
            qb.push(" AND (order_number ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

impl Default for OrderListQuery {
    fn default() -> Self {
        Self {
            status: StatusFilter::All,
            sort: SortField::CreatedAt,
            direction: SortDirection::Desc,
            search: None,
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// Order counts per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderStats {
    pub created: i64,
    pub paid: i64,
    pub delivered: i64,
    pub total: i64,
}

/// Order milestones an admin can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Paid,
    Delivered,
}

impl Milestone {
    const fn column(self) -> &'static str {
        match self {
            Self::Paid => "paid_at",
            Self::Delivered => "delivered_at",
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order of a kind without a capacity limit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &self,
        number: &OrderNumber,
        order: &NewOrder,
    ) -> Result<Order, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, number, order).await?.try_into()
    }

    /// Insert an order only while fewer than `max_capacity` orders of its
    /// kind exist.
    ///
    /// Within one transaction: take an advisory lock on the kind (which also
    /// covers the case of no existing rows), lock every existing row of the
    /// kind, count them and insert only when there is room. Concurrent
    /// callers for the same kind serialize on the lock, so the count they see
    /// includes every committed admission.
    ///
    /// # Errors
    ///
    /// Returns `AdmissionError::CapacityExceeded` when the kind is full; the
    /// transaction is rolled back and nothing is written.
    /// Returns `AdmissionError::Repository` for database errors, including
    /// retryable serialization failures and deadlocks.
    pub async fn insert_with_capacity(
        &self,
        number: &OrderNumber,
        order: &NewOrder,
        max_capacity: u32,
    ) -> Result<Order, AdmissionError> {
        let kind = order.kind().as_str();
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(kind)
            .execute(&mut *tx)
            .await?;

        sqlx::query("SELECT id FROM bakery.orders WHERE order_kind = $1 FOR UPDATE")
            .bind(kind)
            .fetch_all(&mut *tx)
            .await?;

        let current: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bakery.orders WHERE order_kind = $1")
                .bind(kind)
                .fetch_one(&mut *tx)
                .await?;

        if current >= i64::from(max_capacity) {
            tx.rollback().await?;
            return Err(AdmissionError::CapacityExceeded { max: max_capacity });
        }

        let row = insert_row(&mut tx, number, order).await?;
        tx.commit().await?;

        Ok(row.try_into()?)
    }

    /// Number of committed orders of a kind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_kind(&self, kind: OrderKind) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM bakery.orders WHERE order_kind = $1")
            .bind(kind.as_str())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is inconsistent.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM bakery.orders WHERE id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Get an order by its order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is inconsistent.
    pub async fn get_by_number(&self, number: &str) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM bakery.orders WHERE order_number = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(number)
            .fetch_optional(self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// List one page of orders plus the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is inconsistent.
    pub async fn list(&self, query: &OrderListQuery) -> Result<(Vec<Order>, i64), RepositoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM bakery.orders WHERE TRUE");
        query.push_filters(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ORDER_COLUMNS} FROM bakery.orders WHERE TRUE"
        ));
        query.push_filters(&mut qb);
        qb.push(" ORDER BY ")
            .push(query.sort.sql())
            .push(" ")
            .push(query.direction.sql())
            .push(", id ")
            .push(query.direction.sql())
            .push(" LIMIT ")
            .push_bind(i64::from(query.per_page))
            .push(" OFFSET ")
            .push_bind(query.offset());

        let rows = qb.build_query_as::<OrderRow>().fetch_all(self.pool).await?;
        let orders = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Order>, _>>()?;
        Ok((orders, total))
    }

    /// Order counts per derived status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let stats = sqlx::query_as::<_, OrderStats>(
            r"
            SELECT
                COUNT(*) FILTER (WHERE paid_at IS NULL AND delivered_at IS NULL) AS created,
                COUNT(*) FILTER (WHERE paid_at IS NOT NULL AND delivered_at IS NULL) AS paid,
                COUNT(*) FILTER (WHERE delivered_at IS NOT NULL) AS delivered,
                COUNT(*) AS total
            FROM bakery.orders
            ",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }

    /// Set or clear a milestone timestamp.
    ///
    /// Setting keeps an existing timestamp; clearing sets it to NULL. Either
    /// way the acting admin is recorded in `updated_by_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_milestone(
        &self,
        id: OrderId,
        milestone: Milestone,
        reached: bool,
        admin: AdminUserId,
    ) -> Result<Order, RepositoryError> {
        let column = milestone.column();
        let sql = format!(
            r"
            UPDATE bakery.orders
            SET {column} = CASE WHEN $2 THEN COALESCE({column}, NOW()) ELSE NULL END,
                updated_by_id = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(reached)
            .bind(admin)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        row.try_into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 12, 5).unwrap()
    }

    fn row_for(details: &OrderDetails) -> OrderRow {
        let c = OrderColumns::from(details);
        OrderRow {
            id: 1,
            order_number: "ORD-1-ABCDEF".into(),
            customer_name: "Jana Nováková".into(),
            customer_email: "jana@seznam.cz".into(),
            customer_phone: "+420 777 123 456".into(),
            delivery_date: details.delivery_date(),
            order_kind: details.kind().as_str().into(),
            order_cake: c.order_cake,
            order_dessert: c.order_dessert,
            cake_size: c.cake_size,
            cake_flavor: c.cake_flavor,
            cake_message: c.cake_message,
            dessert_choice: c.dessert_choice,
            tasting_cake_box_qty: c.tasting_cake_box_qty,
            tasting_sweetbar_box_qty: c.tasting_sweetbar_box_qty,
            tasting_notes: c.tasting_notes,
            sweet_items: c.sweet_items,
            total_amount: None,
            notes: c.notes,
            paid_at: None,
            delivered_at: None,
            updated_by_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn regular() -> OrderDetails {
        OrderDetails::Regular(
            RegularOrder::new(
                date(),
                Some(CakeDetails {
                    size: "24 cm".into(),
                    flavor: "čokoláda".into(),
                    message: Some("Všechno nejlepší".into()),
                }),
                None,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_regular_columns_leave_other_kinds_null() {
        let c = OrderColumns::from(&regular());
        assert!(c.order_cake);
        assert!(!c.order_dessert);
        assert_eq!(c.cake_size.as_deref(), Some("24 cm"));
        assert!(c.dessert_choice.is_none());
        assert!(c.tasting_cake_box_qty.is_none());
        assert!(c.sweet_items.is_none());
        assert!(c.notes.is_none());
    }

    #[test]
    fn test_wedding_tasting_columns() {
        let details = OrderDetails::WeddingTasting(WeddingTasting::new(date(), true, false).unwrap());
        let c = OrderColumns::from(&details);
        assert_eq!(c.tasting_cake_box_qty, Some(1));
        assert_eq!(c.tasting_sweetbar_box_qty, Some(0));
        assert!(!c.order_cake);
        assert!(c.cake_size.is_none());
    }

    #[test]
    fn test_every_kind_reads_back_unchanged() {
        let sweets = ChristmasSweets::new(vec![SweetLine {
            sweet_id: "pernicky".into(),
            name: "Perníčky".into(),
            quantity: 5,
            price_per_100g: Czk::from_whole(120),
        }])
        .unwrap();
        let all = [
            regular(),
            OrderDetails::WeddingTasting(WeddingTasting::new(date(), true, true).unwrap()),
            OrderDetails::ChristmasSweets(sweets),
            OrderDetails::ChristmasTasting(
                ChristmasTasting::new(date(), 2, 1, Some("bez ořechů".into())).unwrap(),
            ),
        ];
        for details in all {
            let order = Order::try_from(row_for(&details)).unwrap();
            assert_eq!(order.details, details);
            assert_eq!(order.status(), OrderStatus::Created);
        }
    }

    #[test]
    fn test_contradicting_row_is_corruption() {
        let mut row = row_for(&regular());
        row.tasting_cake_box_qty = Some(1);
        assert!(matches!(
            Order::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_sweets_summary_on_other_kind_is_corruption() {
        let tasting = OrderDetails::ChristmasTasting(ChristmasTasting::new(date(), 1, 0, None).unwrap());
        for details in [regular(), tasting] {
            let mut row = row_for(&details);
            row.notes = Some("Perníčky: 500 g".into());
            assert!(matches!(
                Order::try_from(row),
                Err(RepositoryError::DataCorruption(_))
            ));
        }
    }

    #[test]
    fn test_unknown_kind_is_corruption() {
        let mut row = row_for(&regular());
        row.order_kind = "easter".into();
        assert!(matches!(
            Order::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_sweets_row_without_items_is_corruption() {
        let details = OrderDetails::ChristmasSweets(
            ChristmasSweets::new(vec![SweetLine {
                sweet_id: "pernicky".into(),
                name: "Perníčky".into(),
                quantity: 5,
                price_per_100g: Czk::from_whole(120),
            }])
            .unwrap(),
        );
        let mut row = row_for(&details);
        row.sweet_items = None;
        assert!(matches!(
            Order::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_list_query_parsing_defaults() {
        assert_eq!(StatusFilter::parse(Some("paid")), StatusFilter::Only(OrderStatus::Paid));
        assert_eq!(StatusFilter::parse(Some("all")), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("bogus")), StatusFilter::All);
        assert_eq!(SortField::parse(Some("deliveryDate")), SortField::DeliveryDate);
        assert_eq!(SortField::parse(Some("id; DROP TABLE")), SortField::CreatedAt);
        assert_eq!(SortDirection::parse(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(None), SortDirection::Desc);
    }

    #[test]
    fn test_list_query_normalization() {
        let q = OrderListQuery {
            page: 0,
            per_page: 1000,
            search: Some("   ".into()),
            ..OrderListQuery::default()
        }
        .normalized();
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, OrderListQuery::MAX_PER_PAGE);
        assert!(q.search.is_none());
        assert_eq!(q.offset(), 0);

        let q = OrderListQuery {
            page: 3,
            per_page: 20,
            ..OrderListQuery::default()
        };
        assert_eq!(q.offset(), 40);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let q = OrderListQuery {
            search: Some("50%_off".into()),
            ..OrderListQuery::default()
        };
        assert_eq!(q.search_pattern().as_deref(), Some("%50\\%\\_off%"));
    }

    #[test]
    fn test_admission_error_from_sqlx() {
        let err = AdmissionError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(
            err,
            AdmissionError::Repository(RepositoryError::Database(_))
        ));
    }
}
