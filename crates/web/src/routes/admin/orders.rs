//! Admin order list, statistics and milestone toggles.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use pandi_dorty_core::{Order, OrderId, OrderStatus};

use crate::db::orders::{
    Milestone, OrderListQuery, OrderStats, SortDirection, SortField, StatusFilter,
};
use crate::db::{OrderRepository, PhotoRepository};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, PhotoMeta};
use crate::routes::{json_body, parse_id};
use crate::state::AppState;

/// Raw list parameters. Unknown or malformed values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub status: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl ListParams {
    fn into_query(self) -> OrderListQuery {
        let number = |raw: Option<String>, default: u32| {
            raw.and_then(|s| s.trim().parse::<u32>().ok())
                .unwrap_or(default)
        };

        OrderListQuery {
            status: StatusFilter::parse(self.status.as_deref()),
            sort: SortField::parse(self.sort.as_deref()),
            direction: SortDirection::parse(self.dir.as_deref()),
            search: self.search,
            page: number(self.page, 1),
            per_page: number(self.per_page, OrderListQuery::DEFAULT_PER_PAGE),
        }
        .normalized()
    }
}

/// An order as shown in the admin, with its status and photo metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    #[serde(flatten)]
    pub order: Order,
    pub status: OrderStatus,
    pub is_paid: bool,
    pub is_delivered: bool,
    pub photos: Vec<PhotoMeta>,
}

impl AdminOrder {
    fn new(order: Order, photos: Vec<PhotoMeta>) -> Self {
        Self {
            status: order.status(),
            is_paid: order.is_paid(),
            is_delivered: order.is_delivered(),
            order,
            photos,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    pub orders: Vec<AdminOrder>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: AdminOrder,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidRequest {
    pub is_paid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredRequest {
    pub is_delivered: bool,
}

/// Attach photo metadata to each order, preserving order.
async fn with_photos(state: &AppState, orders: Vec<Order>) -> Result<Vec<AdminOrder>, AppError> {
    let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
    let mut by_order: HashMap<OrderId, Vec<PhotoMeta>> = HashMap::new();
    for photo in PhotoRepository::new(state.pool())
        .list_for_orders(&ids)
        .await?
    {
        by_order.entry(photo.order_id).or_default().push(photo);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let photos = by_order.remove(&order.id).unwrap_or_default();
            AdminOrder::new(order, photos)
        })
        .collect())
}

fn total_pages(total: i64, per_page: u32) -> i64 {
    let per_page = i64::from(per_page.max(1));
    (total + per_page - 1) / per_page
}

pub async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<OrderListResponse>, AppError> {
    let query = params.into_query();
    let (orders, total) = OrderRepository::new(state.pool()).list(&query).await?;
    let orders = with_photos(&state, orders).await?;

    Ok(Json(OrderListResponse {
        orders,
        total,
        page: query.page,
        per_page: query.per_page,
        total_pages: total_pages(total, query.per_page),
    }))
}

pub async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<OrderStats>, AppError> {
    Ok(Json(OrderRepository::new(state.pool()).stats().await?))
}

pub async fn by_number(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = OrderRepository::new(state.pool())
        .get_by_number(order_number.trim())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Objednávka {order_number} nebyla nalezena")))?;

    let order = with_photos(&state, vec![order])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("order lost while loading photos".to_owned()))?;
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

async fn toggle(
    state: &AppState,
    raw_id: &str,
    milestone: Milestone,
    reached: bool,
    admin: &CurrentAdmin,
) -> Result<Json<OrderResponse>, AppError> {
    let id: OrderId = parse_id(raw_id, "order")?;
    let order = OrderRepository::new(state.pool())
        .set_milestone(id, milestone, reached, admin.id)
        .await?;

    tracing::info!(order_id = %id, ?milestone, reached, "Order milestone updated");
    let order = with_photos(state, vec![order])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("order lost while loading photos".to_owned()))?;
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn set_paid(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<PaidRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, AppError> {
    let body = json_body(payload)?;
    toggle(&state, &raw_id, Milestone::Paid, body.is_paid, &admin).await
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn set_delivered(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<DeliveredRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, AppError> {
    let body = json_body(payload)?;
    toggle(&state, &raw_id, Milestone::Delivered, body.is_delivered, &admin).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let uri: axum::http::Uri = format!("/api/orders?{query}").parse().unwrap();
        Query::<ListParams>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_defaults() {
        assert_eq!(params(&[]).into_query(), OrderListQuery::default());
    }

    #[test]
    fn test_parses_known_values() {
        let query = params(&[
            ("status", "paid"),
            ("sort", "deliveryDate"),
            ("dir", "asc"),
            ("search", "%20Nov%20"),
            ("page", "3"),
            ("perPage", "50"),
        ])
        .into_query();

        assert_eq!(query.status, StatusFilter::Only(OrderStatus::Paid));
        assert_eq!(query.sort, SortField::DeliveryDate);
        assert_eq!(query.direction, SortDirection::Asc);
        assert_eq!(query.search.as_deref(), Some("Nov"));
        assert_eq!(query.page, 3);
        assert_eq!(query.per_page, 50);
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let query = params(&[("page", "abc"), ("perPage", "100000")]).into_query();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, OrderListQuery::MAX_PER_PAGE);

        let query = params(&[("page", "0"), ("perPage", "0")]).into_query();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 1);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }
}
