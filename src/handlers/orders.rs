use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_board::{DEFAULT_PAGE_SIZE, DEFAULT_WINDOW_DAYS};
use crate::application::order_service::OrderService;
use crate::domain::order::{
    Cursor, DeliveryAddress, NewOrder, Order, OrderItem, OrderPage, OrderStatus,
};
use crate::domain::ports::OrderRepository;
use crate::errors::AppError;

pub type SharedOrderService = OrderService<dyn OrderRepository>;

/// Fallbacks for `GET /orders/recent` when the query omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingDefaults {
    pub window_days: u32,
    pub page_size: usize,
}

impl Default for ListingDefaults {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AddressPayload {
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub phone: String,
    pub street: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub city: String,
    pub note: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<AddressPayload> for DeliveryAddress {
    fn from(a: AddressPayload) -> Self {
        Self {
            recipient_name: a.recipient_name,
            phone: a.phone,
            street: a.street,
            district: a.district,
            city: a.city,
            note: a.note,
            latitude: a.latitude,
            longitude: a.longitude,
        }
    }
}

impl From<DeliveryAddress> for AddressPayload {
    fn from(a: DeliveryAddress) -> Self {
        Self {
            recipient_name: a.recipient_name,
            phone: a.phone,
            street: a.street,
            district: a.district,
            city: a.city,
            note: a.note,
            latitude: a.latitude,
            longitude: a.longitude,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_id: Uuid,
    pub product_name: String,
    #[serde(default)]
    pub image_url: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub customer_name: Option<String>,
    pub items: Vec<CreateOrderItemRequest>,
    pub payment_method: String,
    /// Decimal fee as a string, e.g. "15.00"
    #[serde(default = "zero_fee")]
    pub delivery_fee: String,
    pub address: AddressPayload,
    pub estimated_delivery_at: Option<DateTime<Utc>>,
}

fn zero_fee() -> String {
    "0".to_string()
}

fn parse_money(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid {} '{}': {}", field, raw, e)))
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder, AppError> {
        let items = self
            .items
            .into_iter()
            .map(|item| {
                Ok(OrderItem {
                    unit_price: parse_money("unit_price", &item.unit_price)?,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    image_url: item.image_url,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        Ok(NewOrder {
            user_id: self.user_id,
            customer_name: self.customer_name,
            items,
            payment_method: self.payment_method,
            delivery_fee: parse_money("delivery_fee", &self.delivery_fee)?,
            address: self.address.into(),
            estimated_delivery_at: self.estimated_delivery_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub image_url: String,
    pub unit_price: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub payment_method: String,
    pub subtotal: String,
    pub delivery_fee: String,
    pub total: String,
    pub ordered_at: String,
    pub estimated_delivery_at: Option<String>,
    pub address: AddressPayload,
    pub formatted_address: String,
    pub delivery_person_id: Option<String>,
    pub delivery_person_name: Option<String>,
    pub customer_name: Option<String>,
    pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            formatted_address: o.address.formatted(),
            id: o.id,
            user_id: o.user_id,
            status: o.status.as_str().to_string(),
            payment_method: o.payment_method,
            subtotal: o.subtotal.to_string(),
            delivery_fee: o.delivery_fee.to_string(),
            total: o.total.to_string(),
            ordered_at: o.ordered_at.to_rfc3339(),
            estimated_delivery_at: o.estimated_delivery_at.map(|at| at.to_rfc3339()),
            address: o.address.into(),
            delivery_person_id: o.delivery_person_id,
            delivery_person_name: o.delivery_person_name,
            customer_name: o.customer_name,
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    product_id: i.product_id,
                    product_name: i.product_name,
                    image_url: i.image_url,
                    unit_price: i.unit_price.to_string(),
                    quantity: i.quantity,
                })
                .collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecentOrdersParams {
    /// `DELIVERED` or `CANCELLED`.
    pub status: String,
    /// How many days back to look. Defaults to 30, clamped to 1..=365.
    pub days: Option<u32>,
    /// Number of items per page. Defaults to 20, clamped to 1..=100.
    pub page_size: Option<usize>,
    /// Cursor from a previous page's `next_cursor`.
    pub cursor: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderPageResponse {
    pub items: Vec<OrderResponse>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl From<OrderPage> for OrderPageResponse {
    fn from(page: OrderPage) -> Self {
        Self {
            items: page.items.into_iter().map(OrderResponse::from).collect(),
            next_cursor: page.next_cursor.map(|cursor| cursor.0),
            has_more: page.has_more,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignDeliveryPersonRequest {
    pub person_id: String,
    pub person_name: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates a pending order from a checkout. Subtotal and total are derived
/// from the items and delivery fee.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, description = "Invalid order"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<SharedOrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let new_order = body.into_inner().into_new_order()?;
    let id = service.create_order(new_order).await?;
    log::info!("Created order {}", id);
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<SharedOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    match service.get_order(path.into_inner()).await? {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}

/// GET /orders/active
///
/// Pending and processing orders, newest first.
#[utoipa::path(
    get,
    path = "/orders/active",
    responses(
        (status = 200, description = "Active orders", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_active_orders(
    service: web::Data<SharedOrderService>,
) -> Result<HttpResponse, AppError> {
    let orders: Vec<OrderResponse> = service
        .active_orders()
        .await?
        .into_iter()
        .map(OrderResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(orders))
}

/// GET /orders/recent
///
/// One page of recently delivered or cancelled orders. Pass the returned
/// `next_cursor` back as `cursor` to get the next, older page.
#[utoipa::path(
    get,
    path = "/orders/recent",
    params(
        ("status" = String, Query, description = "DELIVERED or CANCELLED"),
        ("days" = Option<u32>, Query, description = "Window in days (default 30, max 365)"),
        ("page_size" = Option<usize>, Query, description = "Items per page (default 20, max 100)"),
        ("cursor" = Option<String>, Query, description = "Cursor from the previous page"),
    ),
    responses(
        (status = 200, description = "Page of orders", body = OrderPageResponse),
        (status = 400, description = "Invalid status or cursor"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_recent_orders(
    service: web::Data<SharedOrderService>,
    defaults: web::Data<ListingDefaults>,
    query: web::Query<RecentOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let status = OrderStatus::from_str(&params.status)?;
    let days = params.days.unwrap_or(defaults.window_days).clamp(1, 365);
    let page_size = params.page_size.unwrap_or(defaults.page_size).clamp(1, 100);
    let cursor = params
        .cursor
        .filter(|raw| !raw.is_empty())
        .map(Cursor);

    let page = service
        .recent_orders(status, days, page_size, cursor)
        .await?;
    Ok(HttpResponse::Ok().json(OrderPageResponse::from(page)))
}

/// PATCH /orders/{id}/status
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 204, description = "Status changed"),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    service: web::Data<SharedOrderService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = OrderStatus::from_str(&body.status)?;
    service.update_status(id, status).await?;
    log::info!("Order {} moved to {}", id, status);
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /orders/{id}/delivery-person
#[utoipa::path(
    put,
    path = "/orders/{id}/delivery-person",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = AssignDeliveryPersonRequest,
    responses(
        (status = 204, description = "Delivery person assigned"),
        (status = 400, description = "Missing person id or name"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn assign_delivery_person(
    service: web::Data<SharedOrderService>,
    path: web::Path<Uuid>,
    body: web::Json<AssignDeliveryPersonRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    service
        .assign_delivery_person(id, &body.person_id, &body.person_name)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
