use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{DeliveryAddress, Order, OrderItem, OrderStatus};
use crate::schema::{order_items, order_outbox, orders};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub payment_method: String,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub ordered_at: DateTime<Utc>,
    pub estimated_delivery_at: Option<DateTime<Utc>>,
    pub recipient_name: String,
    pub phone: String,
    pub street: String,
    pub district: String,
    pub city: String,
    pub address_note: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub delivery_person_id: Option<String>,
    pub delivery_person_name: Option<String>,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|e| DomainError::Internal(format!("order {}: {}", self.id, e)))?;
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            items: items.into_iter().map(OrderItemRow::into_item).collect(),
            status,
            payment_method: self.payment_method,
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            total: self.total,
            ordered_at: self.ordered_at,
            estimated_delivery_at: self.estimated_delivery_at,
            address: DeliveryAddress {
                recipient_name: self.recipient_name,
                phone: self.phone,
                street: self.street,
                district: self.district,
                city: self.city,
                note: self.address_note,
                latitude: self.latitude,
                longitude: self.longitude,
            },
            delivery_person_id: self.delivery_person_id,
            delivery_person_name: self.delivery_person_name,
            customer_name: self.customer_name,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub payment_method: String,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub ordered_at: DateTime<Utc>,
    pub estimated_delivery_at: Option<DateTime<Utc>>,
    pub recipient_name: String,
    pub phone: String,
    pub street: String,
    pub district: String,
    pub city: String,
    pub address_note: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub customer_name: Option<String>,
}

impl From<&Order> for NewOrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status.as_str().to_string(),
            payment_method: order.payment_method.clone(),
            subtotal: order.subtotal.clone(),
            delivery_fee: order.delivery_fee.clone(),
            total: order.total.clone(),
            ordered_at: order.ordered_at,
            estimated_delivery_at: order.estimated_delivery_at,
            recipient_name: order.address.recipient_name.clone(),
            phone: order.address.phone.clone(),
            street: order.address.street.clone(),
            district: order.address.district.clone(),
            city: order.address.city.clone(),
            address_note: order.address.note.clone(),
            latitude: order.address.latitude,
            longitude: order.address.longitude,
            customer_name: order.customer_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub product_name: String,
    pub image_url: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

impl OrderItemRow {
    fn into_item(self) -> OrderItem {
        OrderItem {
            product_id: self.product_id,
            product_name: self.product_name,
            image_url: self.image_url,
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub product_name: String,
    pub image_url: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}
