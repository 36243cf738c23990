use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Wire and storage representation, e.g. `PENDING`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Human-readable label shown next to an order.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether an admin may move an order from `self` to `next`.
    ///
    /// Re-applying the current status is accepted so that repeated taps on
    /// the same action stay harmless.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (*self, next),
            (Pending, Processing)
                | (Processing, Shipped)
                | (Processing, Delivered)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Processing, Cancelled)
                | (Shipped, Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown order status '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub image_url: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

impl OrderItem {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// Address captured at checkout. Later edits to the customer's saved
/// addresses never touch this snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub recipient_name: String,
    pub phone: String,
    pub street: String,
    pub district: String,
    pub city: String,
    pub note: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl DeliveryAddress {
    pub fn formatted(&self) -> String {
        [&self.street, &self.district, &self.city]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub payment_method: String,
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub total: BigDecimal,
    pub ordered_at: DateTime<Utc>,
    pub estimated_delivery_at: Option<DateTime<Utc>>,
    pub address: DeliveryAddress,
    pub delivery_person_id: Option<String>,
    pub delivery_person_name: Option<String>,
    pub customer_name: Option<String>,
}

/// Checkout input. Totals are derived, never taken from the caller.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub customer_name: Option<String>,
    pub items: Vec<OrderItem>,
    pub payment_method: String,
    pub delivery_fee: BigDecimal,
    pub address: DeliveryAddress,
    pub estimated_delivery_at: Option<DateTime<Utc>>,
}

/// Money columns hold two decimal places and ten integer digits.
const AMOUNT_SCALE: i64 = 2;
const AMOUNT_LIMIT: i64 = 10_000_000_000;

fn check_amount(what: &str, value: &BigDecimal) -> Result<(), DomainError> {
    if *value < BigDecimal::from(0) {
        return Err(DomainError::InvalidInput(format!("{what} must not be negative")));
    }
    if value.with_scale(AMOUNT_SCALE) != *value {
        return Err(DomainError::InvalidInput(format!(
            "{what} has more than {AMOUNT_SCALE} decimal places"
        )));
    }
    if *value >= BigDecimal::from(AMOUNT_LIMIT) {
        return Err(DomainError::InvalidInput(format!("{what} is too large")));
    }
    Ok(())
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.items.is_empty() {
            return Err(DomainError::InvalidInput(
                "an order needs at least one item".to_string(),
            ));
        }
        for item in &self.items {
            if item.quantity <= 0 {
                return Err(DomainError::InvalidInput(format!(
                    "quantity for '{}' must be positive",
                    item.product_name
                )));
            }
            check_amount(
                &format!("unit price for '{}'", item.product_name),
                &item.unit_price,
            )?;
        }
        check_amount("delivery fee", &self.delivery_fee)?;
        check_amount("order total", &(self.subtotal() + &self.delivery_fee))
    }

    pub fn subtotal(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::from(0), |acc, item| acc + item.line_total())
    }

    /// Materialize the order as a fresh `Pending` record.
    pub fn into_order(self, id: Uuid, ordered_at: DateTime<Utc>) -> Order {
        let subtotal = self.subtotal();
        let total = &subtotal + &self.delivery_fee;
        Order {
            id,
            user_id: self.user_id,
            items: self.items,
            status: OrderStatus::Pending,
            payment_method: self.payment_method,
            subtotal,
            delivery_fee: self.delivery_fee,
            total,
            ordered_at,
            estimated_delivery_at: self.estimated_delivery_at,
            address: self.address,
            delivery_person_id: None,
            delivery_person_name: None,
            customer_name: self.customer_name,
        }
    }
}

/// The independently fetched sub-lists the board is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderBucket {
    Active,
    Delivered,
    Cancelled,
}

impl OrderBucket {
    pub const ALL: [OrderBucket; 3] = [
        OrderBucket::Active,
        OrderBucket::Delivered,
        OrderBucket::Cancelled,
    ];

    pub fn admits(&self, status: OrderStatus) -> bool {
        match self {
            OrderBucket::Active => status.is_active(),
            OrderBucket::Delivered => status == OrderStatus::Delivered,
            OrderBucket::Cancelled => status == OrderStatus::Cancelled,
        }
    }

    pub fn for_status(status: OrderStatus) -> Option<OrderBucket> {
        OrderBucket::ALL
            .into_iter()
            .find(|bucket| bucket.admits(status))
    }

    /// Status queried for a time-windowed bucket. `None` for the live bucket.
    pub fn recent_status(&self) -> Option<OrderStatus> {
        match self {
            OrderBucket::Active => None,
            OrderBucket::Delivered => Some(OrderStatus::Delivered),
            OrderBucket::Cancelled => Some(OrderStatus::Cancelled),
        }
    }

    /// Tab whose pagination state tracks this bucket's cursor. The live
    /// bucket has no cursor.
    pub fn pagination_tab(&self) -> Option<OrderTab> {
        match self {
            OrderBucket::Active => None,
            OrderBucket::Delivered => Some(OrderTab::Delivered),
            OrderBucket::Cancelled => Some(OrderTab::Cancelled),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderTab {
    #[default]
    All = 0,
    Pending = 1,
    Processing = 2,
    Delivered = 3,
    Cancelled = 4,
}

impl OrderTab {
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Buckets whose pages can be extended while this tab is selected.
    pub fn paginated_buckets(&self) -> &'static [OrderBucket] {
        match self {
            OrderTab::All => &[OrderBucket::Delivered, OrderBucket::Cancelled],
            OrderTab::Pending | OrderTab::Processing => &[],
            OrderTab::Delivered => &[OrderBucket::Delivered],
            OrderTab::Cancelled => &[OrderBucket::Cancelled],
        }
    }
}

impl TryFrom<usize> for OrderTab {
    type Error = DomainError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(OrderTab::All),
            1 => Ok(OrderTab::Pending),
            2 => Ok(OrderTab::Processing),
            3 => Ok(OrderTab::Delivered),
            4 => Ok(OrderTab::Cancelled),
            other => Err(DomainError::InvalidInput(format!(
                "tab index {other} is out of range"
            ))),
        }
    }
}

/// Opaque token handed out by a store to resume a paginated query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub next_cursor: Option<Cursor>,
    pub has_more: bool,
}
