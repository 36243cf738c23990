use async_trait::async_trait;
use futures::stream::BoxStream;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{Cursor, NewOrder, Order, OrderPage, OrderStatus};

/// Live feed of active-order snapshots. Each item replaces the previous one.
pub type OrderStream = BoxStream<'static, Result<Vec<Order>, DomainError>>;

/// Everything the order board and the HTTP facade need from a backing store.
///
/// Lists are ordered by `ordered_at` descending, ties broken by id
/// descending.
#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    async fn create_order(&self, order: NewOrder) -> Result<Uuid, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;

    /// Pending and Processing orders. The first item is the current snapshot;
    /// a new snapshot follows every change to a matching order.
    async fn subscribe_active_orders(&self) -> Result<OrderStream, DomainError>;

    /// First page of orders in `status` placed within the last `window_days`.
    async fn fetch_recent_orders(
        &self,
        status: OrderStatus,
        window_days: u32,
        page_size: usize,
    ) -> Result<OrderPage, DomainError>;

    /// The page strictly older than `cursor`, within the cursor's window.
    async fn fetch_next_orders_page(
        &self,
        status: OrderStatus,
        page_size: usize,
        cursor: &Cursor,
    ) -> Result<OrderPage, DomainError>;

    /// Returns `false` when no order has this id.
    async fn update_order_status(&self, id: Uuid, status: OrderStatus)
        -> Result<bool, DomainError>;

    async fn assign_delivery_person(
        &self,
        id: Uuid,
        person_id: &str,
        person_name: &str,
    ) -> Result<bool, DomainError>;
}
