use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

use super::cursor::{newest_first, window_start, KeysetCursor};
use crate::domain::errors::DomainError;
use crate::domain::order::{Cursor, NewOrder, Order, OrderPage, OrderStatus};
use crate::domain::ports::{OrderRepository, OrderStream};

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Process-local store. Active-order subscribers are fed from a watch
/// channel that is republished after every write.
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
    active_tx: watch::Sender<Vec<Order>>,
    clock: Clock,
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        let (active_tx, _) = watch::channel(Vec::new());
        Self {
            orders: RwLock::new(HashMap::new()),
            active_tx,
            clock: Box::new(clock),
        }
    }

    /// Store `order` as-is, replacing any order with the same id.
    pub fn insert(&self, order: Order) -> Result<(), DomainError> {
        let mut orders = self.write()?;
        orders.insert(order.id, order);
        self.publish_active(&orders);
        Ok(())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<Uuid, Order>>, DomainError> {
        self.orders
            .read()
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Order>>, DomainError> {
        self.orders
            .write()
            .map_err(|e| DomainError::Internal(e.to_string()))
    }

    fn publish_active(&self, orders: &HashMap<Uuid, Order>) {
        let mut active: Vec<Order> = orders
            .values()
            .filter(|order| order.status.is_active())
            .cloned()
            .collect();
        active.sort_by(newest_first);
        self.active_tx.send_replace(active);
    }

    fn page<'a>(
        matching: impl Iterator<Item = &'a Order>,
        since: DateTime<Utc>,
        page_size: usize,
    ) -> OrderPage {
        let page_size = page_size.max(1);
        let mut items: Vec<Order> = matching.cloned().collect();
        items.sort_by(newest_first);
        let has_more = items.len() > page_size;
        items.truncate(page_size);
        let next_cursor = items
            .last()
            .map(|last| KeysetCursor::after(last, since).encode());
        OrderPage {
            items,
            next_cursor,
            has_more,
        }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, order: NewOrder) -> Result<Uuid, DomainError> {
        order.validate()?;
        let id = Uuid::new_v4();
        self.insert(order.into_order(id, (self.clock)()))?;
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn subscribe_active_orders(&self) -> Result<OrderStream, DomainError> {
        let rx = self.active_tx.subscribe();
        Ok(WatchStream::new(rx).map(Ok).boxed())
    }

    async fn fetch_recent_orders(
        &self,
        status: OrderStatus,
        window_days: u32,
        page_size: usize,
    ) -> Result<OrderPage, DomainError> {
        let since = window_start((self.clock)(), window_days)?;
        let orders = self.read()?;
        Ok(Self::page(
            orders
                .values()
                .filter(|order| order.status == status && order.ordered_at >= since),
            since,
            page_size,
        ))
    }

    async fn fetch_next_orders_page(
        &self,
        status: OrderStatus,
        page_size: usize,
        cursor: &Cursor,
    ) -> Result<OrderPage, DomainError> {
        let position = KeysetCursor::decode(cursor)?;
        let orders = self.read()?;
        Ok(Self::page(
            orders.values().filter(|order| {
                order.status == status
                    && order.ordered_at >= position.since
                    && position.precedes(order)
            }),
            position.since,
            page_size,
        ))
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<bool, DomainError> {
        let mut orders = self.write()?;
        let Some(order) = orders.get_mut(&id) else {
            return Ok(false);
        };
        if !order.status.can_transition_to(status) {
            return Err(DomainError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }
        order.status = status;
        self.publish_active(&orders);
        Ok(true)
    }

    async fn assign_delivery_person(
        &self,
        id: Uuid,
        person_id: &str,
        person_name: &str,
    ) -> Result<bool, DomainError> {
        let mut orders = self.write()?;
        let Some(order) = orders.get_mut(&id) else {
            return Ok(false);
        };
        order.delivery_person_id = Some(person_id.to_string());
        order.delivery_person_name = Some(person_name.to_string());
        self.publish_active(&orders);
        Ok(true)
    }
}
