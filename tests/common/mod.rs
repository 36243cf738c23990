#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use order_board::domain::errors::DomainError;
use order_board::domain::order::{
    Cursor, DeliveryAddress, NewOrder, Order, OrderItem, OrderPage, OrderStatus,
};
use order_board::domain::ports::{OrderRepository, OrderStream};
use order_board::infrastructure::InMemoryOrderRepository;
use uuid::Uuid;

/// Order placed `minutes_ago` minutes before now.
pub fn order(status: OrderStatus, minutes_ago: i64) -> Order {
    Order {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        items: vec![OrderItem {
            product_id: Uuid::new_v4(),
            product_name: "Purified water 19L".to_string(),
            image_url: String::new(),
            unit_price: BigDecimal::from(45),
            quantity: 1,
        }],
        status,
        payment_method: "Cash on delivery".to_string(),
        subtotal: BigDecimal::from(45),
        delivery_fee: BigDecimal::from(10),
        total: BigDecimal::from(55),
        ordered_at: Utc::now() - Duration::minutes(minutes_ago),
        estimated_delivery_at: None,
        address: DeliveryAddress {
            street: "5 Hai Ba Trung".to_string(),
            district: "District 3".to_string(),
            city: "Ho Chi Minh City".to_string(),
            ..Default::default()
        },
        delivery_person_id: None,
        delivery_person_name: None,
        customer_name: Some("Bao Pham".to_string()),
    }
}

/// In-memory store with switchable failures and call counters.
#[derive(Default)]
pub struct ScriptedRepository {
    pub inner: InMemoryOrderRepository,
    failing: Mutex<HashSet<OrderStatus>>,
    crashing: AtomicBool,
    first_page_calls: AtomicUsize,
    next_page_calls: AtomicUsize,
    subscriptions: AtomicUsize,
}

impl ScriptedRepository {
    pub fn seeded(orders: impl IntoIterator<Item = Order>) -> Self {
        let repo = Self::default();
        for order in orders {
            repo.inner.insert(order).expect("seed");
        }
        repo
    }

    pub fn fail(&self, status: OrderStatus) {
        self.failing.lock().expect("lock").insert(status);
    }

    pub fn heal(&self, status: OrderStatus) {
        self.failing.lock().expect("lock").remove(&status);
    }

    /// Make every page fetch panic instead of returning.
    pub fn crash_pages(&self) {
        self.crashing.store(true, Ordering::SeqCst);
    }

    pub fn first_page_calls(&self) -> usize {
        self.first_page_calls.load(Ordering::SeqCst)
    }

    pub fn next_page_calls(&self) -> usize {
        self.next_page_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.first_page_calls() + self.next_page_calls()
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    fn check(&self, status: OrderStatus) -> Result<(), DomainError> {
        if self.crashing.load(Ordering::SeqCst) && status.is_terminal() {
            panic!("{status} page store crashed");
        }
        if self.failing.lock().expect("lock").contains(&status) {
            Err(DomainError::Internal(format!("{status} orders unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl OrderRepository for ScriptedRepository {
    async fn create_order(&self, order: NewOrder) -> Result<Uuid, DomainError> {
        self.inner.create_order(order).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn subscribe_active_orders(&self) -> Result<OrderStream, DomainError> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        self.check(OrderStatus::Pending)?;
        self.inner.subscribe_active_orders().await
    }

    async fn fetch_recent_orders(
        &self,
        status: OrderStatus,
        window_days: u32,
        page_size: usize,
    ) -> Result<OrderPage, DomainError> {
        self.first_page_calls.fetch_add(1, Ordering::SeqCst);
        self.check(status)?;
        self.inner
            .fetch_recent_orders(status, window_days, page_size)
            .await
    }

    async fn fetch_next_orders_page(
        &self,
        status: OrderStatus,
        page_size: usize,
        cursor: &Cursor,
    ) -> Result<OrderPage, DomainError> {
        self.next_page_calls.fetch_add(1, Ordering::SeqCst);
        self.check(status)?;
        self.inner
            .fetch_next_orders_page(status, page_size, cursor)
            .await
    }

    async fn update_order_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<bool, DomainError> {
        self.inner.update_order_status(id, status).await
    }

    async fn assign_delivery_person(
        &self,
        id: Uuid,
        person_id: &str,
        person_name: &str,
    ) -> Result<bool, DomainError> {
        self.inner
            .assign_delivery_person(id, person_id, person_name)
            .await
    }
}
