use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Cursor, NewOrder, Order, OrderPage, OrderStatus};
use crate::domain::ports::OrderRepository;

/// Request/response facade over the store, used by the HTTP handlers.
pub struct OrderService<R: ?Sized> {
    repo: Arc<R>,
}

impl<R: OrderRepository + ?Sized> OrderService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create_order(&self, order: NewOrder) -> Result<Uuid, DomainError> {
        order.validate()?;
        self.repo.create_order(order).await
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.repo.find_by_id(id).await
    }

    /// Current active snapshot: the first item of a fresh subscription.
    pub async fn active_orders(&self) -> Result<Vec<Order>, DomainError> {
        use futures::StreamExt;

        let mut stream = self.repo.subscribe_active_orders().await?;
        match stream.next().await {
            Some(snapshot) => snapshot,
            None => Ok(Vec::new()),
        }
    }

    pub async fn recent_orders(
        &self,
        status: OrderStatus,
        window_days: u32,
        page_size: usize,
        cursor: Option<Cursor>,
    ) -> Result<OrderPage, DomainError> {
        if !status.is_terminal() {
            return Err(DomainError::InvalidInput(format!(
                "recent orders are only kept for delivered and cancelled orders, not {status}"
            )));
        }
        match cursor {
            Some(cursor) => {
                self.repo
                    .fetch_next_orders_page(status, page_size, &cursor)
                    .await
            }
            None => {
                self.repo
                    .fetch_recent_orders(status, window_days, page_size)
                    .await
            }
        }
    }

    pub async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<(), DomainError> {
        if self.repo.update_order_status(id, status).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    pub async fn assign_delivery_person(
        &self,
        id: Uuid,
        person_id: &str,
        person_name: &str,
    ) -> Result<(), DomainError> {
        if person_id.trim().is_empty() || person_name.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "delivery person id and name are required".to_string(),
            ));
        }
        if self
            .repo
            .assign_delivery_person(id, person_id.trim(), person_name.trim())
            .await?
        {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }
}
