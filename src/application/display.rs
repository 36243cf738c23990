use crate::domain::order::{Order, OrderBucket, OrderStatus, OrderTab};

/// Source lists of the board, each ordered newest first.
#[derive(Debug, Clone, Default)]
pub struct Buckets {
    pub active: Vec<Order>,
    pub delivered: Vec<Order>,
    pub cancelled: Vec<Order>,
}

impl Buckets {
    pub fn get(&self, bucket: OrderBucket) -> &[Order] {
        match bucket {
            OrderBucket::Active => &self.active,
            OrderBucket::Delivered => &self.delivered,
            OrderBucket::Cancelled => &self.cancelled,
        }
    }

    pub fn get_mut(&mut self, bucket: OrderBucket) -> &mut Vec<Order> {
        match bucket {
            OrderBucket::Active => &mut self.active,
            OrderBucket::Delivered => &mut self.delivered,
            OrderBucket::Cancelled => &mut self.cancelled,
        }
    }

    pub fn find(&self, id: uuid::Uuid) -> Option<&Order> {
        OrderBucket::ALL
            .into_iter()
            .flat_map(|bucket| self.get(bucket))
            .find(|order| order.id == id)
    }
}

/// The list shown for `tab` with `query` applied.
///
/// The "All" tab is Active, then Delivered, then Cancelled. Buckets are
/// concatenated, not merged by timestamp.
pub fn compute_displayed(buckets: &Buckets, tab: OrderTab, query: &str) -> Vec<Order> {
    let by_tab: Vec<&Order> = match tab {
        OrderTab::All => buckets
            .active
            .iter()
            .chain(&buckets.delivered)
            .chain(&buckets.cancelled)
            .collect(),
        OrderTab::Pending => with_status(&buckets.active, OrderStatus::Pending),
        OrderTab::Processing => with_status(&buckets.active, OrderStatus::Processing),
        OrderTab::Delivered => buckets.delivered.iter().collect(),
        OrderTab::Cancelled => buckets.cancelled.iter().collect(),
    };

    by_tab
        .into_iter()
        .filter(|order| matches_query(order, query))
        .cloned()
        .collect()
}

fn with_status(orders: &[Order], status: OrderStatus) -> Vec<&Order> {
    orders.iter().filter(|order| order.status == status).collect()
}

/// Case-insensitive substring search over the fields an admin would type.
/// A blank query matches every order.
pub fn matches_query(order: &Order, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |haystack: &str| haystack.to_lowercase().contains(&needle);

    hit(&order.id.to_string())
        || order.customer_name.as_deref().is_some_and(hit)
        || hit(order.status.label())
        || hit(order.status.as_str())
        || hit(&order.payment_method)
        || hit(&order.address.formatted())
        || order.items.iter().any(|item| hit(&item.product_name))
}
