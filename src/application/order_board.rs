//! Admin order board: three independently loaded buckets shown as one list.
//!
//! Fetches run as spawned tasks scoped to the board's [`CancellationToken`].
//! Their results come back over a channel and are applied by the owner
//! through [`OrderBoard::apply_next`], [`OrderBoard::settle`] or
//! [`OrderBoard::try_apply_pending`], so only the board ever mutates a bucket.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::display::{compute_displayed, Buckets};
use super::pagination::{PaginationState, PaginationStore};
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderBucket, OrderPage, OrderStatus, OrderTab};
use crate::domain::ports::OrderRepository;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const DEFAULT_LOOKAHEAD: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct BoardConfig {
    /// Orders per page for the delivered and cancelled buckets.
    pub page_size: usize,
    /// How far back the delivered and cancelled buckets reach.
    pub window_days: u32,
    /// Load more once the last rendered row is this close to the end.
    pub lookahead: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            window_days: DEFAULT_WINDOW_DAYS,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    First,
    Next,
}

#[derive(Debug)]
enum BoardEvent {
    ActiveSnapshot {
        generation: u64,
        result: Result<Vec<Order>, DomainError>,
    },
    ActiveClosed {
        generation: u64,
    },
    Page {
        bucket: OrderBucket,
        kind: PageKind,
        generation: u64,
        result: Result<OrderPage, DomainError>,
    },
}

pub struct OrderBoard<R> {
    repo: Arc<R>,
    config: BoardConfig,
    buckets: Buckets,
    pagination: PaginationStore,
    tab: OrderTab,
    query: String,
    displayed: Vec<Order>,
    bucket_errors: HashMap<OrderBucket, String>,
    mutation_error: Option<String>,
    active_generation: u64,
    active_loading: bool,
    active_scope: CancellationToken,
    scope: CancellationToken,
    events_tx: mpsc::UnboundedSender<BoardEvent>,
    events_rx: mpsc::UnboundedReceiver<BoardEvent>,
}

impl<R: OrderRepository> OrderBoard<R> {
    pub fn new(repo: Arc<R>, config: BoardConfig) -> Self {
        let scope = CancellationToken::new();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            repo,
            config,
            buckets: Buckets::default(),
            pagination: PaginationStore::new(),
            tab: OrderTab::All,
            query: String::new(),
            displayed: Vec::new(),
            bucket_errors: HashMap::new(),
            mutation_error: None,
            active_generation: 0,
            active_loading: false,
            active_scope: scope.child_token(),
            scope,
            events_tx,
            events_rx,
        }
    }

    // ── Read side ────────────────────────────────────────────────────────────

    pub fn displayed(&self) -> &[Order] {
        &self.displayed
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn tab(&self) -> OrderTab {
        self.tab
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn pagination(&self, tab: OrderTab) -> PaginationState {
        self.pagination.get(tab)
    }

    pub fn bucket_error(&self, bucket: OrderBucket) -> Option<&str> {
        self.bucket_errors.get(&bucket).map(String::as_str)
    }

    pub fn mutation_error(&self) -> Option<&str> {
        self.mutation_error.as_deref()
    }

    /// True while the active snapshot or any page request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.active_loading
            || OrderBucket::ALL
                .into_iter()
                .filter_map(|bucket| bucket.pagination_tab())
                .any(|tab| self.pagination.get(tab).is_loading())
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    /// Subscribe to active orders and load the first page of every
    /// time-windowed bucket.
    pub fn start(&mut self) {
        log::info!(
            "Starting order board (page size {}, window {} days)",
            self.config.page_size,
            self.config.window_days
        );
        self.refresh();
    }

    /// Reload every bucket from scratch. Current contents stay visible until
    /// the new results arrive.
    pub fn refresh(&mut self) {
        for bucket in OrderBucket::ALL {
            self.refresh_bucket(bucket);
        }
    }

    pub fn refresh_bucket(&mut self, bucket: OrderBucket) {
        match bucket {
            OrderBucket::Active => self.subscribe_active(),
            OrderBucket::Delivered | OrderBucket::Cancelled => self.fetch_first_page(bucket),
        }
    }

    pub fn select_tab(&mut self, tab: OrderTab) {
        if tab != self.tab {
            log::debug!("Switching order board tab {:?} -> {:?}", self.tab, tab);
        }
        self.tab = tab;
        for bucket in tab.paginated_buckets() {
            self.fetch_first_page(*bucket);
        }
        self.recompute();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.recompute();
    }

    pub fn clear_query(&mut self) {
        self.set_query(String::new());
    }

    /// Called by the list view with the index of the last rendered row.
    /// Returns the number of page requests issued.
    pub fn on_item_rendered(&mut self, index: usize) -> usize {
        let remaining = self.displayed.len().saturating_sub(index);
        if remaining <= self.config.lookahead {
            self.load_more()
        } else {
            0
        }
    }

    /// Request the next page of every paginated bucket behind the current
    /// tab. Buckets that are loading, exhausted or not yet loaded are skipped.
    pub fn load_more(&mut self) -> usize {
        let mut issued = 0;
        for bucket in self.tab.paginated_buckets() {
            if self.spawn_page_fetch(*bucket, PageKind::Next) {
                issued += 1;
            }
        }
        issued
    }

    /// Move an order to `status`. Nothing local changes unless the backend
    /// confirms; on success the buckets the order leaves and enters reload.
    pub async fn update_status(&mut self, id: Uuid, status: OrderStatus) -> bool {
        let previous = self.buckets.find(id).map(|order| order.status);
        match self.repo.update_order_status(id, status).await {
            Ok(true) => {
                log::info!("Order {} moved to {}", id, status);
                self.mutation_error = None;
                let mut affected: Vec<OrderBucket> = Vec::new();
                for bucket in previous
                    .and_then(OrderBucket::for_status)
                    .into_iter()
                    .chain(OrderBucket::for_status(status))
                {
                    if !affected.contains(&bucket) {
                        affected.push(bucket);
                    }
                }
                for bucket in affected {
                    self.refresh_bucket(bucket);
                }
                true
            }
            Ok(false) => {
                self.record_mutation_failure(id, DomainError::NotFound);
                false
            }
            Err(e) => {
                self.record_mutation_failure(id, e);
                false
            }
        }
    }

    pub async fn assign_delivery_person(
        &mut self,
        id: Uuid,
        person_id: &str,
        person_name: &str,
    ) -> bool {
        match self
            .repo
            .assign_delivery_person(id, person_id, person_name)
            .await
        {
            Ok(true) => {
                log::info!("Order {} assigned to {}", id, person_name);
                self.mutation_error = None;
                if let Some(bucket) = self
                    .buckets
                    .find(id)
                    .and_then(|order| OrderBucket::for_status(order.status))
                {
                    self.refresh_bucket(bucket);
                }
                true
            }
            Ok(false) => {
                self.record_mutation_failure(id, DomainError::NotFound);
                false
            }
            Err(e) => {
                self.record_mutation_failure(id, e);
                false
            }
        }
    }

    // ── Applying results ─────────────────────────────────────────────────────

    /// Wait for the next task result and apply it.
    pub async fn apply_next(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    /// Apply results until nothing is in flight.
    pub async fn settle(&mut self) {
        while self.is_loading() {
            if !self.apply_next().await {
                break;
            }
        }
    }

    /// Apply whatever has already arrived without waiting.
    pub fn try_apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::ActiveSnapshot { generation, result } => {
                if generation != self.active_generation {
                    log::debug!("Discarding stale active snapshot");
                    return;
                }
                self.active_loading = false;
                match result {
                    Ok(orders) => {
                        self.buckets.active = admitted(OrderBucket::Active, orders);
                        self.bucket_errors.remove(&OrderBucket::Active);
                    }
                    Err(e) => {
                        log::warn!("Active orders feed failed: {}", e);
                        self.bucket_errors
                            .insert(OrderBucket::Active, e.to_string());
                    }
                }
            }
            BoardEvent::ActiveClosed { generation } => {
                if generation == self.active_generation {
                    log::debug!("Active orders feed closed");
                    self.active_loading = false;
                }
            }
            BoardEvent::Page {
                bucket,
                kind,
                generation,
                result,
            } => self.apply_page(bucket, kind, generation, result),
        }
        self.recompute();
    }

    fn apply_page(
        &mut self,
        bucket: OrderBucket,
        kind: PageKind,
        generation: u64,
        result: Result<OrderPage, DomainError>,
    ) {
        let Some(tab) = bucket.pagination_tab() else {
            return;
        };
        if !self.pagination.is_current(tab, generation) {
            log::debug!("Discarding stale {:?} page for {:?}", kind, bucket);
            return;
        }
        let state = self.pagination.get(tab);
        match result {
            Ok(page) => {
                let items = admitted(bucket, page.items);
                let target = self.buckets.get_mut(bucket);
                match kind {
                    PageKind::First => *target = items,
                    PageKind::Next => append_unique(target, items),
                }
                let cursor = page.next_cursor.or(state.cursor);
                self.pagination
                    .set(tab, PaginationState::loaded(cursor, page.has_more));
                self.bucket_errors.remove(&bucket);
            }
            Err(e) => {
                log::warn!("Loading {:?} orders failed: {}", bucket, e);
                self.pagination.set(tab, state.failed());
                self.bucket_errors.insert(bucket, e.to_string());
            }
        }
    }

    fn recompute(&mut self) {
        self.displayed = compute_displayed(&self.buckets, self.tab, &self.query);
    }

    fn record_mutation_failure(&mut self, id: Uuid, e: DomainError) {
        log::warn!("Updating order {} failed: {}", id, e);
        self.mutation_error = Some(e.to_string());
    }

    // ── Spawning ─────────────────────────────────────────────────────────────

    fn fetch_first_page(&mut self, bucket: OrderBucket) {
        if let Some(tab) = bucket.pagination_tab() {
            self.pagination.reset(tab);
            self.spawn_page_fetch(bucket, PageKind::First);
        }
    }

    fn spawn_page_fetch(&mut self, bucket: OrderBucket, kind: PageKind) -> bool {
        let (Some(tab), Some(status)) = (bucket.pagination_tab(), bucket.recent_status()) else {
            return false;
        };
        let state = self.pagination.get(tab);
        let cursor = match kind {
            PageKind::First => None,
            PageKind::Next => {
                if !state.can_load_more() {
                    return false;
                }
                state.cursor.clone()
            }
        };
        self.pagination.set(
            tab,
            match kind {
                PageKind::First => state.begin_initial(),
                PageKind::Next => state.begin_more(),
            },
        );
        let generation = self.pagination.generation(tab);
        log::debug!("Fetching {:?} page of {:?} orders", kind, bucket);

        let repo = Arc::clone(&self.repo);
        let tx = self.events_tx.clone();
        let scope = self.scope.clone();
        let BoardConfig {
            page_size,
            window_days,
            ..
        } = self.config;

        tokio::spawn(async move {
            // Joined separately: a panicking store surfaces as a JoinError.
            let mut fetch = tokio::spawn(async move {
                match cursor {
                    None => {
                        repo.fetch_recent_orders(status, window_days, page_size)
                            .await
                    }
                    Some(cursor) => repo.fetch_next_orders_page(status, page_size, &cursor).await,
                }
            });
            tokio::select! {
                _ = scope.cancelled() => fetch.abort(),
                joined = &mut fetch => {
                    let result = joined.unwrap_or_else(|e| Err(DomainError::from(e)));
                    let _ = tx.send(BoardEvent::Page { bucket, kind, generation, result });
                }
            }
        });
        true
    }

    fn subscribe_active(&mut self) {
        self.active_scope.cancel();
        self.active_scope = self.scope.child_token();
        self.active_generation += 1;
        self.active_loading = true;

        let generation = self.active_generation;
        let repo = Arc::clone(&self.repo);
        let tx = self.events_tx.clone();
        let token = self.active_scope.clone();

        tokio::spawn(async move {
            let subscription = tokio::select! {
                _ = token.cancelled() => return,
                result = repo.subscribe_active_orders() => result,
            };
            let mut stream = match subscription {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = tx.send(BoardEvent::ActiveSnapshot {
                        generation,
                        result: Err(e),
                    });
                    return;
                }
            };
            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    next = stream.next() => match next {
                        Some(result) => {
                            if tx.send(BoardEvent::ActiveSnapshot { generation, result }).is_err() {
                                return;
                            }
                        }
                        None => break,
                    }
                }
            }
            let _ = tx.send(BoardEvent::ActiveClosed { generation });
        });
    }
}

impl<R> Drop for OrderBoard<R> {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

/// Drop orders a store returned for the wrong bucket.
fn admitted(bucket: OrderBucket, orders: Vec<Order>) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|order| {
            let ok = bucket.admits(order.status);
            if !ok {
                log::warn!(
                    "Ignoring order {} with status {} in {:?} bucket",
                    order.id,
                    order.status,
                    bucket
                );
            }
            ok
        })
        .collect()
}

fn append_unique(target: &mut Vec<Order>, page: Vec<Order>) {
    let mut seen: HashSet<Uuid> = target.iter().map(|order| order.id).collect();
    target.extend(page.into_iter().filter(|order| seen.insert(order.id)));
}
