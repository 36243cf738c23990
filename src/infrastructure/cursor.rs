use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Cursor, Order};

/// Keyset position `(ordered_at, id)` of the last order handed out, plus the
/// lower time bound of the query the page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetCursor {
    pub ordered_at: DateTime<Utc>,
    pub id: Uuid,
    pub since: DateTime<Utc>,
}

impl KeysetCursor {
    pub fn after(order: &Order, since: DateTime<Utc>) -> Self {
        Self {
            ordered_at: order.ordered_at,
            id: order.id,
            since,
        }
    }

    pub fn encode(&self) -> Cursor {
        Cursor(format!(
            "{}:{}:{}",
            self.ordered_at.timestamp_micros(),
            self.id,
            self.since.timestamp_micros()
        ))
    }

    pub fn decode(cursor: &Cursor) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidInput(format!("malformed cursor '{}'", cursor));
        let mut parts = cursor.as_str().splitn(3, ':');
        let (Some(ordered_at), Some(id), Some(since)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let micros = |raw: &str| {
            raw.parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_micros)
        };
        Ok(Self {
            ordered_at: micros(ordered_at).ok_or_else(invalid)?,
            id: Uuid::parse_str(id).map_err(|_| invalid())?,
            since: micros(since).ok_or_else(invalid)?,
        })
    }

    /// Whether `order` sorts strictly after this position (older, or same
    /// instant with a smaller id).
    pub fn precedes(&self, order: &Order) -> bool {
        (order.ordered_at, order.id) < (self.ordered_at, self.id)
    }
}

/// Lower bound of a `window_days` wide window ending at `now`.
pub fn window_start(now: DateTime<Utc>, window_days: u32) -> Result<DateTime<Utc>, DomainError> {
    Duration::try_days(i64::from(window_days))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            DomainError::InvalidInput(format!("window of {window_days} days is out of range"))
        })
}

/// Sort key shared by every store: newest first, id descending on ties.
pub fn newest_first(a: &Order, b: &Order) -> std::cmp::Ordering {
    (b.ordered_at, b.id).cmp(&(a.ordered_at, a.id))
}
