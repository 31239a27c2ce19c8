//! # Event Publisher
//!
//! The publishing side of the event bus.

use crate::events::EventFilter;
use crate::record::EventRecord;
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing event records to the live bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a record to the bus.
    ///
    /// Returns the number of active subscribers that received it.
    async fn publish(&self, record: EventRecord) -> usize;

    /// Total records published.
    fn records_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics. Suitable for single-node operation; a distributed deployment
/// would substitute a ledger-backed implementation behind the same trait.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<EventRecord>,
    records_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with a specific channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            records_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to records matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "New subscription created");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Convenience: a `tokio_stream::Stream` of matching records.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, record: EventRecord) -> usize {
        let kind = record.event.kind();
        let key = record.key;

        self.records_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(record) {
            Ok(receiver_count) => {
                debug!(kind, key = %key, receivers = receiver_count, "Record published");
                receiver_count
            }
            Err(e) => {
                // No receivers; backfill from the log still covers the record
                warn!(kind, key = %key, error = %e, "Record dropped (no receivers)");
                0
            }
        }
    }

    fn records_published(&self) -> u64 {
        self.records_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WillEvent;
    use testament_types::{Address, EventKey};

    fn record(block: u64) -> EventRecord {
        EventRecord::new(
            EventKey::new(block, 0),
            WillEvent::CheckIn {
                testator: Address::from_bytes([1u8; 20]),
                checked_in_at: 0,
            },
        )
    }

    #[tokio::test]
    async fn test_publish_no_subscribers() {
        let bus = InMemoryEventBus::new();
        let receivers = bus.publish(record(1)).await;
        assert_eq!(receivers, 0);
        assert_eq!(bus.records_published(), 1);
    }

    #[tokio::test]
    async fn test_publish_with_subscriber() {
        let bus = InMemoryEventBus::new();
        let _sub = bus.subscribe(EventFilter::all());

        let receivers = bus.publish(record(1)).await;
        assert_eq!(receivers, 1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = InMemoryEventBus::new();
        let _a = bus.subscribe(EventFilter::all());
        let _b = bus.subscribe(EventFilter::all());

        let receivers = bus.publish(record(1)).await;
        assert_eq!(receivers, 2);
    }

    #[test]
    fn test_custom_capacity() {
        let bus = InMemoryEventBus::with_capacity(64);
        assert_eq!(bus.capacity(), 64);
    }
}
