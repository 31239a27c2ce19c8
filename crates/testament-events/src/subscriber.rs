//! # Event Subscriber
//!
//! The subscription side of the event bus.

use crate::events::EventFilter;
use crate::record::EventRecord;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// A subscription handle for receiving event records.
pub struct Subscription {
    receiver: broadcast::Receiver<EventRecord>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<EventRecord>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next record that matches the filter.
    ///
    /// Returns `None` once the bus is dropped. A lagged receiver skips the
    /// overwritten records and keeps going; the projection recovers them via
    /// its ordering-key dedup against the log.
    pub async fn recv(&mut self) -> Option<EventRecord> {
        loop {
            let record = match self.receiver.recv().await {
                Ok(r) => r,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, records dropped");
                    continue;
                }
            };

            if self.filter.matches(&record.event) {
                return Some(record);
            }
        }
    }

    /// Try to receive the next record without blocking.
    pub fn try_recv(&mut self) -> Result<Option<EventRecord>, SubscriptionError> {
        loop {
            let record = match self.receiver.try_recv() {
                Ok(r) => r,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&record.event) {
                return Ok(Some(record));
            }
        }
    }

    /// The filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// A stream wrapper for subscriptions, for use with stream combinators.
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    /// Wrap a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }
}

impl Stream for EventStream {
    type Item = EventRecord;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(record)) => Poll::Ready(Some(record)),
            Ok(None) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionError::Closed) => Poll::Ready(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventTopic, WillEvent};
    use crate::publisher::{EventPublisher, InMemoryEventBus};
    use std::time::Duration;
    use testament_types::{Address, EventKey};
    use tokio::time::timeout;

    fn check_in(block: u64) -> EventRecord {
        EventRecord::new(
            EventKey::new(block, 0),
            WillEvent::CheckIn {
                testator: Address::from_bytes([1u8; 20]),
                checked_in_at: 0,
            },
        )
    }

    fn deposit(block: u64) -> EventRecord {
        EventRecord::new(
            EventKey::new(block, 0),
            WillEvent::DepositLocked {
                testator: Address::from_bytes([1u8; 20]),
                amount: 1,
                locked_balance: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());

        bus.publish(check_in(1)).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("record");
        assert_eq!(received.key, EventKey::new(1, 0));
    }

    #[tokio::test]
    async fn test_subscription_filter() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::Vaults]));

        bus.publish(check_in(1)).await;
        bus.publish(deposit(2)).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("record");
        assert!(matches!(
            received.event,
            WillEvent::DepositLocked { .. }
        ));
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());
        assert!(matches!(sub.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_recv_none_after_bus_drop() {
        let bus = InMemoryEventBus::new();
        let mut sub = bus.subscribe(EventFilter::all());
        drop(bus);
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_event_stream_yields_records() {
        use tokio_stream::StreamExt;

        let bus = InMemoryEventBus::new();
        let mut stream = bus.event_stream(EventFilter::all());

        bus.publish(check_in(1)).await;

        let record = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout")
            .expect("record");
        assert_eq!(record.key, EventKey::new(1, 0));
    }
}
