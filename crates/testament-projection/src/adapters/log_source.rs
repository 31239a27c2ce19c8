//! # Log Event Source
//!
//! The in-process source: historical ranges come from the shared
//! [`EventLog`], the live head from the broadcast bus. Both deliver the same
//! stamped records, so the engine's apply path cannot tell them apart.

use crate::ports::{EventSource, SourceError};
use async_trait::async_trait;
use std::sync::Arc;
use testament_events::{EventFilter, EventLog, EventRecord, InMemoryEventBus, Subscription};
use testament_types::EventKey;

/// Event source over the in-process log and bus.
pub struct LogEventSource {
    log: Arc<EventLog>,
    bus: Arc<InMemoryEventBus>,
}

impl LogEventSource {
    /// Wire a source over the shared log and bus.
    pub fn new(log: Arc<EventLog>, bus: Arc<InMemoryEventBus>) -> Self {
        Self { log, bus }
    }
}

#[async_trait]
impl EventSource for LogEventSource {
    async fn backfill(&self, after: Option<EventKey>) -> Result<Vec<EventRecord>, SourceError> {
        Ok(self.log.range_after(after))
    }

    fn live(&self) -> Subscription {
        self.bus.subscribe(EventFilter::all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testament_events::{EventPublisher, WillEvent};
    use testament_types::Address;

    #[tokio::test]
    async fn test_backfill_and_live_deliver_the_same_records() {
        let log = Arc::new(EventLog::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let source = LogEventSource::new(log.clone(), bus.clone());

        let mut live = source.live();
        let records = log.append_block(vec![WillEvent::CheckIn {
            testator: Address::from_bytes([1u8; 20]),
            checked_in_at: 5,
        }]);
        for record in &records {
            bus.publish(record.clone()).await;
        }

        let from_backfill = source.backfill(None).await.unwrap();
        let from_live = live.recv().await.unwrap();
        assert_eq!(from_backfill, vec![from_live]);
    }
}
