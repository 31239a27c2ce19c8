//! # Event Log
//!
//! Append-only, totally ordered record log. The state machine appends one
//! block per operation (an operation that emits two events lands both in the
//! same block at increasing intra-block indices), and the projection's
//! historical backfill reads ranges from here through the same apply path it
//! uses for live records.
//!
//! The log optionally enforces a bounded lookback window: range queries only
//! reach back `horizon_blocks` from the head, modeling an event source whose
//! accessible history is finite.

use crate::events::WillEvent;
use crate::record::EventRecord;
use parking_lot::RwLock;
use testament_types::EventKey;
use tracing::debug;

struct LogInner {
    records: Vec<EventRecord>,
    next_block: u64,
}

/// Append-only in-process event log.
pub struct EventLog {
    inner: RwLock<LogInner>,
    horizon_blocks: Option<u64>,
}

impl EventLog {
    /// Create a log with unbounded lookback.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LogInner {
                records: Vec::new(),
                next_block: 1,
            }),
            horizon_blocks: None,
        }
    }

    /// Create a log whose range queries reach back at most `horizon_blocks`
    /// from the head.
    #[must_use]
    pub fn with_horizon(horizon_blocks: u64) -> Self {
        Self {
            inner: RwLock::new(LogInner {
                records: Vec::new(),
                next_block: 1,
            }),
            horizon_blocks: Some(horizon_blocks),
        }
    }

    /// Append a batch of events as one block, assigning intra-block indices
    /// in order. Returns the stamped records.
    pub fn append_block(&self, events: Vec<WillEvent>) -> Vec<EventRecord> {
        let mut inner = self.inner.write();
        let block = inner.next_block;
        inner.next_block += 1;

        let records: Vec<EventRecord> = events
            .into_iter()
            .enumerate()
            .map(|(i, event)| EventRecord::new(EventKey::new(block, i as u32), event))
            .collect();

        debug!(block, count = records.len(), "Block appended to event log");
        inner.records.extend(records.iter().cloned());
        records
    }

    /// All records with key strictly greater than `after`, clamped to the
    /// accessible horizon. `None` means "from the start of the horizon".
    #[must_use]
    pub fn range_after(&self, after: Option<EventKey>) -> Vec<EventRecord> {
        let inner = self.inner.read();
        let floor_block = match (self.horizon_blocks, inner.records.last()) {
            (Some(horizon), Some(last)) => last.key.block.saturating_sub(horizon),
            _ => 0,
        };

        inner
            .records
            .iter()
            .filter(|r| r.key.block >= floor_block)
            .filter(|r| after.map_or(true, |a| r.key > a))
            .cloned()
            .collect()
    }

    /// Ordering key of the newest record, if any.
    #[must_use]
    pub fn head(&self) -> Option<EventKey> {
        self.inner.read().records.last().map(|r| r.key)
    }

    /// Total records appended (ignores the horizon).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
