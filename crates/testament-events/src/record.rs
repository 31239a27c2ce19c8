//! # Event Records
//!
//! A [`WillEvent`] stamped with its global ordering key. The replica built by
//! the projection is a pure function of the ordered record sequence.

use crate::events::WillEvent;
use serde::{Deserialize, Serialize};
use testament_types::EventKey;

/// An immutable, ordered fact from the event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Global ordering key (block position + intra-block position).
    pub key: EventKey,
    /// The event payload.
    pub event: WillEvent,
}

impl EventRecord {
    /// Create a record.
    #[must_use]
    pub fn new(key: EventKey, event: WillEvent) -> Self {
        Self { key, event }
    }
}
