//! # Testament Events
//!
//! The wire contract between the will lifecycle state machine and the
//! projection engine, plus the in-process event source:
//!
//! - [`WillEvent`] / [`EventRecord`] — one immutable fact per state change,
//!   totally ordered by [`testament_types::EventKey`].
//! - [`EventLog`] — append-only log with bounded-lookback range queries; the
//!   projection's historical backfill source.
//! - [`InMemoryEventBus`] — live fan-out of freshly appended records over
//!   `tokio::sync::broadcast`.
//!
//! State changes flow one direction: the state machine appends to the log,
//! publishes to the bus, and never reads the projection back.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod log;
pub mod publisher;
pub mod record;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, Payout, WillEvent};
pub use log::EventLog;
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use record::EventRecord;
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum records to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
