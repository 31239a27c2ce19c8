//! # Testament Projection
//!
//! Consumes the ordered stream of will events (historical backfill first,
//! then the live head) and deterministically reconstructs a queryable
//! replica: will records, beneficiary shares, vault balances, documents.
//!
//! The replica is a pure function of the ordered record sequence. Applying
//! the same sequence twice yields byte-identical content, and records at the
//! backfill/live boundary are deduplicated by ordering key, so duplicates
//! are harmless and gaps cannot pass silently once a record is durably
//! checkpointed.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::log_source::LogEventSource;
pub use adapters::memory_store::MemoryReplicaStore;
pub use adapters::rocksdb_store::{RocksDbConfig, RocksDbReplicaStore};
pub use domain::apply::{apply_event, ApplyOutcome, ReplicaOp};
pub use domain::replica::{
    BeneficiaryRecord, DocumentRecord, Replica, ReplicaStats, VaultBalances, WillRecord,
};
pub use ports::{EventSource, ReplicaReader, ReplicaStore, SourceError, StoreError};
pub use service::engine::{ProjectionEngine, ProjectionError};
