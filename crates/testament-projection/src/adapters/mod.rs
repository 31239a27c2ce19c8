//! # Adapters
//!
//! Port implementations: the in-memory store (tests, light production), the
//! RocksDB store (durable production), and the in-process log/bus source.

pub mod log_source;
pub mod memory_store;
pub mod rocksdb_store;
