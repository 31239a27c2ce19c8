//! # Service
//!
//! The application layer: validates operations against the domain, applies
//! them under the store's serialization, and emits the resulting events.

pub mod will_service;
