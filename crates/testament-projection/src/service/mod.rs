//! # Service
//!
//! The long-lived, single-consumer projection engine.

pub mod engine;
