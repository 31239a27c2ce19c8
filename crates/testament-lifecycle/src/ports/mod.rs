//! # Ports
//!
//! Interfaces the lifecycle service requires the host application to
//! implement.

pub mod outbound;
