//! # Testament Types
//!
//! Identity and ordering primitives shared by every crate in the workspace.
//!
//! The two load-bearing types are [`Address`] (the fixed identity format for
//! testators, beneficiaries and guardians) and [`EventKey`] (the total order
//! over the domain-event log that the projection replays).

pub mod address;
pub mod keys;

pub use address::{Address, AddressParseError, ContentHash};
pub use keys::EventKey;

/// Seconds since the Unix epoch. All lifecycle arithmetic is done in seconds.
pub type Timestamp = u64;

/// Balances are denominated in the smallest unit of value.
pub type Amount = u128;
