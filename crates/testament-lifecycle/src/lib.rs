//! # Testament Lifecycle
//!
//! The authoritative will state machine. A will moves
//! `NonExistent → Active → Executed` (terminal); while active, the testator
//! edits beneficiary shares, moves value through the two custody vaults, and
//! renews the dead-man's-switch timer with check-ins. Once the timer lapses,
//! the phased-authorization rule decides who may trigger distribution:
//! nobody before the deadline, the guardian alone during the dispute window,
//! any listed beneficiary after it.
//!
//! Every successful state change appends exactly one block of events to the
//! shared [`testament_events::EventLog`] and publishes the same records live,
//! so the projection can rebuild a replica either way.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{Beneficiary, BeneficiaryLedger, DocumentRef, VaultPair, Will};
pub use domain::errors::WillError;
pub use domain::phase::ExecutionPhase;
pub use ports::outbound::{
    Clock, FailingSettlement, LedgerSettlement, ManualClock, SystemClock, TransferError,
    ValueTransfer,
};
pub use service::will_service::{ExecutionReceipt, WillService};
