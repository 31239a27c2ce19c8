//! # Domain Errors
//!
//! Lifecycle-rule violations are deterministic given will state and time, so
//! they surface immediately and verbatim; none of them is retryable without
//! the underlying condition changing.

use testament_types::{Address, Amount};
use thiserror::Error;

/// Errors from will lifecycle, share ledger, and vault custody operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WillError {
    /// Malformed argument (wallet shape, share range, period value).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A deposit or withdrawal of zero value.
    #[error("Invalid amount: must be positive")]
    InvalidAmount,

    /// Missing will, beneficiary, or document.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller already has a will.
    #[error("Will already exists for {0}")]
    AlreadyExists(Address),

    /// The will has been executed; no further mutation is permitted.
    #[error("Will already executed")]
    WillExecuted,

    /// The wallet is already a beneficiary of this will.
    #[error("Duplicate beneficiary: {0}")]
    DuplicateBeneficiary(Address),

    /// A guardian is already designated.
    #[error("Guardian conflict: a guardian is already designated")]
    GuardianConflict,

    /// The mutation would push total shares past 100.
    #[error("Share overflow: total would be {total}")]
    ShareOverflow { total: u32 },

    /// Execution requires total shares of exactly 100.
    #[error("Shares incomplete: total is {total}, execution requires exactly 100")]
    SharesIncomplete { total: u32 },

    /// Execution requires funds in at least one vault.
    #[error("No funds to distribute")]
    NoFunds,

    /// Withdrawal exceeds the flexible balance.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    /// Execution attempted before the check-in deadline has passed.
    #[error("Phase not elapsed: check-in deadline has not passed")]
    PhaseNotElapsed,

    /// The caller is not permitted to execute in the current phase.
    #[error("Unauthorized caller: {0}")]
    Unauthorized(Address),

    /// Value movement failed; the whole distribution was aborted.
    #[error("Transfer failure: {0}")]
    TransferFailure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = WillError::ShareOverflow { total: 110 };
        assert!(err.to_string().contains("110"));

        let err = WillError::InsufficientBalance {
            requested: 10,
            available: 5,
        };
        assert!(err.to_string().contains("requested 10"));
    }
}
