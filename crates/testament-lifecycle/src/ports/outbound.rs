//! # Outbound Ports (Driven Ports)
//!
//! The lifecycle service depends on a clock (the phase rule is pure in the
//! current time) and on a value-transfer boundary that settles an entire
//! payout plan atomically: either every payout commits or none does.
//!
//! Production adapters live here alongside the test doubles, mirroring how
//! the storage ports ship their in-memory implementations.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use testament_events::Payout;
use testament_types::{Address, Amount, Timestamp};
use thiserror::Error;

/// Abstract time source, for testability of the phase rule.
pub trait Clock: Send + Sync {
    /// Current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

/// System clock for production.
#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Settable clock for tests and deterministic runs.
#[derive(Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Start at a given timestamp.
    #[must_use]
    pub fn starting_at(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Jump to an absolute timestamp.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Advance by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// A value movement failed; the caller aborts the whole distribution.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransferError(pub String);

/// Atomic settlement of a payout plan.
///
/// `transfer_batch` either fully commits or fully rolls back; partial payout
/// is not representable at this boundary.
pub trait ValueTransfer: Send + Sync {
    /// Settle every payout in the plan, atomically.
    fn transfer_batch(&self, payouts: &[Payout]) -> Result<(), TransferError>;
}

/// In-memory settlement adapter that credits an internal account book.
///
/// Serves as the single-node production adapter and as the recording double
/// in tests.
#[derive(Default)]
pub struct LedgerSettlement {
    credits: Mutex<Vec<Payout>>,
}

impl LedgerSettlement {
    /// Empty account book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total credited to `wallet` across all settlements.
    #[must_use]
    pub fn credited(&self, wallet: &Address) -> Amount {
        self.credits
            .lock()
            .iter()
            .filter(|p| p.wallet == *wallet)
            .map(|p| p.amount)
            .sum()
    }

    /// Number of payout lines settled.
    #[must_use]
    pub fn settled_count(&self) -> usize {
        self.credits.lock().len()
    }
}

impl ValueTransfer for LedgerSettlement {
    fn transfer_batch(&self, payouts: &[Payout]) -> Result<(), TransferError> {
        // Single lock acquisition makes the batch atomic.
        self.credits.lock().extend_from_slice(payouts);
        Ok(())
    }
}

/// Settlement double that always fails, for abort-path tests.
pub struct FailingSettlement {
    reason: String,
}

impl FailingSettlement {
    /// Fail every batch with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ValueTransfer for FailingSettlement {
    fn transfer_batch(&self, _payouts: &[Payout]) -> Result<(), TransferError> {
        Err(TransferError(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::starting_at(1000);
        assert_eq!(clock.now(), 1000);
        clock.advance(500);
        assert_eq!(clock.now(), 1500);
        clock.set(42);
        assert_eq!(clock.now(), 42);
    }

    #[test]
    fn test_ledger_settlement_credits() {
        let settlement = LedgerSettlement::new();
        let wallet = Address::from_bytes([2u8; 20]);
        settlement
            .transfer_batch(&[
                Payout { wallet, amount: 9 },
                Payout {
                    wallet: Address::from_bytes([3u8; 20]),
                    amount: 6,
                },
            ])
            .unwrap();
        assert_eq!(settlement.credited(&wallet), 9);
        assert_eq!(settlement.settled_count(), 2);
    }

    #[test]
    fn test_failing_settlement() {
        let settlement = FailingSettlement::new("link down");
        let err = settlement.transfer_batch(&[]).unwrap_err();
        assert_eq!(err.to_string(), "link down");
    }
}
