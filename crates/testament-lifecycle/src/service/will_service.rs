//! # Will Service
//!
//! Owns the authoritative will store and the one-direction event flow:
//! validate → mutate → append a block to the event log → publish the stamped
//! records live. One mutex serializes all state-changing operations, so no
//! two operations on the same will ever observe interleaved partial state;
//! the lock is released before any publish await.

use crate::domain::entities::Will;
use crate::domain::errors::WillError;
use crate::domain::phase::ExecutionPhase;
use crate::ports::outbound::{Clock, ValueTransfer};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use testament_events::{EventLog, EventPublisher, EventRecord, Payout, WillEvent};
use testament_types::{Address, Amount, ContentHash, Timestamp};
use tracing::{info, warn};

/// Result of a successful execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReceipt {
    /// When the distribution settled.
    pub executed_at: Timestamp,
    /// Sum of all payouts (dust excluded).
    pub total_distributed: Amount,
    /// Per-beneficiary payout lines.
    pub payouts: Vec<Payout>,
}

/// The will lifecycle state machine's state-changing surface.
pub struct WillService {
    wills: Mutex<HashMap<Address, Will>>,
    clock: Arc<dyn Clock>,
    settlement: Arc<dyn ValueTransfer>,
    log: Arc<EventLog>,
    bus: Arc<dyn EventPublisher>,
}

impl WillService {
    /// Wire a service over its ports.
    pub fn new(
        clock: Arc<dyn Clock>,
        settlement: Arc<dyn ValueTransfer>,
        log: Arc<EventLog>,
        bus: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            wills: Mutex::new(HashMap::new()),
            clock,
            settlement,
            log,
            bus,
        }
    }

    /// Snapshot of a will, if it exists. Read-only; external consumers query
    /// the projection instead.
    #[must_use]
    pub fn will(&self, testator: &Address) -> Option<Will> {
        self.wills.lock().get(testator).cloned()
    }

    /// Create the caller's will. One will per identity, ever.
    pub async fn create_will(
        &self,
        caller: Address,
        check_in_period: u64,
        dispute_period: u64,
    ) -> Result<(), WillError> {
        if check_in_period == 0 || dispute_period == 0 {
            return Err(WillError::InvalidInput(
                "check-in and dispute periods must be positive".to_string(),
            ));
        }

        let records = {
            let mut wills = self.wills.lock();
            if wills.contains_key(&caller) {
                return Err(WillError::AlreadyExists(caller));
            }
            let now = self.clock.now();
            wills.insert(caller, Will::new(caller, check_in_period, dispute_period, now));
            self.log.append_block(vec![WillEvent::WillCreated {
                testator: caller,
                check_in_period,
                dispute_period,
                created_at: now,
            }])
        };

        info!(testator = %caller, check_in_period, dispute_period, "Will created");
        self.publish(records).await;
        Ok(())
    }

    /// Renew the caller's dead-man's-switch timer.
    pub async fn check_in(&self, caller: Address) -> Result<(), WillError> {
        let records = {
            let mut wills = self.wills.lock();
            let will = Self::get_mut(&mut wills, &caller)?;
            let now = self.clock.now();
            will.check_in(now)?;
            self.log.append_block(vec![WillEvent::CheckIn {
                testator: caller,
                checked_in_at: now,
            }])
        };

        self.publish(records).await;
        Ok(())
    }

    /// Append a beneficiary to the caller's will.
    pub async fn add_beneficiary(
        &self,
        caller: Address,
        wallet: Address,
        share: u8,
        guardian: bool,
    ) -> Result<(), WillError> {
        let records = {
            let mut wills = self.wills.lock();
            let will = Self::get_mut(&mut wills, &caller)?;
            will.add_beneficiary(wallet, share, guardian)?;
            self.log.append_block(vec![WillEvent::BeneficiaryAdded {
                testator: caller,
                wallet,
                share,
                guardian,
            }])
        };

        self.publish(records).await;
        Ok(())
    }

    /// Replace a beneficiary's share and guardian flag on the caller's will.
    pub async fn update_beneficiary(
        &self,
        caller: Address,
        wallet: Address,
        share: u8,
        guardian: bool,
    ) -> Result<(), WillError> {
        let records = {
            let mut wills = self.wills.lock();
            let will = Self::get_mut(&mut wills, &caller)?;
            will.update_beneficiary(wallet, share, guardian)?;
            self.log.append_block(vec![WillEvent::BeneficiaryUpdated {
                testator: caller,
                wallet,
                share,
                guardian,
            }])
        };

        self.publish(records).await;
        Ok(())
    }

    /// Remove a beneficiary from the caller's will.
    pub async fn remove_beneficiary(
        &self,
        caller: Address,
        wallet: Address,
    ) -> Result<(), WillError> {
        let records = {
            let mut wills = self.wills.lock();
            let will = Self::get_mut(&mut wills, &caller)?;
            will.remove_beneficiary(wallet)?;
            self.log.append_block(vec![WillEvent::BeneficiaryRemoved {
                testator: caller,
                wallet,
            }])
        };

        self.publish(records).await;
        Ok(())
    }

    /// Deposit into the caller's locked vault.
    pub async fn deposit_locked(&self, caller: Address, amount: Amount) -> Result<(), WillError> {
        let records = {
            let mut wills = self.wills.lock();
            let will = Self::get_mut(&mut wills, &caller)?;
            let locked_balance = will.deposit_locked(amount)?;
            self.log.append_block(vec![WillEvent::DepositLocked {
                testator: caller,
                amount,
                locked_balance,
            }])
        };

        self.publish(records).await;
        Ok(())
    }

    /// Deposit into the caller's flexible vault.
    pub async fn deposit_flexible(&self, caller: Address, amount: Amount) -> Result<(), WillError> {
        let records = {
            let mut wills = self.wills.lock();
            let will = Self::get_mut(&mut wills, &caller)?;
            let flexible_balance = will.deposit_flexible(amount)?;
            self.log.append_block(vec![WillEvent::DepositFlexible {
                testator: caller,
                amount,
                flexible_balance,
            }])
        };

        self.publish(records).await;
        Ok(())
    }

    /// Withdraw from the caller's flexible vault, releasing value back to the
    /// caller. The locked vault has no withdrawal path.
    pub async fn withdraw_flexible(
        &self,
        caller: Address,
        amount: Amount,
    ) -> Result<(), WillError> {
        let records = {
            let mut wills = self.wills.lock();
            let will = Self::get_mut(&mut wills, &caller)?;
            let flexible_balance = will.withdraw_flexible(amount)?;
            self.settlement
                .transfer_batch(&[Payout {
                    wallet: caller,
                    amount,
                }])
                .map_err(|e| WillError::TransferFailure(e.to_string()))?;
            self.log.append_block(vec![WillEvent::WithdrawFlexible {
                testator: caller,
                amount,
                flexible_balance,
            }])
        };

        self.publish(records).await;
        Ok(())
    }

    /// Attach a document reference to the caller's will.
    pub async fn add_document(
        &self,
        caller: Address,
        hash: ContentHash,
        name: String,
        category: String,
    ) -> Result<(), WillError> {
        let records = {
            let mut wills = self.wills.lock();
            let will = Self::get_mut(&mut wills, &caller)?;
            let now = self.clock.now();
            will.add_document(hash, name.clone(), category.clone(), now)?;
            self.log.append_block(vec![WillEvent::DocumentAdded {
                testator: caller,
                hash,
                name,
                category,
                uploaded_at: now,
            }])
        };

        self.publish(records).await;
        Ok(())
    }

    /// Detach a document reference from the caller's will.
    pub async fn remove_document(
        &self,
        caller: Address,
        hash: ContentHash,
    ) -> Result<(), WillError> {
        let records = {
            let mut wills = self.wills.lock();
            let will = Self::get_mut(&mut wills, &caller)?;
            will.remove_document(hash)?;
            self.log.append_block(vec![WillEvent::DocumentRemoved {
                testator: caller,
                hash,
            }])
        };

        self.publish(records).await;
        Ok(())
    }

    /// Execute `testator`'s will as `caller`, under the phased-authorization
    /// rule. On success every beneficiary receives `floor(total * share /
    /// 100)`, both vaults zero, and the will enters its terminal state.
    ///
    /// Settlement is all-or-nothing: a transfer failure aborts the entire
    /// execution and leaves the will untouched.
    pub async fn execute_will(
        &self,
        caller: Address,
        testator: Address,
    ) -> Result<ExecutionReceipt, WillError> {
        let (receipt, records) = {
            let mut wills = self.wills.lock();
            let will = Self::get_mut(&mut wills, &testator)?;
            let now = self.clock.now();

            let phase = will.authorize_execution(&caller, now)?;
            let (total_distributed, payouts) = will.distribution()?;

            if let Err(e) = self.settlement.transfer_batch(&payouts) {
                warn!(testator = %testator, error = %e, "Distribution aborted");
                return Err(WillError::TransferFailure(e.to_string()));
            }
            will.mark_executed();

            let mut events = Vec::with_capacity(2);
            if phase == ExecutionPhase::Dispute {
                events.push(WillEvent::DisputeStarted {
                    testator,
                    guardian: caller,
                    started_at: now,
                });
            }
            events.push(WillEvent::WillExecuted {
                testator,
                executed_by: caller,
                executed_at: now,
                total_distributed,
                payouts: payouts.clone(),
            });

            let receipt = ExecutionReceipt {
                executed_at: now,
                total_distributed,
                payouts,
            };
            (receipt, self.log.append_block(events))
        };

        info!(
            testator = %testator,
            executed_by = %caller,
            total = %receipt.total_distributed,
            "Will executed"
        );
        self.publish(records).await;
        Ok(receipt)
    }

    fn get_mut<'a>(
        wills: &'a mut HashMap<Address, Will>,
        testator: &Address,
    ) -> Result<&'a mut Will, WillError> {
        wills
            .get_mut(testator)
            .ok_or_else(|| WillError::NotFound(format!("will {testator}")))
    }

    async fn publish(&self, records: Vec<EventRecord>) {
        for record in records {
            self.bus.publish(record).await;
        }
    }
}
