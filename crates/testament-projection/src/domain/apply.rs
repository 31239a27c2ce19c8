//! # Apply Function
//!
//! The deterministic core of the projection: `(replica, record) → replica'`,
//! keyed by event kind. Every mutation is an unconditional upsert computed
//! from authoritative absolute values carried in the event (vault events
//! carry the post-operation balance, not a delta), so re-applying a record
//! leaves the replica unchanged.
//!
//! Ordering dependency: within one will, records must arrive in emission
//! order. An update-class record for a will or beneficiary the replica has
//! never seen is skipped, not invented; that skip is the documented behavior
//! for out-of-order delivery.

use crate::domain::replica::{
    BeneficiaryRecord, DocumentRecord, Replica, VaultBalances, WillRecord,
};
use testament_events::{EventRecord, WillEvent};
use testament_types::{Address, ContentHash};

/// Storage mutation derived from one applied event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicaOp {
    /// Insert-or-replace a will row.
    PutWill(WillRecord),
    /// Insert-or-replace a vault row.
    PutVaults(Address, VaultBalances),
    /// Insert-or-replace a beneficiary row.
    PutBeneficiary(BeneficiaryRecord),
    /// Delete a beneficiary row.
    DeleteBeneficiary { will: Address, wallet: Address },
    /// Insert-or-replace a document row.
    PutDocument(DocumentRecord),
    /// Delete a document row.
    DeleteDocument { will: Address, hash: ContentHash },
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The record mutated the replica.
    Applied,
    /// The record was skipped; the reason is logged, the stream continues.
    Skipped(&'static str),
}

/// Apply one record to the replica, returning the outcome and the storage
/// mutations to persist. Pure in `(replica, record)`.
pub fn apply_event(replica: &mut Replica, record: &EventRecord) -> (ApplyOutcome, Vec<ReplicaOp>) {
    match &record.event {
        WillEvent::WillCreated {
            testator,
            check_in_period,
            dispute_period,
            created_at,
        } => {
            let will = WillRecord {
                testator: *testator,
                check_in_period: *check_in_period,
                dispute_period: *dispute_period,
                last_check_in: *created_at,
                created_at: *created_at,
                executed: false,
                executed_at: None,
                dispute_started_at: None,
            };
            let vaults = VaultBalances::default();
            replica.wills.insert(*testator, will.clone());
            replica.vaults.insert(*testator, vaults);
            (
                ApplyOutcome::Applied,
                vec![ReplicaOp::PutWill(will), ReplicaOp::PutVaults(*testator, vaults)],
            )
        }

        WillEvent::CheckIn {
            testator,
            checked_in_at,
        } => match replica.wills.get_mut(testator) {
            Some(will) => {
                will.last_check_in = *checked_in_at;
                let will = will.clone();
                (ApplyOutcome::Applied, vec![ReplicaOp::PutWill(will)])
            }
            None => (ApplyOutcome::Skipped("check-in for unknown will"), vec![]),
        },

        WillEvent::DisputeStarted {
            testator,
            started_at,
            ..
        } => match replica.wills.get_mut(testator) {
            Some(will) => {
                will.dispute_started_at = Some(*started_at);
                let will = will.clone();
                (ApplyOutcome::Applied, vec![ReplicaOp::PutWill(will)])
            }
            None => (ApplyOutcome::Skipped("dispute for unknown will"), vec![]),
        },

        WillEvent::WillExecuted {
            testator,
            executed_at,
            ..
        } => match replica.wills.get_mut(testator) {
            Some(will) => {
                will.executed = true;
                will.executed_at = Some(*executed_at);
                let will = will.clone();
                let vaults = VaultBalances::default();
                replica.vaults.insert(*testator, vaults);
                (
                    ApplyOutcome::Applied,
                    vec![ReplicaOp::PutWill(will), ReplicaOp::PutVaults(*testator, vaults)],
                )
            }
            None => (ApplyOutcome::Skipped("execution for unknown will"), vec![]),
        },

        WillEvent::BeneficiaryAdded {
            testator,
            wallet,
            share,
            guardian,
        } => {
            if !replica.wills.contains_key(testator) {
                return (ApplyOutcome::Skipped("beneficiary for unknown will"), vec![]);
            }
            let entry = BeneficiaryRecord {
                will: *testator,
                wallet: *wallet,
                share: *share,
                guardian: *guardian,
            };
            replica
                .beneficiaries
                .insert((*testator, *wallet), entry.clone());
            (ApplyOutcome::Applied, vec![ReplicaOp::PutBeneficiary(entry)])
        }

        WillEvent::BeneficiaryUpdated {
            testator,
            wallet,
            share,
            guardian,
        } => match replica.beneficiaries.get_mut(&(*testator, *wallet)) {
            Some(entry) => {
                entry.share = *share;
                entry.guardian = *guardian;
                let entry = entry.clone();
                (ApplyOutcome::Applied, vec![ReplicaOp::PutBeneficiary(entry)])
            }
            None => (
                ApplyOutcome::Skipped("update for unknown beneficiary"),
                vec![],
            ),
        },

        WillEvent::BeneficiaryRemoved { testator, wallet } => {
            match replica.beneficiaries.remove(&(*testator, *wallet)) {
                Some(_) => (
                    ApplyOutcome::Applied,
                    vec![ReplicaOp::DeleteBeneficiary {
                        will: *testator,
                        wallet: *wallet,
                    }],
                ),
                None => (
                    ApplyOutcome::Skipped("removal of unknown beneficiary"),
                    vec![],
                ),
            }
        }

        WillEvent::DepositLocked {
            testator,
            locked_balance,
            ..
        } => set_vaults(replica, testator, |v| v.locked = *locked_balance),

        WillEvent::DepositFlexible {
            testator,
            flexible_balance,
            ..
        } => set_vaults(replica, testator, |v| v.flexible = *flexible_balance),

        WillEvent::WithdrawFlexible {
            testator,
            flexible_balance,
            ..
        } => set_vaults(replica, testator, |v| v.flexible = *flexible_balance),

        WillEvent::DocumentAdded {
            testator,
            hash,
            name,
            category,
            uploaded_at,
        } => {
            if !replica.wills.contains_key(testator) {
                return (ApplyOutcome::Skipped("document for unknown will"), vec![]);
            }
            let doc = DocumentRecord {
                will: *testator,
                hash: *hash,
                name: name.clone(),
                category: category.clone(),
                uploaded_at: *uploaded_at,
            };
            replica.documents.insert((*testator, *hash), doc.clone());
            (ApplyOutcome::Applied, vec![ReplicaOp::PutDocument(doc)])
        }

        WillEvent::DocumentRemoved { testator, hash } => {
            match replica.documents.remove(&(*testator, *hash)) {
                Some(_) => (
                    ApplyOutcome::Applied,
                    vec![ReplicaOp::DeleteDocument {
                        will: *testator,
                        hash: *hash,
                    }],
                ),
                None => (ApplyOutcome::Skipped("removal of unknown document"), vec![]),
            }
        }
    }
}

/// Overwrite one vault field with the absolute balance from the event. The
/// vault row must already exist (it is created with the will).
fn set_vaults(
    replica: &mut Replica,
    testator: &Address,
    set: impl FnOnce(&mut VaultBalances),
) -> (ApplyOutcome, Vec<ReplicaOp>) {
    match replica.vaults.get_mut(testator) {
        Some(vaults) => {
            set(vaults);
            let vaults = *vaults;
            (
                ApplyOutcome::Applied,
                vec![ReplicaOp::PutVaults(*testator, vaults)],
            )
        }
        None => (ApplyOutcome::Skipped("vault event for unknown will"), vec![]),
    }
}
