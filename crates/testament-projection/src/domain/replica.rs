//! # Replica Model
//!
//! Snapshot records mirrored from the authoritative state machine. Maps are
//! `BTreeMap` so a replica serializes deterministically: two replicas built
//! from the same record sequence are byte-identical.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use testament_types::{Address, Amount, ContentHash, Timestamp};

/// Replica row for one will.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WillRecord {
    /// Will identity (the testator address).
    pub testator: Address,
    /// Seconds between required check-ins.
    pub check_in_period: u64,
    /// Seconds of guardian-only execution after the deadline.
    pub dispute_period: u64,
    /// Last dead-man's-switch renewal.
    pub last_check_in: Timestamp,
    /// Creation time.
    pub created_at: Timestamp,
    /// Terminal flag.
    pub executed: bool,
    /// When execution settled, if it has.
    pub executed_at: Option<Timestamp>,
    /// When a guardian dispute was recorded, if one was.
    pub dispute_started_at: Option<Timestamp>,
}

/// Replica row for one beneficiary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryRecord {
    /// Owning will.
    pub will: Address,
    /// Receiving wallet.
    pub wallet: Address,
    /// Percentage share.
    pub share: u8,
    /// Guardian designation.
    pub guardian: bool,
}

/// Replica row for one will's custody balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultBalances {
    /// Locked pool balance.
    pub locked: Amount,
    /// Flexible pool balance.
    pub flexible: Amount,
}

/// Replica row for one attached document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Owning will.
    pub will: Address,
    /// Content hash.
    pub hash: ContentHash,
    /// Display name.
    pub name: String,
    /// Category label.
    pub category: String,
    /// Upload timestamp.
    pub uploaded_at: Timestamp,
}

/// The full replica snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    /// Will rows keyed by testator.
    pub wills: BTreeMap<Address, WillRecord>,
    /// Vault rows keyed by will.
    pub vaults: BTreeMap<Address, VaultBalances>,
    /// Beneficiary rows keyed by (will, wallet).
    pub beneficiaries: BTreeMap<(Address, Address), BeneficiaryRecord>,
    /// Document rows keyed by (will, hash).
    pub documents: BTreeMap<(Address, ContentHash), DocumentRecord>,
}

impl Replica {
    /// Aggregate statistics over the whole replica.
    #[must_use]
    pub fn stats(&self) -> ReplicaStats {
        let executed_wills = self.wills.values().filter(|w| w.executed).count() as u64;
        let total_wills = self.wills.len() as u64;
        ReplicaStats {
            total_wills,
            executed_wills,
            active_wills: total_wills - executed_wills,
            locked_total: self.vaults.values().map(|v| v.locked).sum(),
            flexible_total: self.vaults.values().map(|v| v.flexible).sum(),
            beneficiary_entries: self.beneficiaries.len() as u64,
            documents: self.documents.len() as u64,
        }
    }
}

/// Aggregate counts and totals served by the query facade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaStats {
    /// Wills ever created.
    pub total_wills: u64,
    /// Wills in the terminal state.
    pub executed_wills: u64,
    /// Wills still active.
    pub active_wills: u64,
    /// Sum of all locked balances.
    pub locked_total: Amount,
    /// Sum of all flexible balances.
    pub flexible_total: Amount,
    /// Beneficiary entries across all wills.
    pub beneficiary_entries: u64,
    /// Document references across all wills.
    pub documents: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    #[test]
    fn test_stats() {
        let mut replica = Replica::default();
        replica.wills.insert(
            addr(1),
            WillRecord {
                testator: addr(1),
                check_in_period: 100,
                dispute_period: 50,
                last_check_in: 0,
                created_at: 0,
                executed: true,
                executed_at: Some(10),
                dispute_started_at: None,
            },
        );
        replica.vaults.insert(
            addr(1),
            VaultBalances {
                locked: 7,
                flexible: 3,
            },
        );

        let stats = replica.stats();
        assert_eq!(stats.total_wills, 1);
        assert_eq!(stats.executed_wills, 1);
        assert_eq!(stats.active_wills, 0);
        assert_eq!(stats.locked_total, 7);
        assert_eq!(stats.flexible_total, 3);
    }

    #[test]
    fn test_equal_replicas_serialize_identically() {
        let mut a = Replica::default();
        let mut b = Replica::default();
        // Insertion order differs; BTreeMap canonicalizes it.
        for byte in [3u8, 1, 2] {
            a.vaults.insert(addr(byte), VaultBalances::default());
        }
        for byte in [1u8, 2, 3] {
            b.vaults.insert(addr(byte), VaultBalances::default());
        }
        assert_eq!(
            bincode::serialize(&a).unwrap(),
            bincode::serialize(&b).unwrap()
        );
    }
}
