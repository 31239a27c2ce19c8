//! # Response Types
//!
//! JSON shapes served by the facade. Balances serialize as decimal strings;
//! they are denominated in the smallest unit and can exceed what JSON
//! consumers handle as a number.

use serde::Serialize;
use testament_projection::{
    BeneficiaryRecord, DocumentRecord, ReplicaStats, VaultBalances, WillRecord,
};

/// One will row.
#[derive(Debug, Clone, Serialize)]
pub struct WillSummary {
    /// Will identity (the testator address).
    pub id: String,
    /// Seconds between required check-ins.
    pub check_in_period: u64,
    /// Seconds of guardian-only execution after the deadline.
    pub dispute_period: u64,
    /// Last dead-man's-switch renewal.
    pub last_check_in: u64,
    /// Creation time.
    pub created_at: u64,
    /// Terminal flag.
    pub executed: bool,
    /// When execution settled, if it has.
    pub executed_at: Option<u64>,
    /// When a guardian dispute was recorded, if one was.
    pub dispute_started_at: Option<u64>,
}

impl From<WillRecord> for WillSummary {
    fn from(record: WillRecord) -> Self {
        Self {
            id: record.testator.to_string(),
            check_in_period: record.check_in_period,
            dispute_period: record.dispute_period,
            last_check_in: record.last_check_in,
            created_at: record.created_at,
            executed: record.executed,
            executed_at: record.executed_at,
            dispute_started_at: record.dispute_started_at,
        }
    }
}

/// One beneficiary row, with its share.
#[derive(Debug, Clone, Serialize)]
pub struct BeneficiaryShare {
    /// Owning will.
    pub will: String,
    /// Receiving wallet.
    pub wallet: String,
    /// Percentage share.
    pub share: u8,
    /// Guardian designation.
    pub guardian: bool,
}

impl From<BeneficiaryRecord> for BeneficiaryShare {
    fn from(record: BeneficiaryRecord) -> Self {
        Self {
            will: record.will.to_string(),
            wallet: record.wallet.to_string(),
            share: record.share,
            guardian: record.guardian,
        }
    }
}

/// Vault balances of one will.
#[derive(Debug, Clone, Serialize)]
pub struct VaultsResponse {
    /// Locked pool balance, decimal string.
    pub locked: String,
    /// Flexible pool balance, decimal string.
    pub flexible: String,
}

impl From<VaultBalances> for VaultsResponse {
    fn from(vaults: VaultBalances) -> Self {
        Self {
            locked: vaults.locked.to_string(),
            flexible: vaults.flexible.to_string(),
        }
    }
}

/// One document row.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    /// Owning will.
    pub will: String,
    /// Content hash.
    pub hash: String,
    /// Display name.
    pub name: String,
    /// Category label.
    pub category: String,
    /// Upload timestamp.
    pub uploaded_at: u64,
}

impl From<DocumentRecord> for DocumentResponse {
    fn from(record: DocumentRecord) -> Self {
        Self {
            will: record.will.to_string(),
            hash: record.hash.to_string(),
            name: record.name,
            category: record.category,
            uploaded_at: record.uploaded_at,
        }
    }
}

/// Full will detail.
#[derive(Debug, Clone, Serialize)]
pub struct WillDetail {
    /// The will row.
    pub will: WillSummary,
    /// Beneficiary rows.
    pub beneficiaries: Vec<BeneficiaryShare>,
    /// Vault balances.
    pub vaults: VaultsResponse,
    /// Document rows.
    pub documents: Vec<DocumentResponse>,
}

/// Aggregate statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Wills ever created.
    pub total_wills: u64,
    /// Wills in the terminal state.
    pub executed_wills: u64,
    /// Wills still active.
    pub active_wills: u64,
    /// Sum of locked balances, decimal string.
    pub locked_total: String,
    /// Sum of flexible balances, decimal string.
    pub flexible_total: String,
    /// Beneficiary entries across all wills.
    pub beneficiary_entries: u64,
    /// Document references across all wills.
    pub documents: u64,
}

impl From<ReplicaStats> for StatsResponse {
    fn from(stats: ReplicaStats) -> Self {
        Self {
            total_wills: stats.total_wills,
            executed_wills: stats.executed_wills,
            active_wills: stats.active_wills,
            locked_total: stats.locked_total.to_string(),
            flexible_total: stats.flexible_total.to_string(),
            beneficiary_entries: stats.beneficiary_entries,
            documents: stats.documents,
        }
    }
}
