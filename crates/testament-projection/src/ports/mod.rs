//! # Ports
//!
//! The projection's two boundaries: where ordered records come from
//! ([`EventSource`]) and where the replica lives ([`ReplicaStore`] for the
//! single coordinating writer, [`ReplicaReader`] for the concurrent read
//! path the query facade uses).

use crate::domain::apply::ReplicaOp;
use crate::domain::replica::{
    BeneficiaryRecord, DocumentRecord, Replica, ReplicaStats, VaultBalances, WillRecord,
};
use async_trait::async_trait;
use testament_events::{EventRecord, Subscription};
use testament_types::{Address, ContentHash, EventKey};
use thiserror::Error;

/// Errors from the event source.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The source could not serve the requested range.
    #[error("event source unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the replica store. Any of these is fatal to the engine; the
/// process restarts and resumes backfill from the last durable checkpoint.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Underlying storage I/O failed.
    #[error("storage I/O failure: {0}")]
    Io(String),

    /// A stored record failed to decode.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// An ordered, replayable record source: a bounded historical range plus a
/// live subscription.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// All records with ordering key strictly greater than `after`, within
    /// the source's accessible horizon. `None` means "from the start of the
    /// horizon".
    async fn backfill(&self, after: Option<EventKey>) -> Result<Vec<EventRecord>, SourceError>;

    /// Subscribe to the live head. Callers subscribe *before* running
    /// backfill so the handoff cannot drop records; overlap is removed by
    /// ordering-key dedup, not by arrival order.
    fn live(&self) -> Subscription;
}

/// Durable replica storage, driven by a single coordinating writer.
pub trait ReplicaStore: Send + Sync {
    /// Load the full replica and the last durably applied ordering key.
    fn load(&self) -> Result<(Replica, Option<EventKey>), StoreError>;

    /// Persist one applied record: its mutations plus the checkpoint,
    /// atomically. An empty `ops` slice still advances the checkpoint
    /// (skipped records are not re-processed after restart).
    fn apply(&self, ops: &[ReplicaOp], key: EventKey) -> Result<(), StoreError>;
}

/// Read-only access to the replica. Safe for concurrent use; never mutates.
pub trait ReplicaReader: Send + Sync {
    /// One will row by identity.
    fn will(&self, testator: &Address) -> Result<Option<WillRecord>, StoreError>;

    /// Wills owned by an identity (zero or one).
    fn wills_of(&self, testator: &Address) -> Result<Vec<WillRecord>, StoreError>;

    /// Beneficiary rows naming this wallet, across all wills.
    fn wills_with_beneficiary(
        &self,
        wallet: &Address,
    ) -> Result<Vec<BeneficiaryRecord>, StoreError>;

    /// Beneficiary rows of one will.
    fn beneficiaries_of(&self, will: &Address) -> Result<Vec<BeneficiaryRecord>, StoreError>;

    /// Vault balances of one will.
    fn vaults_of(&self, will: &Address) -> Result<Option<VaultBalances>, StoreError>;

    /// Document rows of one will.
    fn documents_of(&self, will: &Address) -> Result<Vec<DocumentRecord>, StoreError>;

    /// One document row by (will, hash).
    fn document(
        &self,
        will: &Address,
        hash: &ContentHash,
    ) -> Result<Option<DocumentRecord>, StoreError>;

    /// Aggregate statistics.
    fn stats(&self) -> Result<ReplicaStats, StoreError>;
}
