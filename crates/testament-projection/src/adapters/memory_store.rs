//! # In-Memory Replica Store
//!
//! `Replica` behind one `parking_lot::RwLock`: the engine is the only
//! writer, readers never block each other, and `apply` commits mutations
//! plus checkpoint under a single write-lock acquisition.

use crate::domain::apply::ReplicaOp;
use crate::domain::replica::{
    BeneficiaryRecord, DocumentRecord, Replica, ReplicaStats, VaultBalances, WillRecord,
};
use crate::ports::{ReplicaReader, ReplicaStore, StoreError};
use parking_lot::RwLock;
use testament_types::{Address, ContentHash, EventKey};

struct State {
    replica: Replica,
    checkpoint: Option<EventKey>,
}

/// Replica store backed by process memory.
pub struct MemoryReplicaStore {
    state: RwLock<State>,
}

impl MemoryReplicaStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                replica: Replica::default(),
                checkpoint: None,
            }),
        }
    }

    /// Current replica snapshot (cloned), for equality assertions in tests.
    #[must_use]
    pub fn snapshot(&self) -> Replica {
        self.state.read().replica.clone()
    }
}

impl Default for MemoryReplicaStore {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn apply_op(replica: &mut Replica, op: &ReplicaOp) {
    match op {
        ReplicaOp::PutWill(will) => {
            replica.wills.insert(will.testator, will.clone());
        }
        ReplicaOp::PutVaults(will, vaults) => {
            replica.vaults.insert(*will, *vaults);
        }
        ReplicaOp::PutBeneficiary(entry) => {
            replica
                .beneficiaries
                .insert((entry.will, entry.wallet), entry.clone());
        }
        ReplicaOp::DeleteBeneficiary { will, wallet } => {
            replica.beneficiaries.remove(&(*will, *wallet));
        }
        ReplicaOp::PutDocument(doc) => {
            replica.documents.insert((doc.will, doc.hash), doc.clone());
        }
        ReplicaOp::DeleteDocument { will, hash } => {
            replica.documents.remove(&(*will, *hash));
        }
    }
}

impl ReplicaStore for MemoryReplicaStore {
    fn load(&self) -> Result<(Replica, Option<EventKey>), StoreError> {
        let state = self.state.read();
        Ok((state.replica.clone(), state.checkpoint))
    }

    fn apply(&self, ops: &[ReplicaOp], key: EventKey) -> Result<(), StoreError> {
        let mut state = self.state.write();
        for op in ops {
            apply_op(&mut state.replica, op);
        }
        state.checkpoint = Some(key);
        Ok(())
    }
}

impl ReplicaReader for MemoryReplicaStore {
    fn will(&self, testator: &Address) -> Result<Option<WillRecord>, StoreError> {
        Ok(self.state.read().replica.wills.get(testator).cloned())
    }

    fn wills_of(&self, testator: &Address) -> Result<Vec<WillRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .replica
            .wills
            .get(testator)
            .cloned()
            .into_iter()
            .collect())
    }

    fn wills_with_beneficiary(
        &self,
        wallet: &Address,
    ) -> Result<Vec<BeneficiaryRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .replica
            .beneficiaries
            .values()
            .filter(|b| b.wallet == *wallet)
            .cloned()
            .collect())
    }

    fn beneficiaries_of(&self, will: &Address) -> Result<Vec<BeneficiaryRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .replica
            .beneficiaries
            .range((*will, Address::ZERO)..)
            .take_while(|((w, _), _)| w == will)
            .map(|(_, b)| b.clone())
            .collect())
    }

    fn vaults_of(&self, will: &Address) -> Result<Option<VaultBalances>, StoreError> {
        Ok(self.state.read().replica.vaults.get(will).copied())
    }

    fn documents_of(&self, will: &Address) -> Result<Vec<DocumentRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .replica
            .documents
            .range((*will, ContentHash::from_bytes([0u8; 32]))..)
            .take_while(|((w, _), _)| w == will)
            .map(|(_, d)| d.clone())
            .collect())
    }

    fn document(
        &self,
        will: &Address,
        hash: &ContentHash,
    ) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(self
            .state
            .read()
            .replica
            .documents
            .get(&(*will, *hash))
            .cloned())
    }

    fn stats(&self) -> Result<ReplicaStats, StoreError> {
        Ok(self.state.read().replica.stats())
    }
}
