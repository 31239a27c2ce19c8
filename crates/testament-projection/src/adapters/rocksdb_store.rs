//! # RocksDB Replica Store
//!
//! Durable replica storage with column families per record family and
//! `WriteBatch` commits, so one applied event (its mutations plus the
//! checkpoint) lands atomically.
//!
//! ## Column Families
//!
//! - `wills` — will rows keyed by testator (20 bytes)
//! - `vaults` — vault rows keyed by testator (20 bytes)
//! - `beneficiaries` — rows keyed by will ++ wallet (40 bytes)
//! - `documents` — rows keyed by will ++ hash (52 bytes)
//! - `meta` — the checkpoint (last durably applied ordering key)

use crate::domain::apply::ReplicaOp;
use crate::domain::replica::{
    BeneficiaryRecord, DocumentRecord, Replica, ReplicaStats, VaultBalances, WillRecord,
};
use crate::ports::{ReplicaReader, ReplicaStore, StoreError};
use parking_lot::RwLock;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use testament_types::{Address, ContentHash, EventKey};

/// Column family for will rows.
pub const CF_WILLS: &str = "wills";
/// Column family for vault rows.
pub const CF_VAULTS: &str = "vaults";
/// Column family for beneficiary rows.
pub const CF_BENEFICIARIES: &str = "beneficiaries";
/// Column family for document rows.
pub const CF_DOCUMENTS: &str = "documents";
/// Column family for engine metadata.
pub const CF_META: &str = "meta";

/// All column families used by the replica store.
pub const COLUMN_FAMILIES: &[&str] = &[CF_WILLS, CF_VAULTS, CF_BENEFICIARIES, CF_DOCUMENTS, CF_META];

const CHECKPOINT_KEY: &[u8] = b"checkpoint";

/// RocksDB configuration for the replica store.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory.
    pub path: String,
    /// Write buffer size in bytes.
    pub write_buffer_size: usize,
    /// Enable fsync after each write.
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/replica".to_string(),
            write_buffer_size: 64 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Config for tests: small buffers, no sync.
    #[must_use]
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed replica store.
pub struct RocksDbReplicaStore {
    db: RwLock<DB>,
    config: RocksDbConfig,
}

impl RocksDbReplicaStore {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| StoreError::Io(format!("failed to open RocksDB: {e}")))?;

        Ok(Self {
            db: RwLock::new(db),
            config,
        })
    }

    /// Open at a path with default settings.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open(RocksDbConfig {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        })
    }

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(value).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        bincode::deserialize(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn beneficiary_key(will: &Address, wallet: &Address) -> [u8; 40] {
        let mut key = [0u8; 40];
        key[..20].copy_from_slice(will.as_bytes());
        key[20..].copy_from_slice(wallet.as_bytes());
        key
    }

    fn document_key(will: &Address, hash: &ContentHash) -> [u8; 52] {
        let mut key = [0u8; 52];
        key[..20].copy_from_slice(will.as_bytes());
        key[20..].copy_from_slice(hash.as_bytes());
        key
    }

    fn get_record<T: DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>, StoreError> {
        let db = self.db.read();
        let cf = db
            .cf_handle(cf_name)
            .ok_or_else(|| StoreError::Io(format!("missing column family {cf_name}")))?;
        match db
            .get_cf(cf, key)
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_records<T: DeserializeOwned>(
        &self,
        cf_name: &str,
        prefix: Option<&[u8]>,
    ) -> Result<Vec<T>, StoreError> {
        let db = self.db.read();
        let cf = db
            .cf_handle(cf_name)
            .ok_or_else(|| StoreError::Io(format!("missing column family {cf_name}")))?;

        let mode = match prefix {
            Some(p) => IteratorMode::From(p, rocksdb::Direction::Forward),
            None => IteratorMode::Start,
        };

        let mut out = Vec::new();
        for item in db.iterator_cf(cf, mode) {
            let (key, value) = item.map_err(|e| StoreError::Io(e.to_string()))?;
            if let Some(p) = prefix {
                if !key.starts_with(p) {
                    break;
                }
            }
            out.push(Self::decode(&value)?);
        }
        Ok(out)
    }
}

impl ReplicaStore for RocksDbReplicaStore {
    fn load(&self) -> Result<(Replica, Option<EventKey>), StoreError> {
        let mut replica = Replica::default();

        for will in self.scan_records::<WillRecord>(CF_WILLS, None)? {
            replica.wills.insert(will.testator, will);
        }
        {
            let db = self.db.read();
            let cf = db
                .cf_handle(CF_VAULTS)
                .ok_or_else(|| StoreError::Io("missing column family vaults".to_string()))?;
            for item in db.iterator_cf(cf, IteratorMode::Start) {
                let (key, value) = item.map_err(|e| StoreError::Io(e.to_string()))?;
                if key.len() != 20 {
                    return Err(StoreError::Corrupt("vault key length".to_string()));
                }
                let mut addr = [0u8; 20];
                addr.copy_from_slice(&key);
                replica
                    .vaults
                    .insert(Address::from_bytes(addr), Self::decode(&value)?);
            }
        }
        for entry in self.scan_records::<BeneficiaryRecord>(CF_BENEFICIARIES, None)? {
            replica.beneficiaries.insert((entry.will, entry.wallet), entry);
        }
        for doc in self.scan_records::<DocumentRecord>(CF_DOCUMENTS, None)? {
            replica.documents.insert((doc.will, doc.hash), doc);
        }

        let checkpoint = {
            let db = self.db.read();
            let cf = db
                .cf_handle(CF_META)
                .ok_or_else(|| StoreError::Io("missing column family meta".to_string()))?;
            db.get_cf(cf, CHECKPOINT_KEY)
                .map_err(|e| StoreError::Io(e.to_string()))?
                .as_deref()
                .and_then(EventKey::from_bytes)
        };

        Ok((replica, checkpoint))
    }

    fn apply(&self, ops: &[ReplicaOp], key: EventKey) -> Result<(), StoreError> {
        let db = self.db.write();
        let mut batch = WriteBatch::default();

        for op in ops {
            match op {
                ReplicaOp::PutWill(will) => {
                    let cf = db
                        .cf_handle(CF_WILLS)
                        .ok_or_else(|| StoreError::Io("missing column family wills".to_string()))?;
                    batch.put_cf(cf, will.testator.as_bytes(), Self::encode(will)?);
                }
                ReplicaOp::PutVaults(will, vaults) => {
                    let cf = db
                        .cf_handle(CF_VAULTS)
                        .ok_or_else(|| StoreError::Io("missing column family vaults".to_string()))?;
                    batch.put_cf(cf, will.as_bytes(), Self::encode(vaults)?);
                }
                ReplicaOp::PutBeneficiary(entry) => {
                    let cf = db.cf_handle(CF_BENEFICIARIES).ok_or_else(|| {
                        StoreError::Io("missing column family beneficiaries".to_string())
                    })?;
                    batch.put_cf(
                        cf,
                        Self::beneficiary_key(&entry.will, &entry.wallet),
                        Self::encode(entry)?,
                    );
                }
                ReplicaOp::DeleteBeneficiary { will, wallet } => {
                    let cf = db.cf_handle(CF_BENEFICIARIES).ok_or_else(|| {
                        StoreError::Io("missing column family beneficiaries".to_string())
                    })?;
                    batch.delete_cf(cf, Self::beneficiary_key(will, wallet));
                }
                ReplicaOp::PutDocument(doc) => {
                    let cf = db.cf_handle(CF_DOCUMENTS).ok_or_else(|| {
                        StoreError::Io("missing column family documents".to_string())
                    })?;
                    batch.put_cf(cf, Self::document_key(&doc.will, &doc.hash), Self::encode(doc)?);
                }
                ReplicaOp::DeleteDocument { will, hash } => {
                    let cf = db.cf_handle(CF_DOCUMENTS).ok_or_else(|| {
                        StoreError::Io("missing column family documents".to_string())
                    })?;
                    batch.delete_cf(cf, Self::document_key(will, hash));
                }
            }
        }

        let meta = db
            .cf_handle(CF_META)
            .ok_or_else(|| StoreError::Io("missing column family meta".to_string()))?;
        batch.put_cf(meta, CHECKPOINT_KEY, key.to_bytes());

        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        db.write_opt(batch, &write_opts)
            .map_err(|e| StoreError::Io(format!("batch write failed: {e}")))
    }
}

impl ReplicaReader for RocksDbReplicaStore {
    fn will(&self, testator: &Address) -> Result<Option<WillRecord>, StoreError> {
        self.get_record(CF_WILLS, testator.as_bytes())
    }

    fn wills_of(&self, testator: &Address) -> Result<Vec<WillRecord>, StoreError> {
        Ok(self.will(testator)?.into_iter().collect())
    }

    fn wills_with_beneficiary(
        &self,
        wallet: &Address,
    ) -> Result<Vec<BeneficiaryRecord>, StoreError> {
        // Wallet-scoped lookups walk the whole family; acceptable at this
        // data size, and the key layout keeps will-scoped reads a prefix
        // scan.
        let all = self.scan_records::<BeneficiaryRecord>(CF_BENEFICIARIES, None)?;
        Ok(all.into_iter().filter(|b| b.wallet == *wallet).collect())
    }

    fn beneficiaries_of(&self, will: &Address) -> Result<Vec<BeneficiaryRecord>, StoreError> {
        self.scan_records(CF_BENEFICIARIES, Some(will.as_bytes()))
    }

    fn vaults_of(&self, will: &Address) -> Result<Option<VaultBalances>, StoreError> {
        self.get_record(CF_VAULTS, will.as_bytes())
    }

    fn documents_of(&self, will: &Address) -> Result<Vec<DocumentRecord>, StoreError> {
        self.scan_records(CF_DOCUMENTS, Some(will.as_bytes()))
    }

    fn document(
        &self,
        will: &Address,
        hash: &ContentHash,
    ) -> Result<Option<DocumentRecord>, StoreError> {
        self.get_record(CF_DOCUMENTS, &Self::document_key(will, hash))
    }

    fn stats(&self) -> Result<ReplicaStats, StoreError> {
        let (replica, _) = self.load()?;
        Ok(replica.stats())
    }
}
