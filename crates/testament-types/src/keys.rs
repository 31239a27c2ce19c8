//! # Ordering Keys
//!
//! Every domain event carries an [`EventKey`]: its block position plus its
//! intra-block position. The derived lexicographic order over the two fields
//! is the total order the projection replays by, and the big-endian byte
//! encoding preserves that order for storage-level keys.

use serde::{Deserialize, Serialize};

/// Global ordering key for one event record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EventKey {
    /// Block position in the source log.
    pub block: u64,
    /// Intra-block position.
    pub index: u32,
}

impl EventKey {
    /// Encoded length in bytes.
    pub const ENCODED_LEN: usize = 12;

    /// Create a key.
    #[must_use]
    pub const fn new(block: u64, index: u32) -> Self {
        Self { block, index }
    }

    /// Big-endian encoding, order-preserving under byte comparison.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[..8].copy_from_slice(&self.block.to_be_bytes());
        out[8..].copy_from_slice(&self.index.to_be_bytes());
        out
    }

    /// Decode a big-endian encoding. Returns `None` on wrong length.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::ENCODED_LEN {
            return None;
        }
        let mut block = [0u8; 8];
        block.copy_from_slice(&bytes[..8]);
        let mut index = [0u8; 4];
        index.copy_from_slice(&bytes[8..]);
        Some(Self {
            block: u64::from_be_bytes(block),
            index: u32::from_be_bytes(index),
        })
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.block, self.index)
    }
}
