//! # Block Structure
//!
//! A block is the atomic, immutable unit of the VERA chain. Each block
//! carries an ordered batch of entries, a link to its predecessor, and a
//! digest over its own content.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  index: u64           (0 = genesis)          │
//! │  created_at: u64      (Unix millis at seal)  │
//! │  entries: Vec<Entry>  (ordered, non-empty)   │
//! │  previous_hash: String ("0" for genesis)     │
//! │  hash: String         (SHA-256 hex)          │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Computation
//!
//! The digest covers `index || created_at || entries || previous_hash` —
//! every meaning-bearing field. Forge a timestamp, reorder entries,
//! substitute a payload, or repoint the parent link, and the recomputed
//! digest no longer matches the stored one. That mismatch is the entire
//! tamper-detection mechanism, so nothing meaningful may be left out.

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::{GENESIS_PREVIOUS_HASH, GENESIS_TAG};
use crate::crypto::sha256_hex_multi;
use crate::error::LedgerError;
use crate::ledger::entry::Entry;

/// One immutable, verifiable unit of the ledger.
///
/// Blocks are never mutated after sealing. The fields are public for
/// read access and serialization; callers must treat them as frozen —
/// the digest invariant `hash == compute_hash()` holds for the block's
/// entire lifetime, and any later disagreement signals tampering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Sequence position. 0 = genesis, strictly increasing by 1.
    pub index: u64,
    /// Unix milliseconds at seal time, from the injected clock.
    pub created_at: u64,
    /// Ordered, non-empty batch of entries owned by this block.
    pub entries: Vec<Entry>,
    /// Hex digest of the chain predecessor; `"0"` for genesis.
    pub previous_hash: String,
    /// SHA-256 hex digest over this block's own content.
    pub hash: String,
}

impl Block {
    /// Constructs the genesis block.
    ///
    /// Index 0, the `"0"` parent sentinel, and a single marker entry so
    /// the "entries are non-empty" invariant holds for every block on
    /// the chain, genesis included.
    pub fn genesis(clock: &dyn Clock) -> Self {
        let entries = vec![Entry::new().with("id", GENESIS_TAG)];
        let mut block = Block {
            index: 0,
            created_at: clock.now_millis(),
            entries,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Seals a batch of entries into a new block.
    ///
    /// Stamps `created_at` from the supplied clock and computes the
    /// digest immediately, so the block is verifiable from the moment
    /// it exists.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::EmptyBatch`] if `entries` is empty. An
    /// empty block would be unfalsifiable filler on the chain, so it is
    /// rejected rather than silently sealed.
    pub fn seal(
        index: u64,
        entries: Vec<Entry>,
        previous_hash: String,
        clock: &dyn Clock,
    ) -> Result<Self, LedgerError> {
        if entries.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }
        let mut block = Block {
            index,
            created_at: clock.now_millis(),
            entries,
            previous_hash,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        Ok(block)
    }

    /// Recomputes the digest from the current field values.
    ///
    /// Pure function of `(index, created_at, entries, previous_hash)`;
    /// integers are fed as little-endian bytes and entries through their
    /// canonical encoding, so the result is identical on every platform.
    pub fn compute_hash(&self) -> String {
        let entry_bytes: Vec<Vec<u8>> = self.entries.iter().map(Entry::canonical_bytes).collect();
        let mut parts: Vec<&[u8]> = Vec::with_capacity(3 + entry_bytes.len());
        let index_bytes = self.index.to_le_bytes();
        let created_bytes = self.created_at.to_le_bytes();
        parts.push(&index_bytes);
        parts.push(&created_bytes);
        for bytes in &entry_bytes {
            parts.push(bytes);
        }
        parts.push(self.previous_hash.as_bytes());
        sha256_hex_multi(&parts)
    }

    /// True if the stored digest matches the recomputed one.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// True for the chain's first block.
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Number of entries in this block.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Seal time rendered as RFC 3339 with millisecond precision.
    ///
    /// Display-edge convenience only — the digest always uses the raw
    /// integer. A timestamp outside chrono's representable range falls
    /// back to the raw millisecond value.
    pub fn created_at_rfc3339(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.created_at as i64)
            .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            .unwrap_or_else(|| self.created_at.to_string())
    }
}
