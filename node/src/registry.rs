//! # Voter Registry
//!
//! One submission per voter identity, enforced ahead of the ledger. The
//! ledger itself never deduplicates — an append log that second-guessed
//! its callers would no longer be an append log — so the identity check
//! lives here, in the embedding service.
//!
//! The registry is a plain in-memory set. On startup it is primed from
//! the restored chain so a restart does not re-open the polls for voters
//! whose ballots are already sealed.

use std::collections::HashSet;

use parking_lot::Mutex;

use vera_ledger::config::GENESIS_TAG;
use vera_ledger::Block;

/// Set-membership check for voter identities.
pub struct VoterRegistry {
    seen: Mutex<HashSet<String>>,
}

impl VoterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Primes a registry from sealed blocks: every `id` field found in a
    /// chain entry counts as having voted. The genesis marker is skipped.
    pub fn from_blocks(blocks: &[Block]) -> Self {
        let registry = Self::new();
        {
            let mut seen = registry.seen.lock();
            for block in blocks {
                for entry in &block.entries {
                    if let Some(id) = entry.get("id") {
                        if id != GENESIS_TAG {
                            seen.insert(id.to_string());
                        }
                    }
                }
            }
        }
        registry
    }

    /// Claims an identity. Returns `true` the first time, `false` for
    /// every repeat — the caller rejects the duplicate submission.
    pub fn try_claim(&self, id: &str) -> bool {
        self.seen.lock().insert(id.to_string())
    }

    /// Number of identities that have voted.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// True if nobody has voted yet.
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

impl Default for VoterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
