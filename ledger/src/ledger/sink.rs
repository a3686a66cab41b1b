//! # Block Sink
//!
//! Durability is a pluggable concern. The ledger calls the sink after
//! sealing each block and before acknowledging the submission; what the
//! sink does with the block is the deployment's business.
//!
//! Two implementations ship with the crate:
//!
//! - [`NullSink`] — discards everything. Volatile in-memory operation,
//!   exactly what the original session-scoped deployment did.
//! - [`JsonDirSink`] — one pretty-printed JSON file per block in a
//!   directory, `block_<index>.json`, with a loader for restart.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LedgerError;
use crate::ledger::block::Block;

/// Receives each sealed block before the ledger acknowledges it.
///
/// A sink that returns an error vetoes the seal: the ledger keeps the
/// batch pending and the chain does not advance.
pub trait BlockSink: Send {
    /// Persist (or forward, or ignore) one sealed block.
    fn persist(&mut self, block: &Block) -> Result<(), LedgerError>;
}

/// The no-op sink. Blocks live and die with the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl BlockSink for NullSink {
    fn persist(&mut self, _block: &Block) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Writes each block as `block_<index>.json` in a directory.
///
/// Pretty-printed JSON: these files double as the audit artifact a human
/// inspects when `validate()` points at a block, so legibility beats
/// compactness.
#[derive(Debug, Clone)]
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    /// Opens (creating if needed) the block directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the file holding the block at `index`.
    pub fn block_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("block_{index}.json"))
    }

    /// Loads every `*.json` block file from the directory, sorted by
    /// index. An empty directory yields an empty vector — the caller
    /// decides whether that means "fresh start" or "missing archive".
    ///
    /// # Errors
    ///
    /// I/O failure or a file that does not deserialize as a [`Block`].
    /// A malformed file is refused, not skipped: silently dropping a
    /// block would surface later as a confusing contiguity error.
    pub fn load_blocks(dir: &Path) -> Result<Vec<Block>, LedgerError> {
        fs::create_dir_all(dir)?;
        let mut blocks = Vec::new();
        for dir_entry in fs::read_dir(dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let contents = fs::read_to_string(&path)?;
            let block: Block = serde_json::from_str(&contents)?;
            blocks.push(block);
        }
        blocks.sort_by_key(|b| b.index);
        Ok(blocks)
    }
}

impl BlockSink for JsonDirSink {
    fn persist(&mut self, block: &Block) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(block)?;
        fs::write(self.block_path(block.index), json)?;
        Ok(())
    }
}
