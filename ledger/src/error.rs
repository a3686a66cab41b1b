//! Error types for the VERA ledger.
//!
//! Normal operation has almost no failure modes: sealing cannot fail for a
//! well-formed batch, and an invalid chain is reported through
//! [`ValidationReport`](crate::ledger::chain::ValidationReport), not through
//! an error. What remains is construction misuse, sink I/O, and restoring
//! a chain that turns out to be damaged.

use thiserror::Error;

use crate::ledger::chain::ValidationFault;

/// Errors that can occur while constructing, persisting, or restoring
/// the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A block was asked to seal zero entries. The ledger never does this
    /// on its own; it only seals a full buffer.
    #[error("cannot seal a block with an empty batch")]
    EmptyBatch,

    /// The configured batch size was zero.
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),

    /// The block sink failed to persist a sealed block. The batch stays
    /// pending so the caller can retry the submission.
    #[error("block sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A block could not be serialized to, or deserialized from, JSON.
    #[error("block serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV export failed while writing rows.
    #[error("csv export error: {0}")]
    Csv(#[from] csv::Error),

    /// A restored chain had a gap or duplicate in its block indexes.
    #[error("restored chain is not contiguous: expected index {expected}, got {got}")]
    NonContiguous {
        /// The index the chain position requires.
        expected: u64,
        /// The index actually found at that position.
        got: u64,
    },

    /// A restored chain contained no genesis block.
    #[error("restored chain is empty — no genesis block")]
    MissingGenesis,

    /// A restored chain failed hash validation.
    #[error("restored chain failed validation: {0}")]
    CorruptChain(ValidationFault),
}
