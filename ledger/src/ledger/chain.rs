//! # Ledger
//!
//! The single-writer append log: buffers entries, seals a block every time
//! the buffer fills, and certifies chain integrity on demand.
//!
//! ## Lifecycle
//!
//! ```text
//! EMPTY ──(genesis sealed at construction)──▶ ACCUMULATING
//!    ACCUMULATING ──(buffer reaches batch_size)──▶ SEALED
//!    SEALED ──(buffer cleared)──▶ ACCUMULATING
//! ```
//!
//! The chain never returns to `EMPTY` and there is no terminal state; the
//! ledger accepts entries indefinitely.
//!
//! ## Concurrency discipline
//!
//! A `Ledger` is a shared mutable resource. `submit_entry` — the whole
//! append-and-possibly-seal sequence — must run as one critical section,
//! and readers must not interleave with an in-progress seal. The embedding
//! application enforces this; the reference node wraps the ledger in a
//! single `Mutex` shared by writers and readers. Hashing two entries is
//! microseconds of work, so a blocking lock is the right tool.

use std::fmt;

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::error::LedgerError;
use crate::ledger::block::Block;
use crate::ledger::entry::Entry;
use crate::ledger::sink::{BlockSink, NullSink};

/// Outcome of a single [`Ledger::submit_entry`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seal {
    /// The entry joined the pending buffer; no block was sealed.
    Buffered,
    /// The entry completed a batch and a block was sealed at this index.
    Sealed(u64),
}

/// The first integrity fault found while walking the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFault {
    /// A block's stored digest disagrees with its recomputed digest —
    /// the block's own content was altered after sealing.
    HashMismatch {
        /// Index of the offending block.
        index: u64,
    },
    /// A block's `previous_hash` does not point at its predecessor —
    /// the link between two blocks was severed or redirected.
    BrokenLink {
        /// Index of the block whose parent link is wrong.
        index: u64,
    },
}

impl fmt::Display for ValidationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFault::HashMismatch { index } => {
                write!(f, "hash mismatch at block {index}")
            }
            ValidationFault::BrokenLink { index } => {
                write!(f, "broken parent link at block {index}")
            }
        }
    }
}

/// Result of a full-chain integrity walk.
///
/// "Invalid" is a designed signal, not an exception: the report names the
/// first block where integrity broke so an operator has somewhere to start
/// forensics, instead of a bare boolean shrug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    fault: Option<ValidationFault>,
}

impl ValidationReport {
    fn valid() -> Self {
        Self { fault: None }
    }

    fn invalid(fault: ValidationFault) -> Self {
        Self { fault: Some(fault) }
    }

    /// True if the whole chain passed.
    pub fn is_valid(&self) -> bool {
        self.fault.is_none()
    }

    /// The first fault found, if any.
    pub fn fault(&self) -> Option<&ValidationFault> {
        self.fault.as_ref()
    }
}

/// The hash-chained append log.
///
/// Owns the ordered block sequence and the pending-entry buffer. Mutated
/// only through [`submit_entry`](Ledger::submit_entry); everything else
/// is a read.
pub struct Ledger {
    /// Sealed blocks in order. Index 0 is always genesis; never empty.
    chain: Vec<Block>,
    /// Entries awaiting batching. Holds 0..batch_size-1 entries between
    /// seals (briefly batch_size inside `submit_entry`, or after a sink
    /// failure left a batch behind for retry).
    pending: Vec<Entry>,
    batch_size: usize,
    clock: Box<dyn Clock>,
    sink: Box<dyn BlockSink>,
}

impl Ledger {
    /// Creates a volatile ledger: system clock, no persistence.
    ///
    /// Seals the genesis block immediately.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidBatchSize`] if `batch_size` is zero.
    pub fn new(batch_size: usize) -> Result<Self, LedgerError> {
        Self::with_parts(batch_size, Box::new(SystemClock), Box::new(NullSink))
    }

    /// Creates a ledger with an explicit clock and block sink.
    ///
    /// The genesis block is sealed and handed to the sink before the
    /// ledger is returned, so a durable sink always holds block 0.
    pub fn with_parts(
        batch_size: usize,
        clock: Box<dyn Clock>,
        mut sink: Box<dyn BlockSink>,
    ) -> Result<Self, LedgerError> {
        if batch_size == 0 {
            return Err(LedgerError::InvalidBatchSize(0));
        }
        let genesis = Block::genesis(clock.as_ref());
        sink.persist(&genesis)?;
        tracing::info!(hash = %genesis.hash, "genesis block sealed");
        Ok(Self {
            chain: vec![genesis],
            pending: Vec::new(),
            batch_size,
            clock,
            sink,
        })
    }

    /// Rebuilds a ledger from previously persisted blocks.
    ///
    /// The restored chain must be non-empty, contiguous from index 0, and
    /// pass full validation — a damaged archive is refused outright rather
    /// than silently extended.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingGenesis`], [`LedgerError::NonContiguous`],
    /// [`LedgerError::CorruptChain`], or
    /// [`LedgerError::InvalidBatchSize`].
    pub fn restore(
        blocks: Vec<Block>,
        batch_size: usize,
        clock: Box<dyn Clock>,
        sink: Box<dyn BlockSink>,
    ) -> Result<Self, LedgerError> {
        if batch_size == 0 {
            return Err(LedgerError::InvalidBatchSize(0));
        }
        if blocks.is_empty() {
            return Err(LedgerError::MissingGenesis);
        }
        for (position, block) in blocks.iter().enumerate() {
            if block.index != position as u64 {
                return Err(LedgerError::NonContiguous {
                    expected: position as u64,
                    got: block.index,
                });
            }
        }
        let ledger = Self {
            chain: blocks,
            pending: Vec::new(),
            batch_size,
            clock,
            sink,
        };
        let report = ledger.validate();
        if let Some(fault) = report.fault() {
            return Err(LedgerError::CorruptChain(*fault));
        }
        tracing::info!(height = ledger.len(), "ledger restored from sink");
        Ok(ledger)
    }

    /// Appends an entry, sealing a block if the batch fills.
    ///
    /// One atomic append-and-possibly-seal step: when the pending buffer
    /// reaches `batch_size`, the batch becomes a block linked to the
    /// current tip, the sink persists it, and only then is it appended to
    /// the chain. Exactly one block per `batch_size` submissions.
    ///
    /// # Errors
    ///
    /// Only the sink can fail here. On sink failure the batch returns to
    /// the pending buffer, so the next submission retries the seal and no
    /// entry is lost.
    pub fn submit_entry(&mut self, entry: Entry) -> Result<Seal, LedgerError> {
        self.pending.push(entry);
        if self.pending.len() < self.batch_size {
            return Ok(Seal::Buffered);
        }

        let batch = std::mem::take(&mut self.pending);
        let tip = self.latest_block();
        // Batch is non-empty by construction, so seal cannot reject it.
        let block = Block::seal(tip.index + 1, batch, tip.hash.clone(), self.clock.as_ref())?;

        if let Err(e) = self.sink.persist(&block) {
            self.pending = block.entries;
            return Err(e);
        }

        let index = block.index;
        tracing::debug!(index, entries = block.entry_count(), "block sealed");
        self.chain.push(block);
        Ok(Seal::Sealed(index))
    }

    /// Walks the whole chain and reports the first integrity fault.
    ///
    /// Checks the genesis block's own digest too — block 0 gets no free
    /// pass — then, for every adjacent pair, the current block's digest
    /// and its parent link. Short-circuits at the first fault; a pure
    /// read either way.
    pub fn validate(&self) -> ValidationReport {
        if !self.chain[0].verify() {
            let fault = ValidationFault::HashMismatch { index: 0 };
            tracing::warn!(%fault, "chain validation failed");
            return ValidationReport::invalid(fault);
        }
        for pair in self.chain.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if !current.verify() {
                let fault = ValidationFault::HashMismatch {
                    index: current.index,
                };
                tracing::warn!(%fault, "chain validation failed");
                return ValidationReport::invalid(fault);
            }
            if current.previous_hash != previous.hash {
                let fault = ValidationFault::BrokenLink {
                    index: current.index,
                };
                tracing::warn!(%fault, "chain validation failed");
                return ValidationReport::invalid(fault);
            }
        }
        ValidationReport::valid()
    }

    /// The last sealed block. Always exists — genesis at minimum.
    pub fn latest_block(&self) -> &Block {
        // Chain is never empty: genesis is sealed at construction and
        // restore refuses an empty archive.
        &self.chain[self.chain.len() - 1]
    }

    /// The last `n` blocks in chain order (oldest first), or the whole
    /// chain if `n` exceeds its length.
    pub fn blocks(&self, n: usize) -> &[Block] {
        let start = self.chain.len().saturating_sub(n);
        &self.chain[start..]
    }

    /// Every block, genesis first.
    pub fn all_blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Number of sealed blocks, genesis included.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false — the chain carries at least genesis. Present so the
    /// `len` API follows convention.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of entries waiting in the pending buffer.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// The configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::clock::FixedClock;

    fn ballot(id: &str, choice: &str) -> Entry {
        Entry::new().with("id", id).with("choice", choice)
    }

    fn test_ledger(batch_size: usize) -> Ledger {
        Ledger::with_parts(
            batch_size,
            Box::new(FixedClock::new(1_700_000_000_000)),
            Box::new(NullSink),
        )
        .expect("ledger")
    }

    /// Records every persisted index, shared with the test body.
    struct RecordingSink(Arc<Mutex<Vec<u64>>>);

    impl BlockSink for RecordingSink {
        fn persist(&mut self, block: &Block) -> Result<(), LedgerError> {
            self.0.lock().expect("lock").push(block.index);
            Ok(())
        }
    }

    /// Fails every persist after genesis.
    struct FailingSink;

    impl BlockSink for FailingSink {
        fn persist(&mut self, block: &Block) -> Result<(), LedgerError> {
            if block.index == 0 {
                return Ok(());
            }
            Err(LedgerError::Io(io::Error::other("disk on fire")))
        }
    }

    #[test]
    fn fresh_ledger_has_valid_genesis() {
        let ledger = test_ledger(2);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.latest_block().index, 0);
        assert_eq!(ledger.latest_block().previous_hash, "0");
        assert!(ledger.validate().is_valid());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(matches!(
            Ledger::new(0),
            Err(LedgerError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn single_entry_stays_pending() {
        let mut ledger = test_ledger(2);
        let outcome = ledger.submit_entry(ballot("u1", "X")).expect("submit");
        assert_eq!(outcome, Seal::Buffered);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.pending_len(), 1);
        assert!(ledger.validate().is_valid());
    }

    #[test]
    fn full_batch_seals_one_block() {
        let mut ledger = test_ledger(2);
        ledger.submit_entry(ballot("u1", "X")).expect("submit");
        let outcome = ledger.submit_entry(ballot("u2", "Y")).expect("submit");
        assert_eq!(outcome, Seal::Sealed(1));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.pending_len(), 0);

        let sealed = ledger.latest_block();
        assert_eq!(sealed.entries, vec![ballot("u1", "X"), ballot("u2", "Y")]);
    }

    #[test]
    fn chain_links_hold_across_many_seals() {
        let mut ledger = test_ledger(2);
        for i in 0..10 {
            ledger
                .submit_entry(ballot(&format!("u{i}"), "X"))
                .expect("submit");
        }
        assert_eq!(ledger.len(), 6); // genesis + 5 sealed blocks

        let blocks = ledger.all_blocks();
        for pair in blocks.windows(2) {
            assert_eq!(pair[1].previous_hash, pair[0].hash);
            assert_eq!(pair[1].index, pair[0].index + 1);
        }
        assert!(ledger.validate().is_valid());
    }

    #[test]
    fn blocks_window_selects_the_tail() {
        let mut ledger = test_ledger(1);
        for i in 0..5 {
            ledger
                .submit_entry(ballot(&format!("u{i}"), "X"))
                .expect("submit");
        }
        let window = ledger.blocks(3);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].index, 3);
        assert_eq!(window[2].index, 5);

        // Oversized window returns everything.
        assert_eq!(ledger.blocks(100).len(), 6);
    }

    #[test]
    fn reads_are_idempotent() {
        let mut ledger = test_ledger(2);
        ledger.submit_entry(ballot("u1", "X")).expect("submit");
        ledger.submit_entry(ballot("u2", "Y")).expect("submit");

        let first = ledger.blocks(10).to_vec();
        let second = ledger.blocks(10).to_vec();
        assert_eq!(first, second);
        assert_eq!(ledger.validate(), ledger.validate());
    }

    #[test]
    fn tampered_entry_is_detected() {
        let mut ledger = test_ledger(2);
        for i in 0..6 {
            ledger
                .submit_entry(ballot(&format!("u{i}"), "X"))
                .expect("submit");
        }
        assert!(ledger.validate().is_valid());

        ledger.chain[2].entries[0] = ballot("u2", "FORGED");
        let report = ledger.validate();
        assert!(!report.is_valid());
        assert_eq!(
            report.fault(),
            Some(&ValidationFault::HashMismatch { index: 2 })
        );
    }

    #[test]
    fn rewritten_link_is_detected() {
        let mut ledger = test_ledger(2);
        for i in 0..6 {
            ledger
                .submit_entry(ballot(&format!("u{i}"), "X"))
                .expect("submit");
        }

        // Repoint block 3's parent and recompute its hash so only the
        // link check can catch it.
        ledger.chain[3].previous_hash = ledger.chain[1].hash.clone();
        ledger.chain[3].hash = ledger.chain[3].compute_hash();

        let report = ledger.validate();
        assert_eq!(
            report.fault(),
            Some(&ValidationFault::BrokenLink { index: 3 })
        );
    }

    #[test]
    fn tampered_genesis_is_detected() {
        // Genesis gets no free pass — resolved design decision.
        let mut ledger = test_ledger(2);
        ledger.chain[0].created_at += 1;
        let report = ledger.validate();
        assert_eq!(
            report.fault(),
            Some(&ValidationFault::HashMismatch { index: 0 })
        );
    }

    #[test]
    fn sink_sees_every_block_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ledger = Ledger::with_parts(
            2,
            Box::new(FixedClock::new(0)),
            Box::new(RecordingSink(Arc::clone(&seen))),
        )
        .expect("ledger");

        for i in 0..4 {
            ledger
                .submit_entry(ballot(&format!("u{i}"), "X"))
                .expect("submit");
        }
        assert_eq!(*seen.lock().expect("lock"), vec![0, 1, 2]);
    }

    #[test]
    fn sink_failure_keeps_the_batch_pending() {
        let mut ledger =
            Ledger::with_parts(2, Box::new(FixedClock::new(0)), Box::new(FailingSink))
                .expect("ledger");

        ledger.submit_entry(ballot("u1", "X")).expect("submit");
        let err = ledger.submit_entry(ballot("u2", "Y"));
        assert!(matches!(err, Err(LedgerError::Io(_))));

        // Nothing acknowledged, nothing lost.
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.pending_len(), 2);
        assert!(ledger.validate().is_valid());
    }

    #[test]
    fn restore_accepts_a_valid_chain() {
        let mut ledger = test_ledger(2);
        ledger.submit_entry(ballot("u1", "X")).expect("submit");
        ledger.submit_entry(ballot("u2", "Y")).expect("submit");
        let blocks = ledger.all_blocks().to_vec();

        let restored = Ledger::restore(
            blocks,
            2,
            Box::new(FixedClock::new(0)),
            Box::new(NullSink),
        )
        .expect("restore");
        assert_eq!(restored.len(), 2);
        assert!(restored.validate().is_valid());
    }

    #[test]
    fn restore_refuses_a_tampered_chain() {
        let mut ledger = test_ledger(2);
        ledger.submit_entry(ballot("u1", "X")).expect("submit");
        ledger.submit_entry(ballot("u2", "Y")).expect("submit");

        let mut blocks = ledger.all_blocks().to_vec();
        blocks[1].entries[0] = ballot("u1", "FORGED");

        let err = Ledger::restore(
            blocks,
            2,
            Box::new(FixedClock::new(0)),
            Box::new(NullSink),
        );
        assert!(matches!(
            err,
            Err(LedgerError::CorruptChain(ValidationFault::HashMismatch { index: 1 }))
        ));
    }

    #[test]
    fn restore_refuses_gaps() {
        let mut ledger = test_ledger(1);
        ledger.submit_entry(ballot("u1", "X")).expect("submit");
        ledger.submit_entry(ballot("u2", "Y")).expect("submit");

        let mut blocks = ledger.all_blocks().to_vec();
        blocks.remove(1);

        let err = Ledger::restore(
            blocks,
            1,
            Box::new(FixedClock::new(0)),
            Box::new(NullSink),
        );
        assert!(matches!(
            err,
            Err(LedgerError::NonContiguous { expected: 1, got: 2 })
        ));
    }

    #[test]
    fn restore_refuses_empty_archive() {
        let err = Ledger::restore(
            vec![],
            2,
            Box::new(FixedClock::new(0)),
            Box::new(NullSink),
        );
        assert!(matches!(err, Err(LedgerError::MissingGenesis)));
    }
}
