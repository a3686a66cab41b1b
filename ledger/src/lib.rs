// Copyright (c) 2026 VERA Contributors. MIT License.
// See LICENSE for details.

//! # VERA — Core Ledger Library
//!
//! An append-only, hash-linked, integrity-checkable ledger of batched
//! records. VERA was built for electronic vote tallies, but the core is
//! deliberately payload-agnostic: it batches opaque records two (or N)
//! at a time into immutable blocks, chains the blocks by SHA-256, and
//! can certify at any moment that nobody has rewritten history.
//!
//! What this is NOT: a distributed blockchain. There is no consensus,
//! no peer-to-peer replication, no proof-of-anything. One writer, one
//! process, one chain. If you need Byzantine fault tolerance, you need
//! a different library (and probably a bigger team).
//!
//! ## Architecture
//!
//! - **crypto** — SHA-256 hashing helpers. The only cryptography here.
//! - **ledger** — Entry, Block, Ledger, validation, and the block sink.
//! - **clock** — Injected time source, so tests never race wall clocks.
//! - **export** — The CSV serialization contract for downstream tooling.
//! - **config** — Protocol constants. Every magic number lives here.
//!
//! ## Design Philosophy
//!
//! 1. Blocks are immutable after sealing. Full stop.
//! 2. Hashing is canonical: same fields, same bytes, same digest,
//!    on every platform.
//! 3. An invalid chain is a report, not a panic. Surface it, never
//!    swallow it.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod export;
pub mod ledger;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::LedgerError;
pub use ledger::block::Block;
pub use ledger::chain::{Ledger, Seal, ValidationFault, ValidationReport};
pub use ledger::entry::Entry;
pub use ledger::sink::{BlockSink, JsonDirSink, NullSink};
