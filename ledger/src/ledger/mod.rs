//! # Ledger Module
//!
//! The hash-chained append log itself. Four pieces:
//!
//! ```text
//! entry.rs — opaque ordered key/value payload + canonical encoding
//! block.rs — immutable batch of entries with chain linkage and digest
//! chain.rs — batching, sealing, windowed reads, validation report
//! sink.rs  — pluggable durability hook invoked after every seal
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! Entry → pending buffer → (buffer full) → Block sealed
//!                                             ↓
//!                                        BlockSink.persist
//!                                             ↓
//!                                        chain.push (acknowledged)
//! ```
//!
//! A block is only acknowledged after the sink accepts it; with a durable
//! sink, a crash between seal and acknowledge loses nothing that the
//! caller believed was recorded.

pub mod block;
pub mod chain;
pub mod entry;
pub mod sink;

pub use block::Block;
pub use chain::{Ledger, Seal, ValidationFault, ValidationReport};
pub use entry::Entry;
pub use sink::{BlockSink, JsonDirSink, NullSink};
