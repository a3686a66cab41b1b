//! # Ledger Constants
//!
//! Every magic number in VERA lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong.
//!
//! Changing `GENESIS_PREVIOUS_HASH` or the batch default after a chain has
//! been persisted will make every existing export and every recomputed
//! digest disagree with history — so don't.

/// Number of entries accumulated before a block is sealed.
/// Two keeps blocks small and seals frequent, which is what you want when
/// each entry is a ballot and auditors are impatient.
pub const DEFAULT_BATCH_SIZE: usize = 2;

/// The `previous_hash` sentinel carried by the genesis block.
/// A literal `"0"`, not a zeroed digest — inherited from the original
/// deployment and load-bearing for export compatibility.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Marker value stamped into the genesis block's single entry.
pub const GENESIS_TAG: &str = "GENESIS";

/// SHA-256 digest length in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// SHA-256 digest length as lowercase hex.
pub const HASH_HEX_LENGTH: usize = 64;

/// Default port for the ballot-intake HTTP API.
pub const DEFAULT_RPC_PORT: u16 = 8669;

/// Default port for the Prometheus metrics endpoint.
pub const DEFAULT_METRICS_PORT: u16 = 8670;

/// How many trailing blocks a display surface shows by default.
/// Three, matching the original tally UI's block panel.
pub const DEFAULT_DISPLAY_WINDOW: usize = 3;

/// Filename suggested to clients downloading the CSV export.
/// Kept verbatim for compatibility with existing export archives.
pub const CSV_EXPORT_FILENAME: &str = "blockchain_votes.csv";

/// Fixed CSV columns preceding the per-entry fields.
pub const CSV_LEADING_COLUMNS: [&str; 2] = ["block_index", "block_created_at"];

/// Fixed CSV columns following the per-entry fields.
pub const CSV_TRAILING_COLUMNS: [&str; 2] = ["block_hash", "block_previous_hash"];
