//! # CSV Export
//!
//! The serialization contract consumed by downstream export tooling:
//! one row per `(block, entry)` pair, columns
//!
//! ```text
//! block_index, block_created_at, <entry fields...>, block_hash, block_previous_hash
//! ```
//!
//! in chain order, then entry-submission order within each block. The
//! genesis block is exported like any other — archived exports include
//! it, and this writer stays row-for-row compatible with them: records
//! are CRLF-terminated and quoted only when a field requires it, the
//! same discipline the original exporter used.
//!
//! Entries are opaque to the ledger, so the caller names the entry
//! columns to project; [`collect_columns`] derives that list from a chain
//! when no fixed schema exists. A field an entry does not carry exports
//! as an empty cell.

use std::io::Write;

use crate::config::{CSV_LEADING_COLUMNS, CSV_TRAILING_COLUMNS};
use crate::error::LedgerError;
use crate::ledger::block::Block;

/// Derives the entry columns for a chain: every key, in the order it is
/// first seen walking blocks and entries front to back.
pub fn collect_columns(blocks: &[Block]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for block in blocks {
        for entry in &block.entries {
            for (key, _) in entry.iter() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
    }
    columns
}

/// Writes the CSV export for `blocks` to `out`, projecting the given
/// entry columns.
pub fn write_csv<W: Write>(
    blocks: &[Block],
    columns: &[String],
    out: W,
) -> Result<(), LedgerError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);

    let header: Vec<&str> = CSV_LEADING_COLUMNS
        .iter()
        .copied()
        .chain(columns.iter().map(String::as_str))
        .chain(CSV_TRAILING_COLUMNS.iter().copied())
        .collect();
    writer.write_record(&header)?;

    for block in blocks {
        let index = block.index.to_string();
        let created_at = block.created_at_rfc3339();
        for entry in &block.entries {
            let mut row: Vec<&str> = Vec::with_capacity(header.len());
            row.push(&index);
            row.push(&created_at);
            for column in columns {
                row.push(entry.get(column).unwrap_or(""));
            }
            row.push(&block.hash);
            row.push(&block.previous_hash);
            writer.write_record(&row)?;
        }
    }

    writer.flush().map_err(LedgerError::Io)?;
    Ok(())
}

/// Convenience wrapper: the full export as bytes.
pub fn csv_bytes(blocks: &[Block], columns: &[String]) -> Result<Vec<u8>, LedgerError> {
    let mut out = Vec::new();
    write_csv(blocks, columns, &mut out)?;
    Ok(out)
}
