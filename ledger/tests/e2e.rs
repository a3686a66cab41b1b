//! End-to-end integration tests for the VERA ledger.
//!
//! These exercise the full record lifecycle through the public API only:
//! submission, batching, sealing, durable persistence, restart, validation,
//! and CSV export. Each test stands alone with its own temporary directory.
//! No shared state, no test ordering dependencies.

use vera_ledger::export::{collect_columns, csv_bytes};
use vera_ledger::{Entry, FixedClock, JsonDirSink, Ledger, LedgerError, NullSink, Seal};

fn ballot(id: &str, choice: &str) -> Entry {
    Entry::new().with("id", id).with("choice", choice)
}

/// The specified end-to-end scenario: two ballots seal a block, a third
/// waits in the buffer, and the chain stays valid throughout.
#[test]
fn two_ballots_seal_then_one_pends() {
    let mut ledger = Ledger::with_parts(
        2,
        Box::new(FixedClock::new(1_700_000_000_000)),
        Box::new(NullSink),
    )
    .expect("ledger");

    assert_eq!(ledger.submit_entry(ballot("u1", "X")).expect("u1"), Seal::Buffered);
    assert_eq!(ledger.submit_entry(ballot("u2", "Y")).expect("u2"), Seal::Sealed(1));

    assert_eq!(ledger.len(), 2);
    assert_eq!(
        ledger.latest_block().entries,
        vec![ballot("u1", "X"), ballot("u2", "Y")]
    );
    assert!(ledger.validate().is_valid());

    assert_eq!(ledger.submit_entry(ballot("u3", "Z")).expect("u3"), Seal::Buffered);
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.pending_len(), 1);
    assert!(ledger.validate().is_valid());
}

/// A ledger persisted through a JsonDirSink survives a "restart": a new
/// ledger restored from the same directory carries the identical chain
/// and keeps accepting entries.
#[test]
fn restart_from_disk_preserves_the_chain() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = || Box::new(FixedClock::new(1_700_000_000_000));

    let tip_hash = {
        let sink = JsonDirSink::new(dir.path()).expect("sink");
        let mut ledger = Ledger::with_parts(2, clock(), Box::new(sink)).expect("ledger");
        for i in 0..6 {
            ledger
                .submit_entry(ballot(&format!("u{i}"), "X"))
                .expect("submit");
        }
        assert_eq!(ledger.len(), 4);
        ledger.latest_block().hash.clone()
    };

    let blocks = JsonDirSink::load_blocks(dir.path()).expect("load");
    let sink = JsonDirSink::new(dir.path()).expect("sink");
    let mut restored = Ledger::restore(blocks, 2, clock(), Box::new(sink)).expect("restore");

    assert_eq!(restored.len(), 4);
    assert_eq!(restored.latest_block().hash, tip_hash);
    assert!(restored.validate().is_valid());

    // The restored ledger keeps chaining off the restored tip.
    restored.submit_entry(ballot("u6", "X")).expect("submit");
    restored.submit_entry(ballot("u7", "Y")).expect("submit");
    assert_eq!(restored.len(), 5);
    assert_eq!(restored.latest_block().previous_hash, tip_hash);
    assert!(restored.validate().is_valid());
}

/// Tampering with a persisted block file is caught at restore time.
#[test]
fn tampered_archive_is_refused_on_restart() {
    let dir = tempfile::tempdir().expect("tempdir");

    {
        let sink = JsonDirSink::new(dir.path()).expect("sink");
        let mut ledger =
            Ledger::with_parts(2, Box::new(FixedClock::new(0)), Box::new(sink)).expect("ledger");
        ledger.submit_entry(ballot("u1", "X")).expect("submit");
        ledger.submit_entry(ballot("u2", "Y")).expect("submit");
    }

    // Forge the ballot inside the persisted block 1.
    let path = dir.path().join("block_1.json");
    let forged = std::fs::read_to_string(&path)
        .expect("read")
        .replace("\"X\"", "\"FORGED\"");
    std::fs::write(&path, forged).expect("write");

    let blocks = JsonDirSink::load_blocks(dir.path()).expect("load");
    let err = Ledger::restore(
        blocks,
        2,
        Box::new(FixedClock::new(0)),
        Box::new(NullSink),
    );
    assert!(matches!(err, Err(LedgerError::CorruptChain(_))));
}

/// The CSV export of a restored ledger is byte-identical to the export
/// taken before the restart.
#[test]
fn export_is_stable_across_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = || Box::new(FixedClock::new(42_000));

    let before = {
        let sink = JsonDirSink::new(dir.path()).expect("sink");
        let mut ledger = Ledger::with_parts(2, clock(), Box::new(sink)).expect("ledger");
        ledger.submit_entry(ballot("u1", "X")).expect("submit");
        ledger.submit_entry(ballot("u2", "Y")).expect("submit");
        let columns = collect_columns(ledger.all_blocks());
        csv_bytes(ledger.all_blocks(), &columns).expect("export")
    };

    let blocks = JsonDirSink::load_blocks(dir.path()).expect("load");
    let restored = Ledger::restore(blocks, 2, clock(), Box::new(NullSink)).expect("restore");
    let columns = collect_columns(restored.all_blocks());
    let after = csv_bytes(restored.all_blocks(), &columns).expect("export");

    assert_eq!(before, after);
}
