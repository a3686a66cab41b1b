//! # Injected Time
//!
//! Block timestamps participate in the hash, so any test that wants a
//! reproducible digest needs a reproducible clock. The [`Clock`] trait is
//! that seam: production uses [`SystemClock`] (wall time via `chrono`),
//! tests use [`FixedClock`] and advance it by hand.
//!
//! Timestamps are Unix **milliseconds** as `u64` — a fixed-precision
//! integer, never a float, so the canonical serialization is identical on
//! every platform.

use std::sync::atomic::{AtomicU64, Ordering};

/// A source of the current time in Unix milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Wall-clock time. The production clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // Negative timestamps would mean the system clock is set before
        // 1970; clamp to zero rather than wrap.
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// A clock that stands still until told otherwise. For tests and benches.
#[derive(Debug, Default)]
pub struct FixedClock {
    millis: AtomicU64,
}

impl FixedClock {
    /// Creates a clock pinned at the given millisecond timestamp.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    /// Advances the clock by `delta` milliseconds.
    pub fn advance(&self, delta: u64) {
        self.millis.fetch_add(delta, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::Relaxed)
    }
}
