//! Clock abstraction for expiry checks.
//!
//! Every expiry comparison in this crate reads wall-clock time through the
//! [`Clock`] trait, so issuance and verification can be tested against a
//! fixed instant instead of the process clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

/// Source of "now" in Unix milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current time as Unix milliseconds.
    fn now_ms(&self) -> i64;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        // unix_timestamp_nanos fits comfortably in i128; milliseconds fit i64
        // until far beyond any plausible deployment horizon.
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

/// Deterministic clock for tests: reports a fixed instant until advanced.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: AtomicI64,
}

impl FixedClock {
    /// Creates a clock frozen at the given Unix-millisecond instant.
    #[must_use]
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    /// Creates an `Arc`-wrapped clock, the form services take.
    #[must_use]
    pub fn shared(now_ms: i64) -> Arc<Self> {
        Arc::new(Self::new(now_ms))
    }

    /// Moves the clock forward (or backward, with a negative delta).
    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute instant.
    pub fn set_ms(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
