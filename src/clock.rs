//! Time sources for the admission ledger.
//!
//! Ledger timestamps are plain `u64` nanoseconds since the Unix epoch, which
//! covers dates up to the year 2554.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Clock abstraction so window expiry can be driven by hand in tests.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant as nanoseconds since the Unix epoch.
    fn now_nanos(&self) -> u64;
}

/// Wall clock backed by `SystemTime::now()`.
///
/// Not monotonic: if the system clock steps backwards, later admissions can
/// carry smaller timestamps than earlier ones, and front-first pruning then
/// stops at the first retained entry and may keep expired ones behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> u64 {
        // a clock set before 1970 reads as the epoch itself
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        u64::try_from(since_epoch.as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same instant, so a test can hand one clone to a limiter
/// and keep another to advance time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_nanos: u64) -> Self {
        Self { nanos: Arc::new(AtomicU64::new(start_nanos)) }
    }

    pub fn advance(&self, nanos: u64) {
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    pub fn set(&self, nanos: u64) {
        self.nanos.store(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }
}
