//! Sliding-window admission counting.
//!
//! [`SlidingWindow`] keeps the timestamps of recent admissions and answers
//! whether one more may go out. It takes `&mut self` and is meant for a single
//! owner, e.g. the dispatcher, which already serializes access behind its own
//! lock. [`SharedSlidingWindow`] runs the same algorithm under one mutex for
//! callers that share an instance.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::ConfigError;

/// Granularity of the rate window. The window is exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of one unit in nanoseconds.
    pub const fn as_nanos(self) -> u64 {
        match self {
            Self::Nanoseconds => 1,
            Self::Microseconds => 1_000,
            Self::Milliseconds => 1_000_000,
            Self::Seconds => 1_000_000_000,
            Self::Minutes => 60 * 1_000_000_000,
            Self::Hours => 60 * 60 * 1_000_000_000,
            Self::Days => 24 * 60 * 60 * 1_000_000_000,
        }
    }
}

/// Validated `(unit, limit)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    unit: TimeUnit,
    limit: u32,
}

impl WindowConfig {
    pub fn new(unit: Option<TimeUnit>, limit: i64) -> Result<Self, ConfigError> {
        let unit = unit.ok_or(ConfigError::MissingTimeUnit)?;
        if limit <= 0 {
            return Err(ConfigError::NonPositiveLimit(limit));
        }
        // anything above u32::MAX can never be reached in practice
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);
        Ok(Self { unit, limit })
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window_nanos(&self) -> u64 {
        self.unit.as_nanos()
    }
}

/// Single-owner sliding-window limiter.
#[derive(Debug)]
pub struct SlidingWindow<C: Clock = SystemClock> {
    config: WindowConfig,
    ledger: VecDeque<u64>,
    clock: C,
}

impl SlidingWindow<SystemClock> {
    pub fn new(unit: Option<TimeUnit>, limit: i64) -> Result<Self, ConfigError> {
        Ok(Self::with_clock(WindowConfig::new(unit, limit)?, SystemClock))
    }
}

impl<C: Clock> SlidingWindow<C> {
    pub fn with_clock(config: WindowConfig, clock: C) -> Self {
        debug!(
            unit = ?config.unit(),
            limit = config.limit(),
            "sliding window created"
        );
        Self { config, ledger: VecDeque::new(), clock }
    }

    pub fn config(&self) -> WindowConfig {
        self.config
    }

    /// Admissions currently held, without pruning first.
    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Prunes expired admissions, then reports whether the window is full.
    pub fn is_at_capacity(&mut self) -> bool {
        let now = self.clock.now_nanos();
        self.is_at_capacity_at(now)
    }

    /// Records one admission now unless the window is full.
    pub fn try_reserve(&mut self) -> bool {
        let now = self.clock.now_nanos();
        if self.is_at_capacity_at(now) {
            return false;
        }
        self.ledger.push_back(now);
        true
    }

    fn is_at_capacity_at(&mut self, now: u64) -> bool {
        self.prune(now);
        self.ledger.len() >= self.config.limit as usize
    }

    // Half-open window: an admission exactly one window old is kept.
    fn prune(&mut self, now: u64) {
        let cutoff = now.saturating_sub(self.config.window_nanos());
        while self.ledger.front().is_some_and(|&t| t < cutoff) {
            self.ledger.pop_front();
        }
    }
}

/// [`SlidingWindow`] behind a mutex, safe to share between threads.
///
/// Every operation takes the lock for its whole duration, so a reservation
/// is visible to every capacity check that follows it.
#[derive(Debug)]
pub struct SharedSlidingWindow<C: Clock = SystemClock> {
    inner: Mutex<SlidingWindow<C>>,
}

impl SharedSlidingWindow<SystemClock> {
    pub fn new(unit: Option<TimeUnit>, limit: i64) -> Result<Self, ConfigError> {
        Ok(Self::from(SlidingWindow::new(unit, limit)?))
    }
}

impl<C: Clock> SharedSlidingWindow<C> {
    pub fn with_clock(config: WindowConfig, clock: C) -> Self {
        Self::from(SlidingWindow::with_clock(config, clock))
    }

    pub fn config(&self) -> WindowConfig {
        self.lock().config()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_at_capacity(&self) -> bool {
        self.lock().is_at_capacity()
    }

    pub fn try_reserve(&self) -> bool {
        self.lock().try_reserve()
    }

    // The ledger is only touched through whole operations, so a panic in
    // another holder cannot leave it half-updated.
    fn lock(&self) -> MutexGuard<'_, SlidingWindow<C>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<C: Clock> From<SlidingWindow<C>> for SharedSlidingWindow<C> {
    fn from(window: SlidingWindow<C>) -> Self {
        Self { inner: Mutex::new(window) }
    }
}
