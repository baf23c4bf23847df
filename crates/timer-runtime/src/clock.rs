//! Monotonic time sources for the scheduler.
//!
//! The scheduler only needs two things from a clock: the current monotonic
//! instant and a way to give up the CPU for a short while between samples.
//!
//! - [`MonotonicClock`]: the OS monotonic clock with `thread::sleep`
//! - [`ManualClock`]: time only moves when advanced, for deterministic tests

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Pause between clock samples while waiting for a tick boundary.
///
/// Bounds timing precision from above and keeps the wait loop from
/// saturating a core.
pub const POLL_INTERVAL: Duration = Duration::from_micros(100);

/// Port for monotonic time.
pub trait Clock {
    /// Get the current instant on a monotonic timebase.
    fn now(&self) -> Instant;

    /// Cooperatively yield the calling thread for roughly `duration`.
    fn pause(&self, duration: Duration);

    /// Get the clock's name for diagnostics.
    fn name(&self) -> &str {
        "Clock"
    }
}

/// Real monotonic clock for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    /// Create a new monotonic clock.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }

    fn name(&self) -> &str {
        "MonotonicClock"
    }
}

/// Manually driven clock.
///
/// Time is frozen at construction and only moves through [`advance`] or
/// when the scheduler pauses on it. Clones share the same timeline, so a
/// test can keep one handle while the scheduler owns another.
///
/// [`advance`]: ManualClock::advance
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset_ns: Arc<AtomicU64>,
    reads: Arc<AtomicU64>,
    pauses: Arc<AtomicU64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a manual clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ns: Arc::new(AtomicU64::new(0)),
            reads: Arc::new(AtomicU64::new(0)),
            pauses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move time forward, e.g. to simulate caller work between ticks.
    pub fn advance(&self, duration: Duration) {
        let ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.offset_ns.fetch_add(ns, Ordering::AcqRel);
    }

    /// Move time forward by a number of seconds.
    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }

    /// Time elapsed since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_ns.load(Ordering::Acquire))
    }

    /// Number of times [`Clock::now`] has been called.
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of times [`Clock::pause`] has been called.
    #[must_use]
    pub fn pauses(&self) -> u64 {
        self.pauses.load(Ordering::Relaxed)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.base + self.elapsed()
    }

    fn pause(&self, duration: Duration) {
        self.pauses.fetch_add(1, Ordering::Relaxed);
        self.advance(duration);
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
