//! Immutable tick snapshots.
//!
//! An [`Interval`] stores only what was observed: the tick index, the
//! period, and the two clock samples taken while producing it. Everything
//! else (bounds, lag, buffer, missed) is computed on demand so the stored
//! and derived values can never disagree.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::time::Duration;

/// Ideal boundary of tick `index`, in seconds since the zero point.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn boundary(index: u64, period: f64) -> f64 {
    index as f64 * period
}

/// One tick produced by a [`Scheduler`](crate::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    index: u64,
    period: f64,
    observed_time: f64,
    requested_time: f64,
}

impl Interval {
    /// Create a tick snapshot.
    ///
    /// Times are in seconds relative to the scheduler's zero point.
    #[must_use]
    pub fn new(index: u64, period: f64, observed_time: f64, requested_time: f64) -> Self {
        Self {
            index,
            period,
            observed_time,
            requested_time,
        }
    }

    /// Ordinal position of this tick.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Spacing between tick boundaries, in seconds.
    #[must_use]
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Time at which the tick was returned to the caller.
    #[must_use]
    pub fn observed_time(&self) -> f64 {
        self.observed_time
    }

    /// Time at which the tick was requested, before any waiting.
    #[must_use]
    pub fn requested_time(&self) -> f64 {
        self.requested_time
    }

    /// Earliest instant this tick may fire: `index * period`.
    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        boundary(self.index, self.period)
    }

    /// Instant beyond which this tick counts as missed.
    #[must_use]
    pub fn upper_bound(&self) -> f64 {
        self.lower_bound() + self.period
    }

    /// How long after its boundary the tick fired. Never negative.
    #[must_use]
    pub fn lag(&self) -> f64 {
        (self.observed_time - self.lower_bound()).max(0.0)
    }

    /// [`lag`](Self::lag) as a `Duration`.
    #[must_use]
    pub fn lag_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.lag()).unwrap_or(Duration::MAX)
    }

    /// How long before its boundary the tick was requested. Zero when the
    /// request itself came late.
    #[must_use]
    pub fn buffer(&self) -> f64 {
        (self.lower_bound() - self.requested_time).max(0.0)
    }

    /// True if the tick fired so late that it overlapped the next tick's
    /// window.
    #[must_use]
    pub fn missed(&self) -> bool {
        self.observed_time >= self.upper_bound()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Interval(index={}, time={:.3}, lag={:.3})",
            self.index,
            self.lower_bound(),
            self.lag()
        )
    }
}

impl Serialize for Interval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("Interval", 9)?;
        s.serialize_field("index", &self.index)?;
        s.serialize_field("period", &self.period)?;
        s.serialize_field("observed_time", &self.observed_time)?;
        s.serialize_field("requested_time", &self.requested_time)?;
        s.serialize_field("lower_bound", &self.lower_bound())?;
        s.serialize_field("upper_bound", &self.upper_bound())?;
        s.serialize_field("lag", &self.lag())?;
        s.serialize_field("buffer", &self.buffer())?;
        s.serialize_field("missed", &self.missed())?;
        s.end()
    }
}
