//! Caller-side tick policies.
//!
//! The scheduler only reports lag and missed boundaries; deciding whether
//! that is acceptable belongs to the consumer. These policies cover the
//! usual choices: keep going, stop at the first missed interval, stop once
//! lag grows past a threshold, or refuse any lag at all.

use std::time::Duration;
use thiserror::Error;
use timer_runtime::Interval;

/// Reasons a policy ends the tick loop early.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyViolation {
    /// A tick fired inside the next tick's window.
    #[error("interval {index} was missed (lag {lag:.3}s)")]
    Missed {
        /// Index of the missed tick.
        index: u64,
        /// Lag of the missed tick in seconds.
        lag: f64,
    },

    /// Lag exceeded the configured limit.
    #[error("lag {lag:.3}s at interval {index} exceeds limit {limit:.3}s")]
    LagExceeded {
        /// Index of the offending tick.
        index: u64,
        /// Observed lag in seconds.
        lag: f64,
        /// Configured limit in seconds.
        limit: f64,
    },

    /// Strict mode saw a tick requested after its boundary had passed.
    #[error("iteration frequency could not be maintained (lag {lag:.6}s at interval {index})")]
    FrequencyNotMaintained {
        /// Index of the offending tick.
        index: u64,
        /// Observed lag in seconds.
        lag: f64,
    },
}

/// Acceptance rules applied to every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickPolicy {
    /// Stop at the first missed interval.
    pub stop_on_miss: bool,
    /// Stop once lag exceeds this limit.
    pub max_lag: Option<Duration>,
    /// Reject any tick requested after its boundary.
    pub strict: bool,
}

impl TickPolicy {
    /// Check a tick against the policy.
    ///
    /// # Errors
    ///
    /// Returns the first rule the tick violates.
    pub fn check(&self, tick: &Interval) -> Result<(), PolicyViolation> {
        let index = tick.index();
        let lag = tick.lag();

        // Polling overshoot is not the caller's fault; only a late request is.
        if self.strict && tick.requested_time() > tick.lower_bound() {
            return Err(PolicyViolation::FrequencyNotMaintained { index, lag });
        }
        if self.stop_on_miss && tick.missed() {
            return Err(PolicyViolation::Missed { index, lag });
        }
        if let Some(limit) = self.max_lag {
            if tick.lag_duration() > limit {
                return Err(PolicyViolation::LagExceeded {
                    index,
                    lag,
                    limit: limit.as_secs_f64(),
                });
            }
        }
        Ok(())
    }
}
