//! Drift-free interval scheduler.
//!
//! Each request for the next tick:
//! 1. Ends the sequence if the stop index has been reached
//! 2. Computes the ideal boundary `index * period`
//! 3. Samples the clock, fixing the zero point on the very first sample
//! 4. Pauses in [`POLL_INTERVAL`] steps until the boundary is reached
//! 5. Returns an [`Interval`] and advances the cursor
//!
//! Boundaries are always measured from the same zero point, so a slow tick
//! never shifts the ones after it. A late tick is reported, not skipped.

use crate::clock::{Clock, MonotonicClock, POLL_INTERVAL};
use crate::interval::{boundary, Interval};
use std::iter::FusedIterator;
use std::time::Instant;
use timer_common::config::TimerConfig;
use timer_common::error::{validate_schedule, TimerResult};
use timer_common::metrics::LagMetrics;
use timer_common::state::SequenceState;
use tracing::{debug, trace};

/// Pull-based producer of evenly spaced ticks.
///
/// A scheduler is a single-consumer iterator: it yields [`Interval`]s until
/// the optional stop index is reached, then returns `None` forever.
#[derive(Debug)]
pub struct Scheduler<C: Clock = MonotonicClock> {
    /// Time source.
    clock: C,
    /// Seconds between tick boundaries.
    period: f64,
    /// Index of the next tick to produce.
    index: u64,
    /// Exclusive upper bound on `index`.
    stop: Option<u64>,
    /// Clock reading that defines time zero (set on first sample).
    zero_point: Option<Instant>,
    /// Optional lag collection.
    metrics: Option<LagMetrics>,
}

impl Scheduler<MonotonicClock> {
    /// Create an unbounded scheduler starting at tick 0.
    ///
    /// # Errors
    ///
    /// Returns an error if `period` is not a positive, finite number.
    pub fn new(period: f64) -> TimerResult<Self> {
        Self::with_bounds(period, 0, None)
    }

    /// Create a scheduler starting at `start` and stopping before `stop`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid period or when `stop <= start`.
    pub fn with_bounds(period: f64, start: u64, stop: Option<u64>) -> TimerResult<Self> {
        Self::with_clock(MonotonicClock, period, start, stop)
    }

    /// Create a scheduler from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured parameters are invalid.
    pub fn from_config(config: &TimerConfig) -> TimerResult<Self> {
        SchedulerBuilder::from_config(config).build()
    }
}

impl<C: Clock> Scheduler<C> {
    /// Create a scheduler driven by an arbitrary clock.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid period or when `stop <= start`.
    pub fn with_clock(clock: C, period: f64, start: u64, stop: Option<u64>) -> TimerResult<Self> {
        validate_schedule(period, start, stop)?;
        Ok(Self {
            clock,
            period,
            index: start,
            stop,
            zero_point: None,
            metrics: None,
        })
    }

    /// Enable lag collection with the given histogram size.
    pub fn enable_metrics(&mut self, histogram_size: usize) {
        self.metrics = Some(LagMetrics::new(histogram_size));
    }

    /// Seconds between tick boundaries.
    #[must_use]
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Index of the next tick to be produced.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Exclusive tick limit, if any.
    #[must_use]
    pub fn stop(&self) -> Option<u64> {
        self.stop
    }

    /// Current sequence state.
    #[must_use]
    pub fn state(&self) -> SequenceState {
        SequenceState::at(self.index, self.stop)
    }

    /// Lag metrics, if enabled.
    #[must_use]
    pub fn metrics(&self) -> Option<&LagMetrics> {
        self.metrics.as_ref()
    }

    /// The underlying clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Seconds since the zero point, or `None` before the first tick request.
    #[must_use]
    pub fn elapsed(&self) -> Option<f64> {
        self.zero_point
            .map(|zero| self.clock.now().saturating_duration_since(zero).as_secs_f64())
    }

    /// Block until the next tick boundary and return the tick.
    ///
    /// Returns `None` once the stop index has been reached, without
    /// touching the clock.
    pub fn next_tick(&mut self) -> Option<Interval> {
        if self.state().is_exhausted() {
            return None;
        }

        let index = self.index;
        let lower_bound = boundary(index, self.period);

        let requested_time = self.sample();
        let mut observed_time = requested_time;
        while observed_time < lower_bound {
            self.clock.pause(POLL_INTERVAL);
            observed_time = self.sample();
        }

        let interval = Interval::new(index, self.period, observed_time, requested_time);
        self.index += 1;

        if let Some(metrics) = self.metrics.as_mut() {
            metrics.record(interval.lag_duration(), interval.missed());
        }

        if interval.missed() {
            debug!(
                index,
                lag_us = interval.lag_duration().as_micros(),
                "Tick boundary missed"
            );
        } else {
            trace!(
                index,
                lag_us = interval.lag_duration().as_micros(),
                "Tick"
            );
        }

        if self.state().is_exhausted() {
            debug!(ticks = self.index, "Tick sequence exhausted");
        }

        Some(interval)
    }

    /// Read the clock relative to the zero point, fixing the zero point on
    /// the first call.
    fn sample(&mut self) -> f64 {
        let now = self.clock.now();
        let zero = *self.zero_point.get_or_insert_with(|| {
            debug!(period_s = self.period, "Zero point fixed");
            now
        });
        now.saturating_duration_since(zero).as_secs_f64()
    }
}

impl<C: Clock> Iterator for Scheduler<C> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        self.next_tick()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.stop {
            Some(stop) => {
                let remaining = usize::try_from(stop.saturating_sub(self.index)).ok();
                (remaining.unwrap_or(usize::MAX), remaining)
            }
            None => (usize::MAX, None),
        }
    }
}

impl<C: Clock> FusedIterator for Scheduler<C> {}

/// Create an unbounded scheduler with the given period in seconds.
///
/// # Errors
///
/// Returns an error if `period` is not a positive, finite number.
pub fn interval_timer(period: f64) -> TimerResult<Scheduler> {
    Scheduler::new(period)
}

/// Builder for configuring the scheduler.
pub struct SchedulerBuilder<C: Clock = MonotonicClock> {
    clock: C,
    period: f64,
    start: u64,
    stop: Option<u64>,
    histogram_size: Option<usize>,
}

impl SchedulerBuilder<MonotonicClock> {
    /// Create a new builder with the given period in seconds.
    pub fn new(period: f64) -> Self {
        Self {
            clock: MonotonicClock,
            period,
            start: 0,
            stop: None,
            histogram_size: None,
        }
    }

    /// Create a builder from the period, start, stop and metrics settings
    /// of a configuration.
    pub fn from_config(config: &TimerConfig) -> Self {
        Self {
            clock: MonotonicClock,
            period: config.period_secs(),
            start: config.start,
            stop: config.stop,
            histogram_size: config
                .metrics
                .enabled
                .then_some(config.metrics.histogram_size),
        }
    }
}

impl<C: Clock> SchedulerBuilder<C> {
    /// Set the index of the first tick.
    #[must_use]
    pub fn start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    /// Set the exclusive tick limit.
    #[must_use]
    pub fn stop(mut self, stop: u64) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Collect lag metrics with the given histogram size.
    #[must_use]
    pub fn metrics(mut self, histogram_size: usize) -> Self {
        self.histogram_size = Some(histogram_size);
        self
    }

    /// Replace period, start, stop and metrics settings with those of a
    /// configuration, keeping the current clock.
    #[must_use]
    pub fn config(self, config: &TimerConfig) -> SchedulerBuilder<C> {
        SchedulerBuilder::from_config(config).clock(self.clock)
    }

    /// Replace the time source.
    pub fn clock<D: Clock>(self, clock: D) -> SchedulerBuilder<D> {
        SchedulerBuilder {
            clock,
            period: self.period,
            start: self.start,
            stop: self.stop,
            histogram_size: self.histogram_size,
        }
    }

    /// Build the scheduler.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid period or when `stop <= start`.
    pub fn build(self) -> TimerResult<Scheduler<C>> {
        let mut scheduler = Scheduler::with_clock(self.clock, self.period, self.start, self.stop)?;
        if let Some(size) = self.histogram_size {
            scheduler.enable_metrics(size);
        }
        Ok(scheduler)
    }
}
