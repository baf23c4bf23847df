//! Tick lag metrics.
//!
//! Provides a ring buffer-based histogram for tracking how late each tick
//! fired relative to its ideal boundary, without heap allocations while
//! ticks are being recorded.

use std::time::Duration;

/// Per-tick lag metrics with ring buffer for percentile reporting.
#[derive(Debug)]
pub struct LagMetrics {
    /// Ring buffer of tick lags in nanoseconds.
    samples: Box<[u64]>,
    /// Current write position in the ring buffer.
    write_pos: usize,
    /// Number of samples collected (saturates at buffer size).
    sample_count: usize,
    /// Total ticks recorded.
    total_ticks: u64,
    /// Minimum observed lag in nanoseconds.
    min_ns: u64,
    /// Maximum observed lag in nanoseconds.
    max_ns: u64,
    /// Sum of all lags for mean calculation.
    sum_ns: u64,
    /// Number of ticks that overlapped the next tick's window.
    missed_count: u64,
}

impl LagMetrics {
    /// Create a new metrics collector with the given histogram size.
    ///
    /// # Arguments
    ///
    /// * `histogram_size` - Number of samples to retain in the ring buffer.
    #[must_use]
    pub fn new(histogram_size: usize) -> Self {
        let size = histogram_size.max(1);
        Self {
            samples: vec![0u64; size].into_boxed_slice(),
            write_pos: 0,
            sample_count: 0,
            total_ticks: 0,
            min_ns: u64::MAX,
            max_ns: 0,
            sum_ns: 0,
            missed_count: 0,
        }
    }

    /// Record the lag of one tick and whether its boundary was missed.
    pub fn record(&mut self, lag: Duration, missed: bool) {
        self.record_ns(u64::try_from(lag.as_nanos()).unwrap_or(u64::MAX), missed);
    }

    /// Record a tick lag in nanoseconds directly.
    pub fn record_ns(&mut self, ns: u64, missed: bool) {
        self.samples[self.write_pos] = ns;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
        self.sample_count = self.sample_count.saturating_add(1).min(self.samples.len());

        self.total_ticks += 1;
        self.min_ns = self.min_ns.min(ns);
        self.max_ns = self.max_ns.max(ns);
        self.sum_ns = self.sum_ns.saturating_add(ns);

        if missed {
            self.missed_count += 1;
        }
    }

    /// Get total number of ticks recorded.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Get minimum observed lag.
    #[must_use]
    pub fn min(&self) -> Option<Duration> {
        (self.total_ticks > 0).then(|| Duration::from_nanos(self.min_ns))
    }

    /// Get maximum observed lag.
    #[must_use]
    pub fn max(&self) -> Option<Duration> {
        (self.total_ticks > 0).then(|| Duration::from_nanos(self.max_ns))
    }

    /// Get mean lag.
    #[must_use]
    pub fn mean(&self) -> Option<Duration> {
        (self.total_ticks > 0).then(|| Duration::from_nanos(self.sum_ns / self.total_ticks))
    }

    /// Get number of missed ticks.
    #[must_use]
    pub fn missed_count(&self) -> u64 {
        self.missed_count
    }

    /// Compute a lag percentile from the ring buffer.
    ///
    /// Returns `None` if no samples have been collected or if percentile is
    /// outside 0.0 to 100.0.
    #[must_use]
    pub fn percentile(&self, percentile: f64) -> Option<Duration> {
        self.percentiles(&[percentile]).first().map(|&(_, d)| d)
    }

    /// Compute multiple percentiles with a single sort.
    ///
    /// Invalid percentiles (< 0, > 100, or NaN) are skipped.
    #[must_use]
    pub fn percentiles(&self, percentiles: &[f64]) -> Vec<(f64, Duration)> {
        if self.sample_count == 0 {
            return vec![];
        }

        let mut sorted: Vec<u64> = self.samples[..self.sample_count].to_vec();
        sorted.sort_unstable();

        percentiles
            .iter()
            .filter(|p| (0.0..=100.0).contains(*p))
            .map(|&p| {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
                let idx = idx.min(sorted.len() - 1);
                (p, Duration::from_nanos(sorted[idx]))
            })
            .collect()
    }

    /// Get a snapshot of current metrics.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let any = self.total_ticks > 0;
        MetricsSnapshot {
            total_ticks: self.total_ticks,
            min_lag_ns: any.then_some(self.min_ns),
            max_lag_ns: any.then_some(self.max_ns),
            mean_lag_ns: any.then(|| self.sum_ns / self.total_ticks),
            missed_count: self.missed_count,
            sample_count: self.sample_count,
        }
    }

    /// Reset all metrics to initial state.
    pub fn reset(&mut self) {
        self.samples.fill(0);
        self.write_pos = 0;
        self.sample_count = 0;
        self.total_ticks = 0;
        self.min_ns = u64::MAX;
        self.max_ns = 0;
        self.sum_ns = 0;
        self.missed_count = 0;
    }
}

/// Immutable snapshot of lag metrics for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Total ticks recorded.
    pub total_ticks: u64,
    /// Minimum lag in nanoseconds.
    pub min_lag_ns: Option<u64>,
    /// Maximum lag in nanoseconds.
    pub max_lag_ns: Option<u64>,
    /// Mean lag in nanoseconds.
    pub mean_lag_ns: Option<u64>,
    /// Number of missed ticks.
    pub missed_count: u64,
    /// Number of samples in the histogram.
    pub sample_count: usize,
}

impl MetricsSnapshot {
    /// Get jitter (max lag - min lag) in nanoseconds.
    #[must_use]
    pub fn jitter_ns(&self) -> Option<u64> {
        match (self.min_lag_ns, self.max_lag_ns) {
            (Some(min), Some(max)) => Some(max - min),
            _ => None,
        }
    }
}
