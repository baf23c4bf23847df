//! Common utilities for acceptance tests.
//!
//! Provides helpers for:
//! - Running a tick loop with simulated caller work
//! - Summarising the collected ticks
//! - Checking results against acceptance criteria

#![allow(dead_code)] // Not every scenario uses every helper

use std::time::Duration;
use timer_runtime::{Interval, Scheduler};

/// Summary of a tick run.
#[derive(Debug, Clone, Default)]
pub struct TickStats {
    /// Number of ticks produced.
    pub ticks: u64,
    /// Number of ticks reported as missed.
    pub missed: u64,
    /// Largest lag in seconds.
    pub max_lag: f64,
    /// Largest deviation of a lower bound from `index * period`.
    pub max_bound_error: f64,
    /// Whether any tick fired before its lower bound.
    pub fired_early: bool,
}

impl TickStats {
    /// Summarise a sequence of ticks.
    pub fn from_ticks(ticks: &[Interval]) -> Self {
        let mut stats = Self::default();
        for tick in ticks {
            stats.ticks += 1;
            if tick.missed() {
                stats.missed += 1;
            }
            stats.max_lag = stats.max_lag.max(tick.lag());
            let ideal = tick.index() as f64 * tick.period();
            stats.max_bound_error = stats.max_bound_error.max((tick.lower_bound() - ideal).abs());
            if tick.observed_time() < tick.lower_bound() {
                stats.fired_early = true;
            }
        }
        stats
    }
}

/// Pull every tick, sleeping `work` after each one.
pub fn run_with_work(scheduler: Scheduler, work: Duration) -> Vec<Interval> {
    run_with(scheduler, |_| work)
}

/// Pull every tick, sleeping for a per-tick amount of work.
pub fn run_with(mut scheduler: Scheduler, mut work: impl FnMut(&Interval) -> Duration) -> Vec<Interval> {
    let mut ticks = Vec::new();
    while let Some(tick) = scheduler.next() {
        let pause = work(&tick);
        ticks.push(tick);
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    }
    ticks
}

/// Acceptance criteria for on-schedule runs.
pub struct AcceptanceCriteria {
    /// Maximum acceptable lag in seconds.
    pub max_lag: f64,
    /// Maximum acceptable number of missed ticks.
    pub max_missed: u64,
}

impl Default for AcceptanceCriteria {
    fn default() -> Self {
        Self {
            // Far above the polling resolution, to absorb OS jitter
            max_lag: 0.015,
            max_missed: 0,
        }
    }
}

impl AcceptanceCriteria {
    /// Check if tick stats meet acceptance criteria.
    pub fn check(&self, stats: &TickStats) -> bool {
        !stats.fired_early
            && stats.max_bound_error < 1e-9
            && stats.max_lag <= self.max_lag
            && stats.missed <= self.max_missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_ticks() {
        let ticks = [
            Interval::new(0, 1.0, 0.0, 0.0),
            Interval::new(1, 1.0, 1.3, 1.3),
            Interval::new(2, 1.0, 3.1, 3.1),
        ];
        let stats = TickStats::from_ticks(&ticks);
        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.missed, 1);
        assert!((stats.max_lag - 1.1).abs() < 1e-9);
        assert!(!stats.fired_early);
    }

    #[test]
    fn test_acceptance_criteria() {
        let criteria = AcceptanceCriteria::default();
        let on_time = TickStats {
            ticks: 10,
            max_lag: 0.001,
            ..Default::default()
        };
        assert!(criteria.check(&on_time));

        let late = TickStats {
            missed: 1,
            ..on_time.clone()
        };
        assert!(!criteria.check(&late));
    }
}
