//! Lag and missed-interval acceptance tests.
//!
//! The scheduler never preempts caller work and never skips indices; these
//! tests check that overload is reported faithfully instead.

use super::common::{run_with_work, TickStats};
use std::time::Duration;
use timer_common::error::TimerError;
use timer_runtime::{Scheduler, SchedulerBuilder};

#[test]
fn test_high_frequency_overload() {
    // 100 Hz with 20ms of work per iteration
    let scheduler = SchedulerBuilder::new(0.01).stop(10).build().unwrap();
    let ticks = run_with_work(scheduler, Duration::from_millis(20));

    assert_eq!(ticks.len(), 10);
    assert!(!ticks[0].missed());
    for tick in &ticks[1..] {
        assert!(tick.missed(), "expected miss: {tick}");
        assert!(tick.observed_time() >= tick.lower_bound());
    }

    // Indices stay sequential even though every boundary was overrun
    let indices: Vec<u64> = ticks.iter().map(|t| t.index()).collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());
}

#[test]
fn test_metrics_count_missed_ticks() {
    let mut scheduler = SchedulerBuilder::new(0.005)
        .stop(6)
        .metrics(64)
        .build()
        .unwrap();

    while let Some(tick) = scheduler.next() {
        if tick.index() == 2 {
            std::thread::sleep(Duration::from_millis(15));
        }
    }

    let metrics = scheduler.metrics().unwrap();
    assert_eq!(metrics.total_ticks(), 6);
    assert!(metrics.missed_count() >= 1);
    assert!(metrics.max().unwrap() >= Duration::from_millis(5));
}

#[test]
#[ignore = "Takes about four seconds"]
fn test_slow_work_reports_lag() {
    let scheduler = Scheduler::with_bounds(1.0, 0, Some(4)).unwrap();
    let ticks = run_with_work(scheduler, Duration::from_millis(1200));

    // No catch-up: each late tick inherits the previous overrun
    assert!(ticks[0].lag() < 0.05);
    assert!((ticks[1].lag() - 0.2).abs() < 0.05, "{}", ticks[1]);
    assert!((ticks[2].lag() - 0.4).abs() < 0.05, "{}", ticks[2]);
    assert!((ticks[3].lag() - 0.6).abs() < 0.05, "{}", ticks[3]);

    let stats = TickStats::from_ticks(&ticks);
    assert!(!stats.fired_early);
}

#[test]
fn test_invalid_period_produces_no_ticks() {
    for period in [0.0, -1.0] {
        assert_eq!(
            Scheduler::new(period).unwrap_err(),
            TimerError::InvalidPeriod(period)
        );
    }
}
