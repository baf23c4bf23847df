//! Boundary alignment acceptance tests.
//!
//! # Acceptance Criteria
//!
//! - Every lower bound equals `index * period`
//! - No tick fires before its lower bound
//! - Caller work shorter than the period never causes a missed tick
//! - Total run time tracks the last boundary, not the sum of sleeps

use super::common::{run_with, run_with_work, AcceptanceCriteria, TickStats};
use std::time::{Duration, Instant};
use timer_runtime::{Scheduler, SchedulerBuilder};

#[test]
fn test_no_drift_with_variable_work() {
    let scheduler = SchedulerBuilder::new(0.02).stop(25).build().unwrap();

    // 0-14ms of work per tick, always inside the 20ms period
    let ticks = run_with(scheduler, |tick| Duration::from_millis((tick.index() * 7) % 15));

    let stats = TickStats::from_ticks(&ticks);
    assert_eq!(stats.ticks, 25);
    assert!(
        AcceptanceCriteria::default().check(&stats),
        "criteria not met: {stats:?}"
    );
}

#[test]
fn test_total_duration_tracks_boundaries() {
    let started = Instant::now();
    let scheduler = SchedulerBuilder::new(0.01).stop(20).build().unwrap();

    let ticks = run_with_work(scheduler, Duration::from_millis(9));
    let elapsed = started.elapsed();

    assert_eq!(ticks.len(), 20);
    // Last boundary at 190ms plus the final 9ms of work. Sleeping a fixed
    // period after each 9ms of work would take roughly twice as long.
    assert!(elapsed >= Duration::from_millis(199), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(300), "drifted: {elapsed:?}");
}

#[test]
fn test_start_offset_first_tick() {
    let mut scheduler = Scheduler::with_bounds(0.05, 4, Some(5)).unwrap();

    let tick = scheduler.next().unwrap();
    assert_eq!(tick.index(), 4);
    assert!((tick.lower_bound() - 0.2).abs() < 1e-9);
    assert!(tick.observed_time() >= 0.2);
    assert!(tick.buffer() > 0.15);
    assert!(scheduler.next().is_none());
}

#[test]
#[ignore = "Takes about two seconds"]
fn test_one_second_period_three_ticks() {
    let scheduler = Scheduler::with_bounds(1.0, 0, Some(3)).unwrap();
    let ticks: Vec<_> = scheduler.collect();

    assert_eq!(
        ticks.iter().map(|t| t.index()).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert!(ticks.iter().all(|t| !t.missed()));
}

#[test]
#[ignore = "Takes about two seconds"]
fn test_half_second_start_stop() {
    // Delay by four intervals and stop at eight, as a late-joining sampler would
    let scheduler = Scheduler::with_bounds(0.5, 4, Some(8)).unwrap();
    let started = Instant::now();
    let ticks: Vec<_> = scheduler.collect();

    assert_eq!(ticks.len(), 4);
    assert!((ticks[0].lower_bound() - 2.0).abs() < 1e-9);
    assert!(started.elapsed() >= Duration::from_millis(3500));
}
