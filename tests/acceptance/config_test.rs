//! Configuration file acceptance tests.

use std::io::Write;
use std::time::Duration;
use timer_common::config::{ConfigError, TimerConfig};
use timer_runtime::Scheduler;

#[test]
fn test_config_file_drives_scheduler() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "period = \"10ms\"").unwrap();
    writeln!(file, "start = 2").unwrap();
    writeln!(file, "stop = 5").unwrap();
    writeln!(file, "[metrics]").unwrap();
    writeln!(file, "histogram_size = 8").unwrap();

    let config = TimerConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();
    assert_eq!(config.period, Duration::from_millis(10));

    let mut scheduler = Scheduler::from_config(&config).unwrap();
    let indices: Vec<u64> = scheduler.by_ref().map(|t| t.index()).collect();

    assert_eq!(indices, vec![2, 3, 4]);
    assert_eq!(scheduler.metrics().unwrap().total_ticks(), 3);
}

#[test]
fn test_config_with_metrics_disabled() {
    let config = TimerConfig::from_toml("period = \"1ms\"\nstop = 1\n[metrics]\nenabled = false").unwrap();
    let mut scheduler = Scheduler::from_config(&config).unwrap();

    assert!(scheduler.next().is_some());
    assert!(scheduler.next().is_none());
    assert!(scheduler.metrics().is_none());
}

#[test]
fn test_invalid_config_rejected() {
    let config = TimerConfig::from_toml("start = 3\nstop = 3").unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    assert!(Scheduler::from_config(&config).is_err());
}
