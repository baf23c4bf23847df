//! Configuration structures for the interval timer.
//!
//! Supports TOML deserialization with defaults for every field. Only the
//! three scheduling parameters and the metrics collector are configurable;
//! the clock polling throttle is fixed by the runtime.

use crate::error::{validate_schedule, TimerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Spacing between tick boundaries.
    #[serde(with = "humantime_serde")]
    pub period: Duration,

    /// Index of the first tick; the first boundary lies at `start * period`.
    pub start: u64,

    /// Exclusive upper bound on the tick index (unbounded when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<u64>,

    /// Lag metrics configuration.
    pub metrics: MetricsConfig,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            start: 0,
            stop: None,
            metrics: MetricsConfig::default(),
        }
    }
}

/// Lag metrics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable lag collection in the scheduler.
    pub enabled: bool,

    /// Size of the lag histogram ring buffer.
    pub histogram_size: usize,

    /// Percentiles to report (e.g., [50, 90, 99]).
    pub percentiles: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            histogram_size: 10_000,
            percentiles: vec![50.0, 90.0, 99.0, 99.9],
        }
    }
}

impl TimerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Period in seconds, as consumed by the scheduler.
    #[must_use]
    pub fn period_secs(&self) -> f64 {
        self.period.as_secs_f64()
    }

    /// Check the scheduling parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero period or inverted bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_schedule(self.period_secs(), self.start, self.stop)?;
        Ok(())
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Scheduling parameters rejected by validation.
    #[error(transparent)]
    Invalid(#[from] TimerError),
}

/// Serde helper module for `Duration` using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
