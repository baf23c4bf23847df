use thiserror::Error;

/// Errors raised when constructing an interval scheduler.
///
/// All variants are configuration errors: they are surfaced once, at
/// construction, and never while ticks are being produced. Running out of
/// ticks is not an error and is reported as end-of-sequence instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimerError {
    /// The period was zero, negative, NaN, or infinite.
    #[error("configuration error: period must be a positive, finite number of seconds (got {0})")]
    InvalidPeriod(f64),

    /// The stop index does not lie after the start index.
    #[error("configuration error: stop index {stop} must be greater than start index {start}")]
    InvalidBounds {
        /// First tick index.
        start: u64,
        /// Exclusive tick limit.
        stop: u64,
    },
}

impl TimerError {
    /// Returns true for errors caused by invalid construction parameters.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidPeriod(_) | Self::InvalidBounds { .. })
    }
}

/// Convenience type alias for timer construction.
pub type TimerResult<T> = Result<T, TimerError>;

/// Validate the three scheduling parameters.
///
/// # Errors
///
/// Returns [`TimerError::InvalidPeriod`] for a non-positive or non-finite
/// period and [`TimerError::InvalidBounds`] when `stop <= start`.
pub fn validate_schedule(period: f64, start: u64, stop: Option<u64>) -> TimerResult<()> {
    if !period.is_finite() || period <= 0.0 {
        return Err(TimerError::InvalidPeriod(period));
    }
    match stop {
        Some(stop) if stop <= start => Err(TimerError::InvalidBounds { start, stop }),
        _ => Ok(()),
    }
}
