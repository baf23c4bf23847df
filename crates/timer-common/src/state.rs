//! Sequence state for an interval scheduler.
//!
//! A scheduler is either ACTIVE (more ticks may be produced) or
//! EXHAUSTED (the configured stop index has been reached). EXHAUSTED
//! is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a tick sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SequenceState {
    /// More ticks will be produced on request.
    #[default]
    Active,
    /// The tick limit was reached; no further ticks.
    Exhausted,
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Exhausted => write!(f, "EXHAUSTED"),
        }
    }
}

impl SequenceState {
    /// Derive the state from the cursor and the optional exclusive limit.
    #[must_use]
    pub fn at(index: u64, stop: Option<u64>) -> Self {
        match stop {
            Some(stop) if index >= stop => Self::Exhausted,
            _ => Self::Active,
        }
    }

    /// Returns true if no further ticks will be produced.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}
