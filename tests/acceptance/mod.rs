//! Acceptance scenarios for the drift-free interval timer.
//!
//! Timing assertions leave generous slack for scheduler jitter on shared
//! CI machines; the deterministic edge cases live in the crate tests.

mod common;
mod config_test;
mod drift_test;
mod lag_test;
