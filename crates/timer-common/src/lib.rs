#![doc = "Common types shared across the interval timer workspace."]

pub mod config;
pub mod error;
pub mod metrics;
pub mod state;

pub use config::*;
pub use error::*;
pub use metrics::*;
pub use state::*;
