#![doc = "Drift-free interval scheduling for polling and sampling loops."]

pub mod clock;
pub mod interval;
pub mod scheduler;

pub use clock::*;
pub use interval::*;
pub use scheduler::*;
