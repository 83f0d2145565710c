//! Performance measurement: frame pacing, tick rate, population, memory and
//! input latency, aggregated into one report row per window.

pub mod collector;
pub mod frame_metrics;
pub mod latency;
pub mod load_timer;
pub mod memory;
pub mod report;

pub use collector::*;
pub use frame_metrics::*;
pub use latency::*;
pub use load_timer::*;
pub use memory::*;
pub use report::*;
