//! Benchmark workloads.
//!
//! Each workload is the engine-side payload the instrumentation measures.
//! It owns its simulation state and implements
//! [`MetricsSource`](crate::metrics::MetricsSource) and
//! [`InputTarget`](crate::input::InputTarget) so the core never touches
//! engine types.

mod bunnymark;

pub use bunnymark::*;
