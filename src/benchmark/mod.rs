//! Benchmark orchestration.
//!
//! This module contains the session that wires the workload to the metrics
//! collector, results handling, and the workload itself.

pub mod results;
pub mod session;
pub mod workloads;

pub use results::*;
pub use session::*;
