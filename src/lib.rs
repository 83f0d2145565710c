//! # Bunnymark Harness
//!
//! A self-driving bunnymark for Bevy: a fixed-timestep bunny simulation and
//! the instrumentation that measures it.
//!
//! ## Modules
//!
//! - [`simulation`]: Entity store, fixed-step clock and physics
//! - [`metrics`]: Windowed FPS/TPS collection, latency and memory probes
//! - [`input`]: Synthetic pointer input
//! - [`runtime`]: Scheduling capability and the virtual clock
//! - [`benchmark`]: The session, its workload and exported results
//! - [`plugin`]: Bevy host
//! - [`config`]: Constants and runtime configuration
//! - [`state`]: Mode and state-machine enums

pub mod benchmark;
pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod metrics;
pub mod plugin;
pub mod runtime;
pub mod simulation;
pub mod state;

pub use plugin::BunnymarkPlugin;
