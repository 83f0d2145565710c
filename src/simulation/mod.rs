//! Fixed-step simulation of the bunnymark payload.
//!
//! The host calls [`FixedStepSimulator::advance`] once per render callback
//! with the wall time since the previous one; the simulator runs as many
//! fixed ticks as that time covers. Rendering rate and simulation rate are
//! therefore independent.

mod clock;
mod physics;
mod simulator;
mod store;

pub use clock::*;
pub use physics::*;
pub use simulator::*;
pub use store::*;
