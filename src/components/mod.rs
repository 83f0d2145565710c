//! Data records of the bunnymark workload.
//!
//! Bunnies are plain kinematic records owned by the entity store rather than
//! ECS entities, so the timing core can run without a Bevy world.

mod bunny;

pub use bunny::*;
