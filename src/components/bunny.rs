//! The simulated body and the RNG used to spawn it.

use bevy::math::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::config::{BUNNY_SCALE, DEFAULT_SEED, SPRITE_HEIGHT, SPRITE_WIDTH};

// =============================================================================
// Fast Random Number Generator
// =============================================================================

/// Seeded Xoshiro256++ shared by every spawn.
///
/// A fixed seed makes the spawn stream identical across runs, so two engines
/// fed the same input schedule see the same bodies.
pub struct FastRng(pub Xoshiro256PlusPlus);

impl Default for FastRng {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl FastRng {
    pub fn with_seed(seed: u64) -> Self {
        Self(Xoshiro256PlusPlus::seed_from_u64(seed))
    }
}

// =============================================================================
// Bunny
// =============================================================================

/// One simulated sprite: position, velocity, bounce and bounding size.
///
/// Only the simulator writes these after spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bunny {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Multiplier on reflected velocity; 1.0 is a perfectly elastic bounce
    pub bounce: f32,
    pub size: Vec2,
}

impl Bunny {
    pub fn new(position: Vec2, velocity: Vec2, bounce: f32, size: Vec2) -> Self {
        Self {
            position,
            velocity,
            bounce,
            size,
        }
    }
}

/// Parameters for randomized spawning
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BunnyTemplate {
    pub size: Vec2,
    pub bounce_min: f32,
    pub bounce_max: f32,
}

impl Default for BunnyTemplate {
    fn default() -> Self {
        Self {
            size: Vec2::new(SPRITE_WIDTH, SPRITE_HEIGHT) * BUNNY_SCALE,
            bounce_min: 1.0,
            bounce_max: 1.0,
        }
    }
}

impl BunnyTemplate {
    /// Spawn area and velocity range shared by all engine variants
    const SPAWN_SPREAD: f32 = 5.0;
    const MIN_SPEED: f32 = 2.0;
    const MAX_SPEED: f32 = 4.0;

    /// Generate a bunny near the top-left corner moving down and right.
    #[inline]
    pub fn random_with<R: Rng>(&self, rng: &mut R) -> Bunny {
        let position = Vec2::new(
            rng.gen_range(0.0..Self::SPAWN_SPREAD),
            rng.gen_range(0.0..Self::SPAWN_SPREAD),
        );
        let velocity = Vec2::new(
            rng.gen_range(Self::MIN_SPEED..Self::MAX_SPEED),
            rng.gen_range(Self::MIN_SPEED..Self::MAX_SPEED),
        );
        let bounce = if self.bounce_max > self.bounce_min {
            rng.gen_range(self.bounce_min..=self.bounce_max)
        } else {
            self.bounce_min
        };
        Bunny::new(position, velocity, bounce, self.size)
    }
}
