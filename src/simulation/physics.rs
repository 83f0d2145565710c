//! Per-bunny physics: gravity, integration and boundary response.

use serde::{Deserialize, Serialize};

use crate::components::Bunny;
use crate::config::{GRAVITY, PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH, UPPER_BOUND, UPWARD_DAMPING};

/// Immutable field the bunnies bounce around in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    /// Above this line upward velocity is damped each tick
    pub upper_bound: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            upper_bound: UPPER_BOUND,
        }
    }
}

impl Playfield {
    /// Largest x a bunny of the given width may occupy
    #[inline]
    pub fn max_x(&self, bunny: &Bunny) -> f32 {
        (self.width - bunny.size.x).max(0.0)
    }

    #[inline]
    pub fn max_y(&self, bunny: &Bunny) -> f32 {
        (self.height - bunny.size.y).max(0.0)
    }

    pub fn contains(&self, bunny: &Bunny) -> bool {
        (0.0..=self.max_x(bunny)).contains(&bunny.position.x)
            && (0.0..=self.max_y(bunny)).contains(&bunny.position.y)
    }
}

/// Constants of the per-tick update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    pub gravity: f32,
    pub upward_damping: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            upward_damping: UPWARD_DAMPING,
        }
    }
}

/// One full physics tick for a single bunny.
#[inline]
pub fn step_bunny(bunny: &mut Bunny, field: &Playfield, params: &PhysicsParams) {
    bunny.velocity.y += params.gravity;
    bunny.position += bunny.velocity;
    apply_bounds(bunny, field, params);
}

/// Clamp a bunny into the field and reflect or damp its velocity.
///
/// Reflection multiplies by the bunny's bounce coefficient, so a coefficient
/// of 1.0 flips the sign and keeps the magnitude.
#[inline]
pub fn apply_bounds(bunny: &mut Bunny, field: &Playfield, params: &PhysicsParams) {
    let max_x = field.max_x(bunny);
    let max_y = field.max_y(bunny);

    if bunny.position.x < 0.0 {
        bunny.position.x = 0.0;
        bunny.velocity.x = -bunny.velocity.x * bunny.bounce;
    } else if bunny.position.x > max_x {
        bunny.position.x = max_x;
        bunny.velocity.x = -bunny.velocity.x * bunny.bounce;
    }

    if bunny.position.y > max_y {
        bunny.position.y = max_y;
        bunny.velocity.y = -bunny.velocity.y * bunny.bounce;
    } else if bunny.position.y < field.upper_bound && bunny.velocity.y < 0.0 {
        bunny.velocity.y *= params.upward_damping;
    }

    // The damping line has no hard ceiling; clamp the rare overshoot past the top
    if bunny.position.y < 0.0 {
        bunny.position.y = 0.0;
        bunny.velocity.y = bunny.velocity.y.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    fn bunny(position: Vec2, velocity: Vec2) -> Bunny {
        Bunny::new(position, velocity, 1.0, Vec2::new(5.2, 7.4))
    }

    #[test]
    fn right_wall_negates_vx() {
        let field = Playfield::default();
        let params = PhysicsParams::default();
        let mut b = bunny(Vec2::new(633.0, 100.0), Vec2::new(3.0, 0.0));
        step_bunny(&mut b, &field, &params);
        assert_eq!(b.position.x, field.max_x(&b));
        assert_eq!(b.velocity.x, -3.0);
    }

    #[test]
    fn left_wall_negates_vx() {
        let field = Playfield::default();
        let params = PhysicsParams::default();
        let mut b = bunny(Vec2::new(1.0, 100.0), Vec2::new(-2.5, 0.0));
        step_bunny(&mut b, &field, &params);
        assert_eq!(b.position.x, 0.0);
        assert_eq!(b.velocity.x, 2.5);
    }

    #[test]
    fn ground_negates_vy() {
        let field = Playfield::default();
        let params = PhysicsParams {
            gravity: 0.0,
            ..Default::default()
        };
        let mut b = bunny(Vec2::new(100.0, 470.0), Vec2::new(0.0, 6.0));
        step_bunny(&mut b, &field, &params);
        assert_eq!(b.position.y, field.max_y(&b));
        assert_eq!(b.velocity.y, -6.0);
    }

    #[test]
    fn upward_motion_above_line_is_damped() {
        let field = Playfield::default();
        let params = PhysicsParams {
            gravity: 0.0,
            ..Default::default()
        };
        let mut b = bunny(Vec2::new(100.0, 10.0), Vec2::new(0.0, -5.0));
        step_bunny(&mut b, &field, &params);
        assert!((b.position.y - 5.0).abs() < 1e-6);
        assert!((b.velocity.y + 3.5).abs() < 1e-6);
    }

    #[test]
    fn inelastic_bounce_scales_reflection() {
        let field = Playfield::default();
        let params = PhysicsParams::default();
        let mut b = bunny(Vec2::new(1.0, 100.0), Vec2::new(-4.0, 0.0));
        b.bounce = 0.5;
        step_bunny(&mut b, &field, &params);
        assert_eq!(b.velocity.x, 2.0);
    }

    #[test]
    fn overshoot_past_top_is_clamped() {
        let field = Playfield::default();
        let params = PhysicsParams {
            gravity: 0.0,
            upward_damping: 1.0,
        };
        let mut b = bunny(Vec2::new(100.0, 2.0), Vec2::new(0.0, -10.0));
        step_bunny(&mut b, &field, &params);
        assert_eq!(b.position.y, 0.0);
        assert!(field.contains(&b));
    }

    #[test]
    fn stays_inside_for_long_runs() {
        let field = Playfield::default();
        let params = PhysicsParams::default();
        let mut bunnies: Vec<_> = (0..50)
            .map(|i| bunny(Vec2::new(i as f32, 0.0), Vec2::new(2.0 + i as f32 * 0.3, 4.0)))
            .collect();
        for _ in 0..5_000 {
            for b in &mut bunnies {
                step_bunny(b, &field, &params);
                assert!(field.contains(b), "escaped: {:?}", b);
            }
        }
    }
}
