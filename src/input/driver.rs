//! Synthetic pointer events for self-driving runs.
//!
//! The core never builds engine or DOM events. It calls [`InputTarget`],
//! which the host adapter (here the bunnymark workload) implements.

use bevy::log::{debug, warn};
use bevy::math::Vec2;

/// Kind of pointer event to dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Press,
    Release,
}

/// Something that can receive pointer presses and releases.
pub trait InputTarget {
    fn press(&mut self, at: Vec2);
    fn release(&mut self, at: Vec2);
}

/// Held state of the primary pointer as seen by a workload
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub held: bool,
    pub position: Vec2,
}

impl InputTarget for PointerState {
    fn press(&mut self, at: Vec2) {
        self.held = true;
        self.position = at;
    }

    fn release(&mut self, at: Vec2) {
        self.held = false;
        self.position = at;
    }
}

/// Dispatches presses and releases at a fixed point, the playfield center.
///
/// Re-dispatching the same kind is allowed; the target decides whether it
/// has any further effect.
#[derive(Debug, Clone)]
pub struct SyntheticInputDriver {
    at: Vec2,
    last: Option<InputKind>,
    warned_missing_target: bool,
}

impl SyntheticInputDriver {
    pub fn new(at: Vec2) -> Self {
        Self {
            at,
            last: None,
            warned_missing_target: false,
        }
    }

    /// Driver aimed at the center of a `width` x `height` field
    pub fn centered(width: f32, height: f32) -> Self {
        Self::new(Vec2::new(width / 2.0, height / 2.0))
    }

    pub fn position(&self) -> Vec2 {
        self.at
    }

    pub fn last_dispatched(&self) -> Option<InputKind> {
        self.last
    }

    /// Dispatch `kind` to `target`. Returns `false` when there is no target;
    /// that is logged once and otherwise ignored.
    pub fn inject(&mut self, kind: InputKind, target: Option<&mut dyn InputTarget>) -> bool {
        let Some(target) = target else {
            if !self.warned_missing_target {
                warn!("No input target available, synthetic input disabled");
                self.warned_missing_target = true;
            }
            return false;
        };

        match kind {
            InputKind::Press => target.press(self.at),
            InputKind::Release => target.release(self.at),
        }
        debug!("Injected {:?} at ({:.0}, {:.0})", kind, self.at.x, self.at.y);
        self.last = Some(kind);
        true
    }
}
