//! Scheduling capability the session is driven through.
//!
//! A host registers a per-refresh frame callback and periodic timers on the
//! session's behalf and later reports which of them fired. Bevy's main loop
//! is one implementation (see [`crate::plugin`]); [`VirtualScheduler`] is a
//! deterministic fake clock.

mod virtual_host;

pub use virtual_host::*;

/// Handle of a registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u32);

/// Cooperative scheduling primitive provided by the host.
pub trait Scheduler {
    /// Monotonic high-resolution time in milliseconds
    fn now_ms(&self) -> f64;
    /// Fire once per display refresh
    fn on_frame(&mut self) -> TimerId;
    /// Fire every `interval_ms`, independent of the display refresh
    fn every(&mut self, interval_ms: f64) -> TimerId;
    /// Deregister a callback. Unknown ids are ignored.
    fn cancel(&mut self, id: TimerId);
}
