//! Correlating injected input with the state change it causes.

use bevy::log::debug;

/// An input whose effect has not been observed yet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingInputMarker {
    pub injected_at_ms: f64,
    /// Entity count at injection time
    pub baseline: usize,
}

/// Best-effort input-to-effect latency measurement.
///
/// At most one marker is pending. Arming a new one overwrites an unresolved
/// marker, so a cycle without an observed spawn records no latency.
#[derive(Debug, Clone, Default)]
pub struct LatencyTracker {
    pending: Option<PendingInputMarker>,
    latest_ms: Option<f64>,
    last_observed: usize,
}

impl LatencyTracker {
    /// Remember an input made at `now_ms` while `count` entities exist.
    pub fn arm(&mut self, now_ms: f64, count: usize) {
        if let Some(stale) = self.pending {
            debug!(
                "Overwriting unresolved input marker from {:.2}ms",
                stale.injected_at_ms
            );
        }
        self.pending = Some(PendingInputMarker {
            injected_at_ms: now_ms,
            baseline: count,
        });
        self.last_observed = count;
    }

    /// Check the current entity count; resolves the marker on the first
    /// increase and returns the measured latency.
    pub fn observe(&mut self, now_ms: f64, count: usize) -> Option<f64> {
        let increased = count > self.last_observed;
        self.last_observed = count;

        let marker = self.pending?;
        if !increased {
            return None;
        }

        let latency = now_ms - marker.injected_at_ms;
        debug!(
            "Input effect after {:.2}ms ({} -> {} bunnies)",
            latency, marker.baseline, count
        );
        self.pending = None;
        self.latest_ms = Some(latency);
        Some(latency)
    }

    pub fn pending(&self) -> Option<&PendingInputMarker> {
        self.pending.as_ref()
    }

    /// Latest latency since the previous call, leaving none behind
    pub fn take_latest(&mut self) -> Option<f64> {
        self.latest_ms.take()
    }

    /// Drop the pending marker, e.g. when the session ends
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
