//! Host bootstrap duration, reported in the `load_ms` column.

use std::time::{Duration, Instant};

use bevy::log::info;

/// Start/end marks around engine bootstrap
#[derive(Debug, Clone, Copy)]
pub struct LoadTimer {
    start: Instant,
    duration: Option<Duration>,
}

impl LoadTimer {
    /// Mark the start of bootstrap now
    pub fn mark_start() -> Self {
        Self {
            start: Instant::now(),
            duration: None,
        }
    }

    /// Mark the end of bootstrap and log the duration. Later calls keep the
    /// first measurement.
    pub fn mark_end(&mut self) -> Duration {
        if let Some(duration) = self.duration {
            return duration;
        }
        let duration = self.start.elapsed();
        self.duration = Some(duration);
        info!(
            "Engine load time: {:.2} ms",
            duration.as_secs_f64() * 1000.0
        );
        duration
    }

    pub fn duration_ms(&self) -> Option<f64> {
        self.duration.map(|d| d.as_secs_f64() * 1000.0)
    }
}
