//! State enums shared by the collector, the session and the hosts.
//!
//! These are plain enums rather than Bevy `States`. They live inside the
//! `Session` resource so the session and collector can be driven and tested
//! without an `App`.

use serde::{Deserialize, Serialize};

/// Where latency measurements come from
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarnessMode {
    /// Latency measured from real user presses
    #[default]
    Manual,
    /// The collector injects presses itself and ramps load until saturation
    SelfDriving,
}

impl HarnessMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::SelfDriving => "self-driving",
        }
    }
}

/// Which host drives the render callback
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    /// Bevy window, display refresh drives frames
    #[default]
    Window,
    /// Bevy without a window, fixed real-time frame cadence
    Headless,
    /// Deterministic fake clock, runs as fast as possible
    Virtual,
}

/// Lifecycle of the metrics collector
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum CollectorState {
    /// Created, not yet listening to frames
    #[default]
    Idle,
    /// Recording every frame callback
    Sampling,
    /// Deregistered; further callbacks are ignored
    Stopped,
}
