//! The metrics collector state machine.
//!
//! `Idle -> Sampling -> Stopped`. While sampling, every render callback is
//! recorded and roughly once per second the window closes: aggregates are
//! computed, a [`MetricsReport`] row is emitted (after the one-time header)
//! and, in self-driving mode, the next synthetic input is chosen.

use bevy::log::{info, warn};

use crate::config::HarnessConfig;
use crate::input::InputKind;
use crate::metrics::frame_metrics::{format_count, FrameWindow};
use crate::metrics::latency::LatencyTracker;
use crate::metrics::memory::{bytes_to_mb, MemoryProbe};
use crate::metrics::report::{MetricsReport, ReportSink};
use crate::state::{CollectorState, HarnessMode};

/// Engine-side snapshot the collector reads without knowing engine types
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineMetrics {
    /// The engine's own FPS estimate, if it has one
    pub fps: Option<f64>,
    /// Cumulative simulation ticks; the collector turns this into TPS
    pub ticks: u64,
    pub bunnies: usize,
}

/// Implemented by each engine adapter.
pub trait MetricsSource {
    fn metrics(&self) -> EngineMetrics;
}

/// Result of a closed window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowClose {
    pub report: MetricsReport,
    /// Input the host must dispatch now (self-driving mode only)
    pub injection: Option<InputKind>,
}

pub struct MetricsCollector {
    label: String,
    environment: String,
    mode: HarnessMode,
    window_ms: f64,
    fps_threshold: f64,
    state: CollectorState,
    window: FrameWindow,
    tick_baseline: u64,
    latency: LatencyTracker,
    saturated: bool,
    header_emitted: bool,
    load_ms: Option<f64>,
    memory: Box<dyn MemoryProbe + Send + Sync>,
    warned_no_memory: bool,
    windows_closed: u64,
}

impl MetricsCollector {
    pub fn new(config: &HarnessConfig, memory: Box<dyn MemoryProbe + Send + Sync>) -> Self {
        Self {
            label: config.label.clone(),
            environment: config.environment.clone(),
            mode: config.mode,
            window_ms: config.window_ms,
            fps_threshold: config.fps_threshold,
            state: CollectorState::Idle,
            window: FrameWindow::default(),
            tick_baseline: 0,
            latency: LatencyTracker::default(),
            saturated: false,
            header_emitted: false,
            load_ms: None,
            memory,
            warned_no_memory: false,
            windows_closed: 0,
        }
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub fn mode(&self) -> HarnessMode {
        self.mode
    }

    /// Self-driving mode stopped adding load
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    pub fn windows_closed(&self) -> u64 {
        self.windows_closed
    }

    pub fn latency(&self) -> &LatencyTracker {
        &self.latency
    }

    /// Bootstrap duration for the `load_ms` column
    pub fn set_load_ms(&mut self, load_ms: Option<f64>) {
        self.load_ms = load_ms;
    }

    /// Begin sampling. Only the first call has an effect.
    pub fn start(&mut self, now_ms: f64, source: &dyn MetricsSource) {
        if self.state != CollectorState::Idle {
            warn!("Metrics collector already started ({:?})", self.state);
            return;
        }
        self.state = CollectorState::Sampling;
        self.window = FrameWindow::new(now_ms);
        self.tick_baseline = source.metrics().ticks;
        info!(
            "Metrics collector sampling in {} mode ({:.0}ms windows)",
            self.mode.name(),
            self.window_ms
        );
    }

    /// Stop sampling and forget any pending input marker.
    pub fn stop(&mut self) {
        if self.state == CollectorState::Stopped {
            return;
        }
        self.state = CollectorState::Stopped;
        self.latency.clear();
        info!(
            "Metrics collector stopped after {} windows",
            self.windows_closed
        );
    }

    /// Record one render callback. Returns the closed window when this
    /// callback ends one.
    pub fn on_frame(
        &mut self,
        now_ms: f64,
        source: &dyn MetricsSource,
        sink: &mut dyn ReportSink,
    ) -> Option<WindowClose> {
        if self.state != CollectorState::Sampling {
            return None;
        }

        self.window.record_frame(now_ms);

        if self.mode == HarnessMode::Manual {
            self.latency.observe(now_ms, source.metrics().bunnies);
        }

        if !self.window.is_complete(now_ms, self.window_ms) {
            return None;
        }

        let close = self.close_window(now_ms, source);
        if !self.header_emitted {
            sink.write_line(&MetricsReport::header());
            self.header_emitted = true;
        }
        sink.write_line(&close.report.to_row());
        self.window.reset(now_ms);
        self.windows_closed += 1;
        Some(close)
    }

    /// Latency poll, independent of the render rate (self-driving mode).
    pub fn poll(&mut self, now_ms: f64, source: &dyn MetricsSource) {
        if self.state != CollectorState::Sampling || self.mode != HarnessMode::SelfDriving {
            return;
        }
        self.latency.observe(now_ms, source.metrics().bunnies);
    }

    /// A real user press at `now_ms` (manual mode).
    pub fn note_manual_input(&mut self, now_ms: f64, source: &dyn MetricsSource) {
        if self.state != CollectorState::Sampling || self.mode != HarnessMode::Manual {
            return;
        }
        self.latency.arm(now_ms, source.metrics().bunnies);
    }

    /// The host could not deliver the requested injection.
    pub fn injection_failed(&mut self) {
        self.latency.clear();
    }

    fn close_window(&mut self, now_ms: f64, source: &dyn MetricsSource) -> WindowClose {
        let metrics = source.metrics();
        let fps = self.window.frames();
        let tps = metrics.ticks.saturating_sub(self.tick_baseline);
        self.tick_baseline = metrics.ticks;

        let summary = self.window.summary();
        let heap_mb = self.heap_mb();
        let latency_ms = self.latency.take_latest();
        let injection = self.decide_injection(now_ms, fps, metrics.bunnies);

        let report = MetricsReport {
            label: self.label.clone(),
            environment: self.environment.clone(),
            load_ms: self.load_ms,
            fps,
            fps_game: metrics.fps,
            tps,
            bunnies: metrics.bunnies,
            avg_frame_ms: summary.map(|s| s.avg_ms),
            min_frame_ms: summary.map(|s| s.min_ms),
            max_frame_ms: summary.map(|s| s.max_ms),
            heap_mb,
            latency_ms,
        };
        WindowClose { report, injection }
    }

    fn heap_mb(&mut self) -> Option<f64> {
        let bytes = self.memory.used_bytes();
        if bytes.is_none() && !self.warned_no_memory {
            warn!("Memory usage unavailable, heap column will be empty");
            self.warned_no_memory = true;
        }
        bytes.map(bytes_to_mb)
    }

    /// Keep pressing while healthy; release once and stop when FPS drops.
    fn decide_injection(&mut self, now_ms: f64, fps: u32, bunnies: usize) -> Option<InputKind> {
        if self.mode != HarnessMode::SelfDriving || self.saturated {
            return None;
        }
        if f64::from(fps) >= self.fps_threshold {
            self.latency.arm(now_ms, bunnies);
            Some(InputKind::Press)
        } else {
            self.saturated = true;
            self.latency.clear();
            info!(
                "Saturated at {} bunnies ({} fps < {:.0}), releasing input",
                format_count(bunnies),
                fps,
                self.fps_threshold
            );
            Some(InputKind::Release)
        }
    }
}
