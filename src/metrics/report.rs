//! Per-window report record and its line format.
//!
//! Every session writes one header line followed by one comma-separated row
//! per window. Absent values are empty fields; column order never changes.

use bevy::log::info;
use serde::{Deserialize, Serialize};

/// Column names in output order
pub const REPORT_COLUMNS: [&str; 12] = [
    "label",
    "env",
    "load_ms",
    "fps",
    "fps_game",
    "tps",
    "bunnies",
    "avg_frame",
    "min_frame",
    "max_frame",
    "heap_mb",
    "click_latency_ms",
];

/// Snapshot of one report window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub label: String,
    pub environment: String,
    pub load_ms: Option<f64>,
    /// Render callbacks counted in the window
    pub fps: u32,
    /// FPS as estimated by the engine itself, when it exposes one
    pub fps_game: Option<f64>,
    /// Simulation ticks run during the window
    pub tps: u64,
    pub bunnies: usize,
    pub avg_frame_ms: Option<f64>,
    pub min_frame_ms: Option<f64>,
    pub max_frame_ms: Option<f64>,
    pub heap_mb: Option<f64>,
    /// Most recent input-to-effect latency observed during the window
    pub latency_ms: Option<f64>,
}

impl MetricsReport {
    /// The header line, comma separated
    pub fn header() -> String {
        REPORT_COLUMNS.join(",")
    }

    /// This report as one data line matching [`MetricsReport::header`]
    pub fn to_row(&self) -> String {
        [
            escape(&self.label),
            escape(&self.environment),
            opt(self.load_ms),
            self.fps.to_string(),
            opt(self.fps_game),
            self.tps.to_string(),
            self.bunnies.to_string(),
            opt(self.avg_frame_ms),
            opt(self.min_frame_ms),
            opt(self.max_frame_ms),
            opt(self.heap_mb),
            opt(self.latency_ms),
        ]
        .join(",")
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// Keep free-text columns from breaking the row structure
fn escape(text: &str) -> String {
    text.replace([',', '\n', '\r'], " ")
}

// =============================================================================
// Sinks
// =============================================================================

/// Destination of report lines.
pub trait ReportSink {
    fn write_line(&mut self, line: &str);
}

/// Logs each line under the `bunnymark::report` target
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn write_line(&mut self, line: &str) {
        info!(target: "bunnymark::report", "{}", line);
    }
}

/// Keeps lines in memory
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub lines: Vec<String>,
}

impl ReportSink for VecSink {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
