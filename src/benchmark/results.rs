//! Session results collection, summary and export.

use std::fs;
use std::path::{Path, PathBuf};

use bevy::log::info;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::metrics::{MetricsReport, SampleStats};
use crate::state::HarnessMode;

/// System information for context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu_cores: usize,
    pub bevy_version: String,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_cores: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
            bevy_version: "0.17.3".to_string(),
        }
    }
}

/// Whole-session aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub windows: usize,
    /// Largest population reported while FPS met the threshold
    pub peak_healthy_bunnies: usize,
    /// Population when self-driving mode saturated
    pub saturated_at_bunnies: Option<usize>,
    pub fps: SampleStats,
    pub tps: SampleStats,
    pub avg_frame_ms: SampleStats,
    pub latency_ms: Option<SampleStats>,
}

/// Complete session report as written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub timestamp: String,
    pub label: String,
    pub environment: String,
    pub mode: HarnessMode,
    pub fps_threshold: f64,
    pub system_info: SystemInfo,
    pub summary: SessionSummary,
    pub windows: Vec<MetricsReport>,
}

/// Where [`BenchmarkResults::save`] wrote its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResults {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Every window report of one session
pub struct BenchmarkResults {
    label: String,
    environment: String,
    mode: HarnessMode,
    fps_threshold: f64,
    started_at: DateTime<Utc>,
    windows: Vec<MetricsReport>,
    saturated_at: Option<usize>,
}

impl BenchmarkResults {
    pub fn new(config: &HarnessConfig) -> Self {
        Self {
            label: config.label.clone(),
            environment: config.environment.clone(),
            mode: config.mode,
            fps_threshold: config.fps_threshold,
            started_at: Utc::now(),
            windows: Vec::new(),
            saturated_at: None,
        }
    }

    pub fn record_window(&mut self, report: MetricsReport) {
        self.windows.push(report);
    }

    pub fn mark_saturated(&mut self, bunnies: usize) {
        self.saturated_at.get_or_insert(bunnies);
    }

    pub fn windows(&self) -> &[MetricsReport] {
        &self.windows
    }

    pub fn has_results(&self) -> bool {
        !self.windows.is_empty()
    }

    pub fn summary(&self) -> SessionSummary {
        let fps: Vec<f64> = self.windows.iter().map(|w| f64::from(w.fps)).collect();
        let tps: Vec<f64> = self.windows.iter().map(|w| w.tps as f64).collect();
        let frame: Vec<f64> = self.windows.iter().filter_map(|w| w.avg_frame_ms).collect();
        let latency: Vec<f64> = self.windows.iter().filter_map(|w| w.latency_ms).collect();

        let peak_healthy_bunnies = self
            .windows
            .iter()
            .filter(|w| f64::from(w.fps) >= self.fps_threshold)
            .map(|w| w.bunnies)
            .max()
            .unwrap_or(0);

        SessionSummary {
            windows: self.windows.len(),
            peak_healthy_bunnies,
            saturated_at_bunnies: self.saturated_at,
            fps: SampleStats::from_samples(&fps),
            tps: SampleStats::from_samples(&tps),
            avg_frame_ms: SampleStats::from_samples(&frame),
            latency_ms: (!latency.is_empty())
                .then(|| SampleStats::from_samples(&latency)),
        }
    }

    pub fn build_report(&self) -> SessionReport {
        SessionReport {
            timestamp: self.started_at.to_rfc3339(),
            label: self.label.clone(),
            environment: self.environment.clone(),
            mode: self.mode,
            fps_threshold: self.fps_threshold,
            system_info: SystemInfo::default(),
            summary: self.summary(),
            windows: self.windows.clone(),
        }
    }

    /// Header plus one row per window, same format as the live stream
    pub fn to_csv(&self) -> String {
        let mut csv = MetricsReport::header();
        csv.push('\n');
        for window in &self.windows {
            csv.push_str(&window.to_row());
            csv.push('\n');
        }
        csv
    }

    /// Write `<dir>/bunnymark_<label>_<timestamp>.{csv,json}`.
    pub fn save(&self, dir: &Path) -> Result<SavedResults> {
        if !self.has_results() {
            return Err(HarnessError::NothingToSave);
        }

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| HarnessError::ResultsDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let stem = format!(
            "bunnymark_{}_{}",
            file_safe(&self.label),
            self.started_at.format("%Y%m%d_%H%M%S")
        );
        let csv = dir.join(format!("{stem}.csv"));
        let json = dir.join(format!("{stem}.json"));

        write_file(&csv, self.to_csv())?;
        let body = serde_json::to_string_pretty(&self.build_report())?;
        write_file(&json, body)?;

        info!("Results saved to {} and {}", csv.display(), json.display());
        Ok(SavedResults { csv, json })
    }
}

fn write_file(path: &Path, contents: String) -> Result<()> {
    fs::write(path, contents).map_err(|source| HarnessError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn file_safe(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}
