//! Frame timing series and their statistics.

use serde::{Deserialize, Serialize};

/// Frame callbacks of the current report window.
///
/// Holds only the deltas of this window; [`FrameWindow::reset`] clears them
/// but keeps the last callback timestamp so the first delta of the next
/// window is still measured.
#[derive(Debug, Clone, Default)]
pub struct FrameWindow {
    started_at_ms: f64,
    frames: u32,
    frame_times: Vec<f64>,
    last_frame_ms: Option<f64>,
}

impl FrameWindow {
    pub fn new(started_at_ms: f64) -> Self {
        Self {
            started_at_ms,
            frames: 0,
            // One second of 144Hz without reallocation
            frame_times: Vec::with_capacity(144),
            last_frame_ms: None,
        }
    }

    /// Record a render callback at `now_ms`.
    pub fn record_frame(&mut self, now_ms: f64) {
        if let Some(previous) = self.last_frame_ms {
            self.frame_times.push(now_ms - previous);
        }
        self.last_frame_ms = Some(now_ms);
        self.frames += 1;
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn frame_times(&self) -> &[f64] {
        &self.frame_times
    }

    pub fn started_at_ms(&self) -> f64 {
        self.started_at_ms
    }

    /// Whether a window of `window_ms` has elapsed at `now_ms`
    pub fn is_complete(&self, now_ms: f64, window_ms: f64) -> bool {
        now_ms - self.started_at_ms >= window_ms
    }

    /// Average, min and max of this window's deltas; `None` when empty
    pub fn summary(&self) -> Option<FrameSummary> {
        if self.frame_times.is_empty() {
            return None;
        }
        let sum: f64 = self.frame_times.iter().sum();
        let min = self.frame_times.iter().copied().fold(f64::MAX, f64::min);
        let max = self.frame_times.iter().copied().fold(f64::MIN, f64::max);
        Some(FrameSummary {
            avg_ms: sum / self.frame_times.len() as f64,
            min_ms: min,
            max_ms: max,
        })
    }

    /// Start a new window at `now_ms`
    pub fn reset(&mut self, now_ms: f64) {
        self.started_at_ms = now_ms;
        self.frames = 0;
        self.frame_times.clear();
    }
}

/// Per-window frame time aggregate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSummary {
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Distribution statistics over a whole session's samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub p95: f64,
    pub p99: f64,
    pub count: usize,
}

impl SampleStats {
    /// Compute stats; an empty slice gives all zeros.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let min = sorted.first().copied().unwrap_or(0.0);
        let max = sorted.last().copied().unwrap_or(0.0);
        let median = if sorted.len() % 2 == 0 {
            let mid = sorted.len() / 2;
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[sorted.len() / 2]
        };
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;

        let variance =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        let std_dev = variance.sqrt();

        let p95_idx = ((sorted.len() as f64) * 0.95) as usize;
        let p99_idx = ((sorted.len() as f64) * 0.99) as usize;
        let p95 = sorted[p95_idx.min(sorted.len() - 1)];
        let p99 = sorted[p99_idx.min(sorted.len() - 1)];

        Self {
            min,
            max,
            median,
            mean,
            std_dev,
            p95,
            p99,
            count: samples.len(),
        }
    }
}

/// Formats a number with appropriate suffix (K, M, B)
pub fn format_count(count: usize) -> String {
    if count >= 1_000_000_000 {
        format!("{:.2}B", count as f64 / 1_000_000_000.0)
    } else if count >= 1_000_000 {
        format!("{:.2}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        format!("{}", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_no_delta() {
        let mut window = FrameWindow::new(0.0);
        window.record_frame(5.0);
        assert_eq!(window.frames(), 1);
        assert!(window.frame_times().is_empty());
        assert!(window.summary().is_none());

        window.record_frame(21.0);
        window.record_frame(29.0);
        let summary = window.summary().unwrap();
        assert!((summary.avg_ms - 12.0).abs() < 1e-9);
        assert_eq!(summary.min_ms, 8.0);
        assert_eq!(summary.max_ms, 16.0);
    }

    #[test]
    fn reset_keeps_last_timestamp() {
        let mut window = FrameWindow::new(0.0);
        window.record_frame(990.0);
        window.record_frame(1000.0);
        assert!(window.is_complete(1000.0, 1000.0));
        window.reset(1000.0);
        assert_eq!(window.frames(), 0);
        assert!(!window.is_complete(1500.0, 1000.0));

        window.record_frame(1016.0);
        assert_eq!(window.frame_times(), &[16.0]);
    }

    #[test]
    fn sample_stats_percentiles() {
        let samples: Vec<f64> = (1..=100).map(f64::from).collect();
        let stats = SampleStats::from_samples(&samples);
        assert_eq!(stats.count, 100);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 100.0);
        assert!((stats.median - 50.5).abs() < 1e-9);
        assert!((stats.mean - 50.5).abs() < 1e-9);
        assert_eq!(stats.p95, 96.0);
        assert_eq!(stats.p99, 100.0);
    }

    #[test]
    fn empty_samples_are_zero() {
        assert_eq!(SampleStats::from_samples(&[]), SampleStats::default());
    }

    #[test]
    fn count_formatting() {
        assert_eq!(format_count(950), "950");
        assert_eq!(format_count(12_300), "12.3K");
        assert_eq!(format_count(2_500_000), "2.50M");
    }
}
