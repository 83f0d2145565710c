//! Configuration constants and the runtime [`HarnessConfig`].
//!
//! The constants are the defaults every engine variant of the bunnymark
//! agrees on. Override them per run with a JSON config file.

use std::fs;
use std::path::{Path, PathBuf};

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::simulation::{PhysicsParams, Playfield, TickBudget};
use crate::state::{HarnessMode, HostKind};

/// Playfield width in display units
pub const PLAYFIELD_WIDTH: f32 = 640.0;

/// Playfield height in display units
pub const PLAYFIELD_HEIGHT: f32 = 480.0;

/// Distance from the top below which upward velocity is damped
pub const UPPER_BOUND: f32 = 40.0;

/// Downward acceleration applied once per tick (display units per tick²)
pub const GRAVITY: f32 = 0.75;

/// Multiplier applied to upward velocity above the damping line
pub const UPWARD_DAMPING: f32 = 0.7;

/// Native bunny sprite size in pixels
pub const SPRITE_WIDTH: f32 = 26.0;
pub const SPRITE_HEIGHT: f32 = 37.0;

/// Display scale applied to the sprite
pub const BUNNY_SCALE: f32 = 0.2;

/// Fixed simulation tick interval in milliseconds (60 ticks per second)
pub const TICK_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Length of one metrics aggregation window in milliseconds
pub const WINDOW_MS: f64 = 1000.0;

/// Self-driving mode keeps adding load while FPS stays at or above this
pub const FPS_HEALTH_THRESHOLD: f64 = 60.0;

/// Interval of the latency poll timer in milliseconds
pub const LATENCY_POLL_INTERVAL_MS: f64 = 4.0;

/// Bunnies spawned per tick while the pointer is held
pub const SPAWN_BATCH: usize = 10;

/// Population created when a session starts
pub const INITIAL_BUNNIES: usize = 10;

/// Display refresh interval assumed by the headless and virtual hosts
pub const HOST_FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Modeled render cost per bunny for the virtual host, in microseconds
pub const VIRTUAL_FRAME_COST_US_PER_BUNNY: f64 = 0.5;

/// Default seed for the spawn RNG
pub const DEFAULT_SEED: u64 = 42;

/// Environment variable holding the config file path
pub const CONFIG_ENV_VAR: &str = "BUNNYMARK_CONFIG";

/// Results output directory
pub const RESULTS_DIR: &str = "benchmark_results";

/// Virtual-clock run length when no duration is configured
pub const VIRTUAL_RUN_MS: f64 = 120_000.0;

/// Every tunable of one benchmark session.
///
/// Missing fields in a config file fall back to the constants above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// First report column, e.g. the engine/language under test
    pub label: String,
    /// Second report column, e.g. browser or OS/arch
    pub environment: String,
    pub mode: HarnessMode,
    pub host: HostKind,
    /// Frame cadence of the headless and virtual hosts
    pub frame_interval_ms: f64,
    /// Render cost per bunny modeled by the virtual host
    pub virtual_frame_cost_us_per_bunny: f64,
    /// Stop after this much wall (or virtual) time; `None` runs until exit
    pub run_duration_ms: Option<f64>,
    pub tick_interval_ms: f64,
    /// Cap on ticks per frame; `None` drains the accumulator fully
    pub max_ticks_per_frame: Option<u32>,
    pub window_ms: f64,
    pub fps_threshold: f64,
    pub poll_interval_ms: f64,
    pub initial_bunnies: usize,
    pub spawn_batch: usize,
    pub seed: u64,
    pub bounce_min: f32,
    pub bounce_max: f32,
    pub sprite_width: f32,
    pub sprite_height: f32,
    pub bunny_scale: f32,
    pub playfield: Playfield,
    pub physics: PhysicsParams,
    pub results_dir: PathBuf,
    pub save_results: bool,
    /// Exit this many windows after self-driving mode saturates
    pub exit_after_saturation_windows: Option<u32>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            label: "Rust".to_string(),
            environment: default_environment(),
            mode: HarnessMode::default(),
            host: HostKind::default(),
            frame_interval_ms: HOST_FRAME_INTERVAL_MS,
            virtual_frame_cost_us_per_bunny: VIRTUAL_FRAME_COST_US_PER_BUNNY,
            run_duration_ms: None,
            tick_interval_ms: TICK_INTERVAL_MS,
            max_ticks_per_frame: None,
            window_ms: WINDOW_MS,
            fps_threshold: FPS_HEALTH_THRESHOLD,
            poll_interval_ms: LATENCY_POLL_INTERVAL_MS,
            initial_bunnies: INITIAL_BUNNIES,
            spawn_batch: SPAWN_BATCH,
            seed: DEFAULT_SEED,
            bounce_min: 1.0,
            bounce_max: 1.0,
            sprite_width: SPRITE_WIDTH,
            sprite_height: SPRITE_HEIGHT,
            bunny_scale: BUNNY_SCALE,
            playfield: Playfield::default(),
            physics: PhysicsParams::default(),
            results_dir: PathBuf::from(RESULTS_DIR),
            save_results: true,
            exit_after_saturation_windows: None,
        }
    }
}

impl HarnessConfig {
    /// Load a config file. Fields absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| HarnessError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| HarnessError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject intervals the schedulers cannot make progress with.
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("tick_interval_ms", self.tick_interval_ms),
            ("frame_interval_ms", self.frame_interval_ms),
            ("poll_interval_ms", self.poll_interval_ms),
            ("window_ms", self.window_ms),
        ];
        for (field, value) in intervals {
            if !value.is_finite() || value <= 0.0 {
                return Err(HarnessError::InvalidConfig { field, value });
            }
        }
        if let Some(duration) = self.run_duration_ms {
            if !duration.is_finite() || duration < 0.0 {
                return Err(HarnessError::InvalidConfig {
                    field: "run_duration_ms",
                    value: duration,
                });
            }
        }
        Ok(())
    }

    /// Config path from the first CLI argument, else from `BUNNYMARK_CONFIG`.
    pub fn resolve_path() -> Option<PathBuf> {
        std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
    }

    /// Load from the resolved path, or defaults when none is given.
    pub fn from_env() -> Result<Self> {
        match Self::resolve_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Scaled bunny bounding size
    pub fn bunny_size(&self) -> Vec2 {
        Vec2::new(self.sprite_width, self.sprite_height) * self.bunny_scale
    }

    pub fn tick_budget(&self) -> TickBudget {
        match self.max_ticks_per_frame {
            Some(max_ticks) => TickBudget::DropBacklog {
                max_ticks: max_ticks.max(1),
            },
            None => TickBudget::Unbounded,
        }
    }
}

fn default_environment() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: HarnessConfig =
            serde_json::from_str(r#"{ "label": "Go", "max_ticks_per_frame": 5 }"#).unwrap();
        assert_eq!(config.label, "Go");
        assert_eq!(config.spawn_batch, SPAWN_BATCH);
        assert_eq!(config.tick_budget(), TickBudget::DropBacklog { max_ticks: 5 });
        assert!((config.window_ms - WINDOW_MS).abs() < f64::EPSILON);
    }

    #[test]
    fn uncapped_by_default() {
        assert_eq!(HarnessConfig::default().tick_budget(), TickBudget::Unbounded);
    }

    #[test]
    fn bunny_size_scales_sprite() {
        let size = HarnessConfig::default().bunny_size();
        assert!((size.x - 5.2).abs() < 1e-4);
        assert!((size.y - 7.4).abs() < 1e-4);
    }

    #[test]
    fn mode_parses_snake_case() {
        let config: HarnessConfig =
            serde_json::from_str(r#"{ "mode": "self_driving", "host": "virtual" }"#).unwrap();
        assert_eq!(config.mode, HarnessMode::SelfDriving);
        assert_eq!(config.host, HostKind::Virtual);
    }

    fn rejected_field(config: HarnessConfig) -> &'static str {
        match config.validate() {
            Err(HarnessError::InvalidConfig { field, .. }) => field,
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(HarnessConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let config = HarnessConfig {
            tick_interval_ms: 0.0,
            ..Default::default()
        };
        assert_eq!(rejected_field(config), "tick_interval_ms");
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let config = HarnessConfig {
            poll_interval_ms: 0.0,
            ..Default::default()
        };
        assert_eq!(rejected_field(config), "poll_interval_ms");
    }

    #[test]
    fn negative_frame_interval_is_rejected() {
        let config = HarnessConfig {
            frame_interval_ms: -16.0,
            ..Default::default()
        };
        assert_eq!(rejected_field(config), "frame_interval_ms");

        let config = HarnessConfig {
            frame_interval_ms: 0.0,
            ..Default::default()
        };
        assert_eq!(rejected_field(config), "frame_interval_ms");
    }

    #[test]
    fn non_finite_window_is_rejected() {
        let config = HarnessConfig {
            window_ms: f64::NAN,
            ..Default::default()
        };
        assert_eq!(rejected_field(config), "window_ms");

        let config = HarnessConfig {
            window_ms: f64::INFINITY,
            ..Default::default()
        };
        assert_eq!(rejected_field(config), "window_ms");
    }

    #[test]
    fn negative_run_duration_is_rejected() {
        let config = HarnessConfig {
            run_duration_ms: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(rejected_field(config), "run_duration_ms");
    }

    #[test]
    fn load_validates_the_file() {
        let path = std::env::temp_dir().join(format!(
            "bunnymark_invalid_config_{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"{ "poll_interval_ms": 0 }"#).unwrap();
        let err = HarnessConfig::load(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(
            err,
            HarnessError::InvalidConfig {
                field: "poll_interval_ms",
                ..
            }
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = HarnessConfig::load(Path::new("/nonexistent/bunnymark.json")).unwrap_err();
        assert!(matches!(err, HarnessError::ConfigRead { .. }));
    }
}
