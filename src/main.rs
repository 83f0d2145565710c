//! Bunnymark Harness
//!
//! Self-driving bunnymark on Bevy. Pass a JSON config path as the first
//! argument or in `BUNNYMARK_CONFIG`.
//!
//! Run with: `cargo run --release -- bunnymark.json`
//! Heap usage instead of RSS: `cargo run --release --features memory_profiling`

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::diagnostic::{DiagnosticsPlugin, FrameTimeDiagnosticsPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bunnymark_harness::benchmark::BenchmarkSession;
use bunnymark_harness::config::{HarnessConfig, VIRTUAL_RUN_MS};
use bunnymark_harness::metrics::LoadTimer;
use bunnymark_harness::runtime::VirtualScheduler;
use bunnymark_harness::state::HostKind;
use bunnymark_harness::BunnymarkPlugin;

#[cfg(feature = "memory_profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() -> AppExit {
    #[cfg(feature = "memory_profiling")]
    let _heap_profiler = bunnymark_harness::metrics::HeapProfiler::start();

    let load_timer = LoadTimer::mark_start();
    let (config, config_error) = match HarnessConfig::from_env() {
        Ok(config) => (config, None),
        Err(e) => (HarnessConfig::default(), Some(e)),
    };

    let mut app = App::new();
    match config.host {
        HostKind::Window => {
            app.add_plugins(DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Bunnymark".into(),
                    resolution: (
                        config.playfield.width as u32,
                        config.playfield.height as u32,
                    )
                        .into(),
                    present_mode: bevy::window::PresentMode::AutoNoVsync,
                    ..default()
                }),
                ..default()
            }))
            .add_plugins(FrameTimeDiagnosticsPlugin::default());
        }
        HostKind::Headless => {
            app.add_plugins(
                MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                    config.frame_interval_ms / 1000.0,
                ))),
            )
            .add_plugins((
                LogPlugin::default(),
                DiagnosticsPlugin,
                FrameTimeDiagnosticsPlugin::default(),
            ));
        }
        HostKind::Virtual => {
            app.add_plugins(LogPlugin::default());
        }
    }

    if let Some(e) = config_error {
        error!("{}, using defaults", e);
    }
    info!(
        "Bunnymark '{}' on {} ({} mode, {:?} host)",
        config.label,
        config.environment,
        config.mode.name(),
        config.host
    );

    if config.host == HostKind::Virtual {
        return run_virtual(&config, load_timer);
    }

    app.add_plugins(BunnymarkPlugin::new(config, load_timer)).run()
}

/// Drive the session on the deterministic clock, then save.
fn run_virtual(config: &HarnessConfig, mut load_timer: LoadTimer) -> AppExit {
    let mut session = BenchmarkSession::from_config(config);
    let mut scheduler = VirtualScheduler::from_config(config);

    load_timer.mark_end();
    session.start(&mut scheduler, load_timer.duration_ms());
    let run = scheduler.run_for(
        &mut session,
        config.run_duration_ms.unwrap_or(VIRTUAL_RUN_MS),
    );
    session.stop(&mut scheduler);

    let summary = session.results().summary();
    info!(
        "Virtual run done: {} frames, {} windows, peak healthy population {}",
        run.frames, summary.windows, summary.peak_healthy_bunnies
    );

    if config.save_results && session.results().has_results() {
        if let Err(e) = session.results().save(&config.results_dir) {
            error!("Failed to save results: {}", e);
            return AppExit::error();
        }
    }
    AppExit::Success
}
