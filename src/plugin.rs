//! Bevy host for the benchmark session.
//!
//! The main loop plays the role of the cooperative scheduler: every update
//! fires the frame callback, and interval callbacks fire on the first update
//! at or after their due time.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::benchmark::BenchmarkSession;
use crate::config::HarnessConfig;
use crate::metrics::LoadTimer;
use crate::runtime::{Scheduler, TimerId};

/// Installs the session and the systems that drive it
pub struct BunnymarkPlugin {
    pub config: HarnessConfig,
    pub load_timer: LoadTimer,
}

impl BunnymarkPlugin {
    pub fn new(config: HarnessConfig, load_timer: LoadTimer) -> Self {
        Self { config, load_timer }
    }
}

impl Plugin for BunnymarkPlugin {
    fn build(&self, app: &mut App) {
        app
            // Resources
            .insert_resource(Session(BenchmarkSession::from_config(&self.config)))
            .insert_resource(ActiveConfig(self.config.clone()))
            .insert_resource(LoadClock(self.load_timer))
            .init_resource::<BevyScheduler>()
            // Systems
            .add_systems(Startup, start_session)
            .add_systems(PreUpdate, sync_clock)
            .add_systems(
                Update,
                (
                    forward_pointer_input,
                    sync_engine_fps,
                    drive_session,
                    handle_keys,
                    request_exit,
                )
                    .chain(),
            )
            .add_systems(Last, finish_on_exit);
    }
}

#[derive(Resource)]
pub struct Session(pub BenchmarkSession);

#[derive(Resource)]
pub struct ActiveConfig(pub HarnessConfig);

#[derive(Resource)]
pub struct LoadClock(pub LoadTimer);

struct IntervalTimer {
    id: TimerId,
    interval_ms: f64,
    next_due_ms: f64,
}

/// [`Scheduler`] backed by the app's real clock
#[derive(Resource, Default)]
pub struct BevyScheduler {
    now_ms: f64,
    next_id: u32,
    frames: Vec<TimerId>,
    intervals: Vec<IntervalTimer>,
}

impl BevyScheduler {
    pub fn set_now(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    /// Callbacks due this update: every frame callback, then each interval
    /// whose due time has passed. An interval fires at most once per update.
    pub fn due(&mut self) -> Vec<TimerId> {
        let now = self.now_ms;
        let mut due = self.frames.clone();
        for timer in &mut self.intervals {
            if timer.next_due_ms <= now {
                due.push(timer.id);
                let missed = ((now - timer.next_due_ms) / timer.interval_ms).floor();
                timer.next_due_ms += (missed + 1.0) * timer.interval_ms;
            }
        }
        due
    }

    fn next_id(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }
}

impl Scheduler for BevyScheduler {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn on_frame(&mut self) -> TimerId {
        let id = self.next_id();
        self.frames.push(id);
        id
    }

    fn every(&mut self, interval_ms: f64) -> TimerId {
        let id = self.next_id();
        let interval_ms = interval_ms.max(f64::EPSILON);
        self.intervals.push(IntervalTimer {
            id,
            interval_ms,
            next_due_ms: self.now_ms + interval_ms,
        });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.frames.retain(|frame| *frame != id);
        self.intervals.retain(|timer| timer.id != id);
    }
}

fn start_session(
    time: Res<Time<Real>>,
    mut load: ResMut<LoadClock>,
    mut scheduler: ResMut<BevyScheduler>,
    mut session: ResMut<Session>,
) {
    load.0.mark_end();
    scheduler.set_now(time.elapsed_secs_f64() * 1000.0);
    session.0.start(&mut *scheduler, load.0.duration_ms());
}

fn sync_clock(time: Res<Time<Real>>, mut scheduler: ResMut<BevyScheduler>) {
    scheduler.set_now(time.elapsed_secs_f64() * 1000.0);
}

/// Left button holds the spawner; right and middle round the population up
/// to the next hundred and thousand.
fn forward_pointer_input(
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    scheduler: Res<BevyScheduler>,
    mut session: ResMut<Session>,
) {
    let Some(mouse) = mouse else {
        return;
    };
    let now = scheduler.now_ms();

    if mouse.just_pressed(MouseButton::Left) {
        session.0.press(now);
    }
    if mouse.just_released(MouseButton::Left) {
        session.0.release();
    }
    if mouse.just_pressed(MouseButton::Right) {
        session.0.round_up(now, 100);
    }
    if mouse.just_pressed(MouseButton::Middle) {
        session.0.round_up(now, 1000);
    }
}

fn sync_engine_fps(diagnostics: Option<Res<DiagnosticsStore>>, mut session: ResMut<Session>) {
    let fps = diagnostics.and_then(|store| {
        store
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|fps| fps.smoothed())
    });
    session.0.set_engine_fps(fps);
}

fn drive_session(mut scheduler: ResMut<BevyScheduler>, mut session: ResMut<Session>) {
    let now = scheduler.now_ms();
    for id in scheduler.due() {
        session.0.dispatch(id, now);
    }
}

/// Escape exits, S saves the results so far
fn handle_keys(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    session: Res<Session>,
    config: Res<ActiveConfig>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };

    if keyboard.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
        return;
    }

    if keyboard.just_pressed(KeyCode::KeyS) {
        save_results(&session.0, &config.0);
    }
}

/// Exit once saturated for long enough, or when the configured run
/// duration has elapsed
fn request_exit(
    session: Res<Session>,
    scheduler: Res<BevyScheduler>,
    config: Res<ActiveConfig>,
    mut requested: Local<bool>,
    mut exit: MessageWriter<AppExit>,
) {
    if *requested {
        return;
    }
    let timed_out = config
        .0
        .run_duration_ms
        .is_some_and(|duration| scheduler.now_ms() >= duration);
    if session.0.should_exit() || timed_out {
        info!(
            "Benchmark finished with {} bunnies, exiting",
            session.0.bunnies()
        );
        exit.write(AppExit::Success);
        *requested = true;
    }
}

fn finish_on_exit(
    mut exits: MessageReader<AppExit>,
    mut scheduler: ResMut<BevyScheduler>,
    mut session: ResMut<Session>,
    config: Res<ActiveConfig>,
) {
    if exits.read().count() == 0 || !session.0.is_running() {
        return;
    }
    session.0.stop(&mut *scheduler);
    if config.0.save_results {
        save_results(&session.0, &config.0);
    }
}

fn save_results(session: &BenchmarkSession, config: &HarnessConfig) {
    if !session.results().has_results() {
        warn!("No completed windows yet, nothing to save");
        return;
    }
    if let Err(e) = session.results().save(&config.results_dir) {
        error!("Failed to save results: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_fire_every_update_and_intervals_when_due() {
        let mut scheduler = BevyScheduler::default();
        let frame = scheduler.on_frame();
        let poll = scheduler.every(4.0);

        scheduler.set_now(2.0);
        assert_eq!(scheduler.due(), vec![frame]);

        scheduler.set_now(16.0);
        assert_eq!(scheduler.due(), vec![frame, poll]);

        scheduler.set_now(17.0);
        assert_eq!(scheduler.due(), vec![frame]);

        scheduler.cancel(frame);
        scheduler.cancel(poll);
        scheduler.set_now(100.0);
        assert!(scheduler.due().is_empty());
    }

    #[test]
    fn tiny_interval_fires_once_per_update() {
        let mut scheduler = BevyScheduler::default();
        scheduler.set_now(1000.0);
        let poll = scheduler.every(1e-12);

        scheduler.set_now(1016.0);
        assert_eq!(scheduler.due(), vec![poll]);
        scheduler.set_now(1032.0);
        assert_eq!(scheduler.due(), vec![poll]);
    }

    #[test]
    fn headless_app_samples_and_stops_on_exit() {
        let config = HarnessConfig {
            save_results: false,
            ..Default::default()
        };
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(BunnymarkPlugin::new(config, LoadTimer::mark_start()));

        app.update();
        assert!(app.world().resource::<Session>().0.is_running());
        assert!(app.world().resource::<LoadClock>().0.duration_ms().is_some());

        app.world_mut().write_message(AppExit::Success);
        app.update();
        assert!(!app.world().resource::<Session>().0.is_running());
    }
}
