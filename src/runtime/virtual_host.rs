//! Deterministic fake clock for headless runs and tests.
//!
//! Frame callbacks are spaced by the configured refresh interval, stretched
//! by a per-bunny render cost, so a self-driving run saturates the same way
//! on every machine.

use bevy::log::debug;

use crate::benchmark::BenchmarkSession;
use crate::config::HarnessConfig;
use crate::runtime::{Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimerKind {
    Frame,
    Interval(f64),
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    due_ms: f64,
}

/// Counts from one [`VirtualScheduler::run_for`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtualRun {
    pub frames: u64,
    pub polls: u64,
    /// The session asked to exit before the duration elapsed
    pub exited: bool,
}

pub struct VirtualScheduler {
    now_ms: f64,
    frame_interval_ms: f64,
    frame_cost_ms_per_bunny: f64,
    timers: Vec<Timer>,
    next_id: u32,
}

impl VirtualScheduler {
    pub fn new(frame_interval_ms: f64, frame_cost_ms_per_bunny: f64) -> Self {
        Self {
            now_ms: 0.0,
            frame_interval_ms,
            frame_cost_ms_per_bunny,
            timers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(
            config.frame_interval_ms,
            config.virtual_frame_cost_us_per_bunny / 1000.0,
        )
    }

    /// Number of registered callbacks
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    /// Earliest due time among registered callbacks
    pub fn next_due(&self) -> Option<f64> {
        self.next_timer().map(|t| t.due_ms)
    }

    /// Fire due callbacks in time order for `duration_ms` of virtual time.
    pub fn run_for(&mut self, session: &mut BenchmarkSession, duration_ms: f64) -> VirtualRun {
        let end = self.now_ms + duration_ms;
        let mut run = VirtualRun::default();

        while let Some(timer) = self.next_timer() {
            if timer.due_ms > end {
                break;
            }
            self.now_ms = self.now_ms.max(timer.due_ms);
            session.dispatch(timer.id, self.now_ms);

            match timer.kind {
                TimerKind::Frame => {
                    run.frames += 1;
                    let cost = self.frame_cost_ms_per_bunny * session.bunnies() as f64;
                    self.reschedule(timer.id, self.now_ms + self.frame_interval_ms.max(cost));
                }
                TimerKind::Interval(interval) => {
                    run.polls += 1;
                    self.reschedule(timer.id, timer.due_ms + interval);
                }
            }

            if session.should_exit() {
                run.exited = true;
                return run;
            }
        }

        self.now_ms = end;
        debug!(
            "Virtual run: {} frames, {} polls, now {:.1}ms",
            run.frames, run.polls, self.now_ms
        );
        run
    }

    fn next_timer(&self) -> Option<Timer> {
        self.timers
            .iter()
            .copied()
            .min_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
    }

    fn reschedule(&mut self, id: TimerId, due_ms: f64) {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.id == id) {
            timer.due_ms = due_ms;
        }
    }

    fn register(&mut self, kind: TimerKind, due_ms: f64) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer { id, kind, due_ms });
        id
    }
}

impl Scheduler for VirtualScheduler {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn on_frame(&mut self) -> TimerId {
        self.register(TimerKind::Frame, self.now_ms + self.frame_interval_ms)
    }

    fn every(&mut self, interval_ms: f64) -> TimerId {
        let interval = interval_ms.max(f64::EPSILON);
        self.register(TimerKind::Interval(interval), self.now_ms + interval)
    }

    fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }
}
