//! One benchmark run: workload, collector and input driver wired to a host
//! [`Scheduler`].
//!
//! Within a frame callback the simulation ticks run before the frame sample
//! is recorded, so a window's TPS and FPS cover the same span.

use bevy::log::{debug, info};

use crate::benchmark::results::BenchmarkResults;
use crate::benchmark::workloads::Bunnymark;
use crate::config::HarnessConfig;
use crate::input::{InputKind, InputTarget, SyntheticInputDriver};
use crate::metrics::{
    default_memory_probe, LogSink, MemoryProbe, MetricsCollector, MetricsReport, ReportSink,
};
use crate::runtime::{Scheduler, TimerId};
use crate::state::{CollectorState, HarnessMode};

pub struct BenchmarkSession {
    workload: Bunnymark,
    collector: MetricsCollector,
    driver: SyntheticInputDriver,
    sink: Box<dyn ReportSink + Send + Sync>,
    results: BenchmarkResults,
    mode: HarnessMode,
    poll_interval_ms: f64,
    frame_timer: Option<TimerId>,
    poll_timer: Option<TimerId>,
    last_frame_ms: Option<f64>,
    windows_since_saturation: u32,
    exit_after_saturation_windows: Option<u32>,
}

impl BenchmarkSession {
    pub fn new(
        config: &HarnessConfig,
        memory: Box<dyn MemoryProbe + Send + Sync>,
        sink: Box<dyn ReportSink + Send + Sync>,
    ) -> Self {
        Self {
            workload: Bunnymark::new(config),
            collector: MetricsCollector::new(config, memory),
            driver: SyntheticInputDriver::centered(
                config.playfield.width,
                config.playfield.height,
            ),
            sink,
            results: BenchmarkResults::new(config),
            mode: config.mode,
            poll_interval_ms: config.poll_interval_ms,
            frame_timer: None,
            poll_timer: None,
            last_frame_ms: None,
            windows_since_saturation: 0,
            exit_after_saturation_windows: config.exit_after_saturation_windows,
        }
    }

    /// Session with the default memory probe, reporting through the log
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config, default_memory_probe(), Box::new(LogSink))
    }

    /// Register callbacks with `scheduler` and begin sampling.
    pub fn start(&mut self, scheduler: &mut dyn Scheduler, load_ms: Option<f64>) {
        if self.frame_timer.is_some() || self.collector.state() != CollectorState::Idle {
            return;
        }
        let now = scheduler.now_ms();
        self.collector.set_load_ms(load_ms);
        self.collector.start(now, &self.workload);
        self.last_frame_ms = Some(now);

        self.frame_timer = Some(scheduler.on_frame());
        if self.mode == HarnessMode::SelfDriving {
            self.poll_timer = Some(scheduler.every(self.poll_interval_ms));
        }
        info!(
            "Benchmark started with {} bunnies",
            self.workload.bunnies()
        );
    }

    /// Route a fired callback to its handler. Unknown ids are ignored.
    pub fn dispatch(&mut self, id: TimerId, now_ms: f64) {
        if self.frame_timer == Some(id) {
            self.frame(now_ms);
        } else if self.poll_timer == Some(id) {
            self.poll(now_ms);
        }
    }

    /// One render callback.
    pub fn frame(&mut self, now_ms: f64) {
        let delta = self
            .last_frame_ms
            .map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_frame_ms = Some(now_ms);

        self.workload.advance(delta);

        let Some(close) = self
            .collector
            .on_frame(now_ms, &self.workload, self.sink.as_mut())
        else {
            return;
        };

        if let Some(kind) = close.injection {
            let target: &mut dyn InputTarget = &mut self.workload;
            if !self.driver.inject(kind, Some(target)) {
                self.collector.injection_failed();
            }
        }
        self.record_window(close.report);
    }

    /// Latency poll tick.
    pub fn poll(&mut self, now_ms: f64) {
        self.collector.poll(now_ms, &self.workload);
    }

    /// A real pointer press from the host.
    pub fn press(&mut self, now_ms: f64) {
        self.collector.note_manual_input(now_ms, &self.workload);
        let at = self.driver.position();
        self.workload.press(at);
    }

    /// A real pointer release from the host.
    pub fn release(&mut self) {
        let at = self.driver.position();
        self.workload.release(at);
    }

    /// Top the population up to the next multiple of `multiple`.
    pub fn round_up(&mut self, now_ms: f64, multiple: usize) -> usize {
        self.collector.note_manual_input(now_ms, &self.workload);
        self.workload.round_up_to(multiple)
    }

    pub fn set_engine_fps(&mut self, fps: Option<f64>) {
        self.workload.set_engine_fps(fps);
    }

    /// Deregister both callbacks, stop sampling and let go of any held
    /// synthetic press.
    pub fn stop(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some(id) = self.frame_timer.take() {
            scheduler.cancel(id);
        }
        if let Some(id) = self.poll_timer.take() {
            scheduler.cancel(id);
        }
        self.collector.stop();
        if self.driver.last_dispatched() == Some(InputKind::Press) {
            let target: &mut dyn InputTarget = &mut self.workload;
            self.driver.inject(InputKind::Release, Some(target));
        }
    }

    /// The configured number of windows have closed since saturation.
    pub fn should_exit(&self) -> bool {
        match self.exit_after_saturation_windows {
            Some(windows) => {
                self.collector.is_saturated() && self.windows_since_saturation >= windows
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.collector.state() == CollectorState::Sampling
    }

    pub fn bunnies(&self) -> usize {
        self.workload.bunnies()
    }

    pub fn results(&self) -> &BenchmarkResults {
        &self.results
    }

    pub fn workload(&self) -> &Bunnymark {
        &self.workload
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }

    fn record_window(&mut self, report: MetricsReport) {
        if self.collector.is_saturated() {
            self.windows_since_saturation += 1;
            self.results.mark_saturated(report.bunnies);
        }
        debug!(
            "Window {}: {} fps, {} tps, {} bunnies",
            self.collector.windows_closed(),
            report.fps,
            report.tps,
            report.bunnies
        );
        self.results.record_window(report);
    }
}
