//! The bunnymark workload and its engine adapter surface.
//!
//! Spawns bunnies while the pointer is held, one batch per simulation tick,
//! and exposes the `{fps, ticks, bunnies}` snapshot the collector reads.

use bevy::log::info;
use bevy::math::Vec2;

use crate::components::{BunnyTemplate, FastRng};
use crate::config::HarnessConfig;
use crate::input::{InputTarget, PointerState};
use crate::metrics::{format_count, EngineMetrics, MetricsSource};
use crate::simulation::{AdvanceOutcome, EntityStore, FixedStepSimulator, SimulationClock};

pub struct Bunnymark {
    store: EntityStore,
    simulator: FixedStepSimulator,
    pointer: PointerState,
    spawn_batch: usize,
    engine_fps: Option<f64>,
}

impl Bunnymark {
    /// Build the workload and spawn the initial population.
    pub fn new(config: &HarnessConfig) -> Self {
        let template = BunnyTemplate {
            size: config.bunny_size(),
            bounce_min: config.bounce_min,
            bounce_max: config.bounce_max,
        };
        let store = EntityStore::new(template, FastRng::with_seed(config.seed));
        let simulator = FixedStepSimulator::new(
            SimulationClock::new(config.tick_interval_ms),
            config.playfield,
            config.physics,
        )
        .with_budget(config.tick_budget());

        let mut workload = Self {
            store,
            simulator,
            pointer: PointerState::default(),
            spawn_batch: config.spawn_batch,
            engine_fps: None,
        };
        workload.store.spawn(config.initial_bunnies);
        info!("Spawned {} initial bunnies", config.initial_bunnies);
        workload
    }

    /// Run the fixed-step simulation for `delta_ms` of wall time.
    pub fn advance(&mut self, delta_ms: f64) -> AdvanceOutcome {
        let held = self.pointer.held;
        let batch = self.spawn_batch;
        self.simulator
            .advance_with(delta_ms, &mut self.store, |store| {
                if held {
                    store.spawn(batch);
                }
            })
    }

    /// Top the population up to the next multiple of `multiple`; a full
    /// step when already on one. Returns how many were spawned.
    pub fn round_up_to(&mut self, multiple: usize) -> usize {
        if multiple == 0 {
            return 0;
        }
        let to_add = multiple - self.store.count() % multiple;
        let total = self.store.spawn(to_add);
        info!("Rounded up to {} bunnies", format_count(total));
        to_add
    }

    /// FPS as estimated by the hosting engine
    pub fn set_engine_fps(&mut self, fps: Option<f64>) {
        self.engine_fps = fps;
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn simulator(&self) -> &FixedStepSimulator {
        &self.simulator
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn bunnies(&self) -> usize {
        self.store.count()
    }
}

impl MetricsSource for Bunnymark {
    fn metrics(&self) -> EngineMetrics {
        EngineMetrics {
            fps: self.engine_fps,
            ticks: self.simulator.tick_count(),
            bunnies: self.store.count(),
        }
    }
}

impl InputTarget for Bunnymark {
    fn press(&mut self, at: Vec2) {
        self.pointer.press(at);
    }

    fn release(&mut self, at: Vec2) {
        self.pointer.release(at);
    }
}
