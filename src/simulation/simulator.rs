//! Fixed-step simulator driven by variable-rate render callbacks.

use bevy::log::warn;

use super::clock::SimulationClock;
use super::physics::{step_bunny, PhysicsParams, Playfield};
use super::store::EntityStore;

/// Policy for frames that cover many ticks (e.g. after the host was suspended).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TickBudget {
    /// Drain the whole accumulator, however many ticks that takes
    #[default]
    Unbounded,
    /// Run at most `max_ticks` per frame and discard the remaining whole ticks
    DropBacklog { max_ticks: u32 },
}

/// What one [`FixedStepSimulator::advance`] call did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AdvanceOutcome {
    pub ticks: u32,
    /// Wall time discarded by the tick budget, in milliseconds
    pub dropped_ms: f64,
}

/// Advances bunny state at a constant logical rate.
pub struct FixedStepSimulator {
    clock: SimulationClock,
    field: Playfield,
    params: PhysicsParams,
    budget: TickBudget,
}

impl FixedStepSimulator {
    pub fn new(clock: SimulationClock, field: Playfield, params: PhysicsParams) -> Self {
        Self {
            clock,
            field,
            params,
            budget: TickBudget::Unbounded,
        }
    }

    pub fn with_budget(mut self, budget: TickBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn playfield(&self) -> &Playfield {
        &self.field
    }

    pub fn tick_count(&self) -> u64 {
        self.clock.tick_count()
    }

    /// Catch up to `delta_ms` of elapsed wall time.
    pub fn advance(&mut self, delta_ms: f64, store: &mut EntityStore) -> AdvanceOutcome {
        self.advance_with(delta_ms, store, |_| {})
    }

    /// Like [`advance`](Self::advance), running `before_tick` ahead of the
    /// physics of every tick. Workloads use it to spawn on held input.
    pub fn advance_with<F>(
        &mut self,
        delta_ms: f64,
        store: &mut EntityStore,
        mut before_tick: F,
    ) -> AdvanceOutcome
    where
        F: FnMut(&mut EntityStore),
    {
        self.clock.accumulate(delta_ms);

        let mut outcome = AdvanceOutcome::default();
        while self.clock.consume_tick() {
            before_tick(store);
            self.tick(store);
            outcome.ticks += 1;

            if let TickBudget::DropBacklog { max_ticks } = self.budget {
                if outcome.ticks >= max_ticks {
                    outcome.dropped_ms = self.clock.drop_backlog();
                    break;
                }
            }
        }

        if outcome.dropped_ms > 0.0 {
            warn!(
                "Tick budget of {} exhausted, dropped {:.2}ms of simulation backlog",
                outcome.ticks, outcome.dropped_ms
            );
        }
        outcome
    }

    /// Apply one physics tick to every bunny.
    fn tick(&self, store: &mut EntityStore) {
        let field = self.field;
        let params = self.params;
        store.for_each(|bunny| step_bunny(bunny, &field, &params));
    }
}

impl Default for FixedStepSimulator {
    fn default() -> Self {
        Self::new(
            SimulationClock::default(),
            Playfield::default(),
            PhysicsParams::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TICK_INTERVAL_MS;

    fn simulator(interval: f64) -> FixedStepSimulator {
        FixedStepSimulator::new(
            SimulationClock::new(interval),
            Playfield::default(),
            PhysicsParams::default(),
        )
    }

    #[test]
    fn fifty_ms_yields_two_ticks() {
        let mut sim = simulator(16.667);
        let mut store = EntityStore::default();
        let outcome = sim.advance(50.0, &mut store);
        assert_eq!(outcome.ticks, 2);
        assert!((sim.clock().accumulator_ms() - 16.666).abs() < 1e-9);

        let outcome = sim.advance(16.667, &mut store);
        assert_eq!(outcome.ticks, 1);
        assert_eq!(sim.tick_count(), 3);
        assert!((sim.clock().accumulator_ms() - 16.666).abs() < 1e-9);
    }

    #[test]
    fn exact_multiple_of_the_interval_is_fully_consumed() {
        let mut sim = simulator(10.0);
        let mut store = EntityStore::default();
        assert_eq!(sim.advance(50.0, &mut store).ticks, 5);
        assert_eq!(sim.clock().accumulator_ms(), 0.0);
    }

    #[test]
    fn slow_display_runs_several_ticks_fast_display_skips() {
        let mut sim = simulator(TICK_INTERVAL_MS);
        let mut store = EntityStore::default();
        assert_eq!(sim.advance(4.0, &mut store).ticks, 0);
        assert_eq!(sim.advance(4.0, &mut store).ticks, 0);
        assert_eq!(sim.advance(4.0, &mut store).ticks, 0);
        assert_eq!(sim.advance(4.0, &mut store).ticks, 0);
        assert_eq!(sim.advance(4.0, &mut store).ticks, 1);
        assert_eq!(sim.advance(100.0, &mut store).ticks, 6);
    }

    #[test]
    fn tick_total_matches_floor_of_elapsed() {
        let deltas = [3.2, 16.0, 17.5, 0.0, 41.9, 8.3, 250.0, 1.1, 16.7, 33.3];
        let mut sim = simulator(TICK_INTERVAL_MS);
        let mut store = EntityStore::default();
        let mut total_ticks = 0u64;
        for delta in deltas {
            total_ticks += sim.advance(delta, &mut store).ticks as u64;
            let acc = sim.clock().accumulator_ms();
            assert!((0.0..TICK_INTERVAL_MS).contains(&acc));
        }
        let elapsed: f64 = deltas.iter().sum();
        let expected = (elapsed / TICK_INTERVAL_MS).floor() as i64;
        assert!((total_ticks as i64 - expected).abs() <= 1);
        assert_eq!(total_ticks, sim.tick_count());
        let remainder = elapsed - total_ticks as f64 * TICK_INTERVAL_MS;
        assert!((sim.clock().accumulator_ms() - remainder).abs() < 1e-6);
    }

    #[test]
    fn unbounded_drains_long_pause() {
        let mut sim = simulator(10.0);
        let mut store = EntityStore::default();
        let outcome = sim.advance(10_000.0, &mut store);
        assert_eq!(outcome.ticks, 1000);
        assert_eq!(outcome.dropped_ms, 0.0);
    }

    #[test]
    fn budget_caps_ticks_and_drops_backlog() {
        let mut sim = simulator(10.0).with_budget(TickBudget::DropBacklog { max_ticks: 5 });
        let mut store = EntityStore::default();
        let outcome = sim.advance(10_004.0, &mut store);
        assert_eq!(outcome.ticks, 5);
        assert!((outcome.dropped_ms - 9_950.0).abs() < 1e-6);
        assert!((sim.clock().accumulator_ms() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn before_tick_runs_once_per_tick() {
        let mut sim = simulator(10.0);
        let mut store = EntityStore::default();
        let outcome = sim.advance_with(35.0, &mut store, |store| {
            store.spawn(10);
        });
        assert_eq!(outcome.ticks, 3);
        assert_eq!(store.count(), 30);
    }

    #[test]
    fn ticks_keep_bunnies_in_bounds() {
        let mut sim = simulator(TICK_INTERVAL_MS);
        let mut store = EntityStore::default();
        store.spawn(200);
        for _ in 0..600 {
            sim.advance(TICK_INTERVAL_MS, &mut store);
            let field = *sim.playfield();
            assert!(store.iter().all(|b| field.contains(b)));
        }
    }
}
