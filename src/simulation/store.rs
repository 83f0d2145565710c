//! Entity store: the only owner of bunny state.

use crate::components::{Bunny, BunnyTemplate, FastRng};

/// Holds every simulated bunny.
///
/// The population only grows during a session; [`EntityStore::reset`] is the
/// single bulk removal point. Growth happens exclusively in
/// [`EntityStore::spawn`], which is what the metrics collector observes as
/// "a spawn happened".
pub struct EntityStore {
    bunnies: Vec<Bunny>,
    template: BunnyTemplate,
    rng: FastRng,
}

impl EntityStore {
    pub fn new(template: BunnyTemplate, rng: FastRng) -> Self {
        Self {
            bunnies: Vec::new(),
            template,
            rng,
        }
    }

    /// Spawn `n` randomized bunnies and return the new population size.
    pub fn spawn(&mut self, n: usize) -> usize {
        // Pre-allocate so a large batch grows the Vec once
        self.bunnies.reserve(n);
        let template = self.template;
        let rng = &mut self.rng.0;
        self.bunnies
            .extend((0..n).map(|_| template.random_with(rng)));
        self.bunnies.len()
    }

    pub fn count(&self) -> usize {
        self.bunnies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bunnies.is_empty()
    }

    /// Apply a mutation to every bunny.
    pub fn for_each<F>(&mut self, f: F)
    where
        F: FnMut(&mut Bunny),
    {
        self.bunnies.iter_mut().for_each(f);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bunny> {
        self.bunnies.iter()
    }

    /// Remove every bunny. Not used during a measurement session.
    pub fn reset(&mut self) {
        self.bunnies.clear();
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(BunnyTemplate::default(), FastRng::default())
    }
}
