//! The swarm: sole owner of every tribe and, through them, every particle.
//!
//! Tribes and particles refer to each other only by id. Ids are handed out
//! by the swarm and never reused, so a stale id simply fails to resolve.

use log::debug;
use rand::Rng;

use crate::core::error::TribesResult;
use crate::search::{Objective, PositionSampler};

use super::particle::{Particle, ParticleFactory, ParticleId, Solution};
use super::tribe::{Tribe, TribeId};

#[derive(Debug, Clone, Default)]
pub struct Swarm {
    pub(crate) tribes: Vec<Tribe>,
    next_tribe_id: u64,
    next_particle_id: u64,
}

impl Swarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tribes in swarm order
    pub fn tribes(&self) -> &[Tribe] {
        &self.tribes
    }

    pub fn tribe(&self, id: TribeId) -> Option<&Tribe> {
        self.tribes.iter().find(|t| t.id == id)
    }

    pub fn tribe_mut(&mut self, id: TribeId) -> Option<&mut Tribe> {
        self.tribes.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TribeId) -> bool {
        self.tribe(id).is_some()
    }

    /// Number of tribes
    pub fn len(&self) -> usize {
        self.tribes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tribes.is_empty()
    }

    /// Number of particles across all tribes
    pub fn swarm_size(&self) -> usize {
        self.tribes.iter().map(Tribe::len).sum()
    }

    pub fn tribe_ids(&self) -> Vec<TribeId> {
        self.tribes.iter().map(|t| t.id).collect()
    }

    /// Reserve an id for a particle built outside a factory
    pub fn allocate_particle_id(&mut self) -> ParticleId {
        let id = ParticleId(self.next_particle_id);
        self.next_particle_id += 1;
        id
    }

    /// Build a fresh, still detached particle
    pub fn spawn_particle<O, S, R>(&mut self, factory: &ParticleFactory<O, S>, rng: &mut R) -> Particle
    where
        O: Objective,
        S: PositionSampler,
        R: Rng + ?Sized,
    {
        let id = self.allocate_particle_id();
        factory.create(id, rng)
    }

    /// Wrap `members` in a new tribe and append it to the swarm
    pub fn create_tribe(&mut self, members: Vec<Particle>) -> TribesResult<TribeId> {
        let id = TribeId(self.next_tribe_id);
        let tribe = Tribe::new(id, members)?;
        self.next_tribe_id += 1;

        debug!(
            "Created tribe {} with {} members (shaman error {})",
            id,
            tribe.len(),
            tribe.best_error()
        );
        self.tribes.push(tribe);
        Ok(id)
    }

    /// Drop every tribe without members, scrubbing it from the informer graph
    pub fn remove_empty_tribes(&mut self) -> Vec<TribeId> {
        let empty: Vec<TribeId> = self
            .tribes
            .iter()
            .filter(|t| t.is_empty())
            .map(|t| t.id)
            .collect();

        for &id in &empty {
            self.unlink_all(id);
        }
        self.tribes.retain(|t| !t.is_empty());

        if !empty.is_empty() {
            debug!("Removed empty tribes {:?}", empty);
        }
        empty
    }

    /// Re-elect the shaman of every tribe
    pub fn update_shamans(&mut self) {
        for tribe in &mut self.tribes {
            tribe.update_shaman();
        }
    }

    /// Refresh the good/bad status of every tribe
    pub fn update_is_good(&mut self) {
        for tribe in &mut self.tribes {
            tribe.update_is_good();
        }
    }

    /// Best solution held by any particle
    pub fn best_solution(&self) -> Option<&Solution> {
        self.tribes
            .iter()
            .flat_map(|t| t.members.iter())
            .map(|p| &p.best_solution)
            .min_by(|a, b| a.error.total_cmp(&b.error))
    }

    /// Tribe ids sorted by a fresh uniform key each, i.e. a random permutation
    pub fn tribes_in_random_order<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<TribeId> {
        let mut keyed: Vec<(f64, TribeId)> = self
            .tribes
            .iter()
            .map(|t| (rng.random::<f64>(), t.id))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().map(|(_, id)| id).collect()
    }
}
