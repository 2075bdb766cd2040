//! Tribes: groups of particles sharing one shaman.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{TribesError, TribesResult};

use super::particle::{Particle, ParticleId};

/// Stable identity of a tribe; never reused within one swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TribeId(pub u64);

impl fmt::Display for TribeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// A group of particles and its place in the informer graph
#[derive(Debug, Clone)]
pub struct Tribe {
    pub id: TribeId,

    /// Particles owned by this tribe
    pub members: Vec<Particle>,

    /// Member with the lowest best error, as of the last election
    pub shaman: Option<ParticleId>,

    /// Whether the shaman beat `historical_best_error` at the last check
    pub is_good: bool,

    /// Lowest shaman error this tribe has ever reached
    pub historical_best_error: f64,

    /// Tribes whose shamans inform this tribe's shaman. Always symmetric.
    pub informers: Vec<TribeId>,
}

impl Tribe {
    /// Take ownership of `members`, elect a shaman and seed the historical best.
    ///
    /// Fails when `members` is empty or when a member still belongs to
    /// another tribe; no member is touched in that case.
    pub fn new(id: TribeId, mut members: Vec<Particle>) -> TribesResult<Self> {
        if members.is_empty() {
            return Err(TribesError::InvalidMembership(format!(
                "tribe {} needs at least one member",
                id
            )));
        }

        if let Some(owned) = members
            .iter()
            .find(|p| p.parent.is_some_and(|parent| parent != id))
        {
            return Err(TribesError::InvalidMembership(format!(
                "particle {} already belongs to another tribe",
                owned.id
            )));
        }

        for particle in &mut members {
            particle.parent = Some(id);
        }

        let mut tribe = Self {
            id,
            members,
            shaman: None,
            is_good: false,
            historical_best_error: f64::INFINITY,
            informers: Vec::new(),
        };

        tribe.update_shaman();
        tribe.historical_best_error = tribe.best_error();
        tribe.update_is_good();

        Ok(tribe)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member(&self, id: ParticleId) -> Option<&Particle> {
        self.members.iter().find(|p| p.id == id)
    }

    pub fn member_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.members.iter_mut().find(|p| p.id == id)
    }

    pub fn shaman_particle(&self) -> Option<&Particle> {
        self.shaman.and_then(|id| self.member(id))
    }

    /// The tribe's aggregate best: its shaman's best error, or infinity when empty
    pub fn best_error(&self) -> f64 {
        self.shaman_particle()
            .map(|p| p.best_solution.error)
            .unwrap_or(f64::INFINITY)
    }

    pub fn is_informed_by(&self, other: TribeId) -> bool {
        self.informers.contains(&other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(id: u64, error: f64) -> Particle {
        Particle::new(ParticleId(id), vec![error], error, 2)
    }

    #[test]
    fn test_new_tribe_elects_shaman_and_adopts_members() {
        let tribe = Tribe::new(TribeId(7), vec![particle(1, 1.0), particle(2, 2.0)]).unwrap();

        assert_eq!(tribe.shaman, Some(ParticleId(1)));
        assert!(!tribe.is_good);
        assert_eq!(tribe.historical_best_error, 1.0);
        assert!(tribe.members.iter().all(|p| p.parent == Some(TribeId(7))));
        assert!(tribe.informers.is_empty());
    }

    #[test]
    fn test_new_tribe_rejects_empty_members() {
        assert!(matches!(
            Tribe::new(TribeId(0), Vec::new()),
            Err(TribesError::InvalidMembership(_))
        ));
    }

    #[test]
    fn test_new_tribe_rejects_foreign_member() {
        let mut foreign = particle(2, 2.0);
        foreign.parent = Some(TribeId(3));

        let result = Tribe::new(TribeId(0), vec![particle(1, 1.0), foreign]);

        assert!(matches!(result, Err(TribesError::InvalidMembership(_))));
    }

    #[test]
    fn test_empty_tribe_best_error_is_infinite() {
        let mut tribe = Tribe::new(TribeId(0), vec![particle(1, 1.0)]).unwrap();
        tribe.members.clear();
        tribe.update_shaman();
        assert_eq!(tribe.best_error(), f64::INFINITY);
        assert!(tribe.shaman.is_none());
    }
}
