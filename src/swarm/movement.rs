//! Informer selection and the per-particle position update.

use log::{debug, trace};
use rand::Rng;

use crate::core::config::MovementConfig;
use crate::search::Objective;

use super::particle::{Particle, ParticleId};
use super::population::Swarm;
use super::tribe::{Tribe, TribeId};

/// Computes where a particle goes next, given the best position among its informers
pub trait MovementRule {
    fn next_position<R: Rng + ?Sized>(
        &self,
        position: &[f64],
        informer_best: &[f64],
        rng: &mut R,
    ) -> Vec<f64>;
}

/// Weighted mean of two points
pub fn center_of_gravity(point1: &[f64], point2: &[f64], mass1: f64, mass2: f64) -> Vec<f64> {
    let total = mass1 + mass2;
    point1
        .iter()
        .zip(point2)
        .map(|(a, b)| (a * mass1 + b * mass2) / total)
        .collect()
}

/// Euclidean distance between two points
pub fn distance(point1: &[f64], point2: &[f64]) -> f64 {
    point1
        .iter()
        .zip(point2)
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt()
}

/// Default rule: a uniform draw around the centre of gravity of the particle
/// and its best informer.
///
/// The informer carries `attraction` times the particle's mass, so the
/// centre leans toward it. Every dimension is drawn within
/// `spread * ‖informer - position‖` of the centre, so coordinates the two
/// already share still move, and the radius shrinks to nothing only once
/// the particle reaches its informer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityPivot {
    pub attraction: f64,
    pub spread: f64,
}

impl Default for GravityPivot {
    fn default() -> Self {
        Self::from(&MovementConfig::default())
    }
}

impl From<&MovementConfig> for GravityPivot {
    fn from(config: &MovementConfig) -> Self {
        Self {
            attraction: config.attraction,
            spread: config.spread,
        }
    }
}

impl MovementRule for GravityPivot {
    fn next_position<R: Rng + ?Sized>(
        &self,
        position: &[f64],
        informer_best: &[f64],
        rng: &mut R,
    ) -> Vec<f64> {
        let center = center_of_gravity(position, informer_best, 1.0, self.attraction);
        let radius = self.spread * distance(position, informer_best);
        center
            .iter()
            .map(|c| c + rng.random_range(-1.0_f64..=1.0) * radius)
            .collect()
    }
}

/// What happened to a single particle during a movement pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The particle was its own best informer
    Stayed,
    Moved { improved: bool },
}

/// Tally of one movement pass over the whole swarm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementStats {
    pub moved: usize,
    pub improved: usize,
    pub stayed: usize,
}

impl Swarm {
    /// Every particle that may guide `particle`: its tribe-mates, plus the
    /// shamans of informing tribes when `particle` is its tribe's shaman.
    /// A particle without a tribe only informs itself.
    pub fn informers_of<'a>(&'a self, particle: &'a Particle) -> Vec<&'a Particle> {
        let Some(tribe) = particle.parent.and_then(|id| self.tribe(id)) else {
            return vec![particle];
        };

        let mut informers: Vec<&Particle> = tribe.members.iter().collect();
        if tribe.shaman == Some(particle.id) {
            informers.extend(
                tribe
                    .informers
                    .iter()
                    .filter_map(|&id| self.tribe(id))
                    .filter_map(Tribe::shaman_particle),
            );
        }
        informers
    }

    /// Lowest best error among the informers of `particle`; first one wins ties
    pub fn best_informer<'a>(&'a self, particle: &'a Particle) -> Option<&'a Particle> {
        self.informers_of(particle)
            .into_iter()
            .min_by(|a, b| a.best_solution.error.total_cmp(&b.best_solution.error))
    }

    /// Move one particle toward its best informer.
    ///
    /// Returns `None` when the ids do not resolve to a particle of that tribe.
    pub fn move_particle<O, M, R>(
        &mut self,
        tribe_id: TribeId,
        particle_id: ParticleId,
        objective: &O,
        rule: &M,
        rng: &mut R,
    ) -> Option<MoveOutcome>
    where
        O: Objective + ?Sized,
        M: MovementRule,
        R: Rng + ?Sized,
    {
        let (position, informer_best) = {
            let particle = self.tribe(tribe_id)?.member(particle_id)?;
            let best = self.best_informer(particle)?;
            if best.id == particle.id {
                trace!("Particle {} is its own best informer", particle.id);
                return Some(MoveOutcome::Stayed);
            }
            (
                particle.position.clone(),
                best.best_solution.position.clone(),
            )
        };

        let new_position = rule.next_position(&position, &informer_best, rng);
        let new_error = objective.evaluate(&new_position);

        let particle = self.tribe_mut(tribe_id)?.member_mut(particle_id)?;
        let improved = particle.record_move(new_position, new_error);
        trace!(
            "Particle {} moved to error {} (improved: {})",
            particle_id,
            new_error,
            improved
        );

        Some(MoveOutcome::Moved { improved })
    }

    /// Move every particle once, visiting tribes in a fresh random order
    pub fn move_swarm<O, M, R>(&mut self, objective: &O, rule: &M, rng: &mut R) -> MovementStats
    where
        O: Objective + ?Sized,
        M: MovementRule,
        R: Rng + ?Sized,
    {
        let mut stats = MovementStats::default();

        for tribe_id in self.tribes_in_random_order(rng) {
            let member_ids: Vec<ParticleId> = match self.tribe(tribe_id) {
                Some(tribe) => tribe.members.iter().map(|p| p.id).collect(),
                None => continue,
            };

            for particle_id in member_ids {
                match self.move_particle(tribe_id, particle_id, objective, rule, rng) {
                    Some(MoveOutcome::Moved { improved }) => {
                        stats.moved += 1;
                        if improved {
                            stats.improved += 1;
                        }
                    }
                    Some(MoveOutcome::Stayed) => stats.stayed += 1,
                    None => {}
                }
            }
        }

        debug!(
            "Movement pass: {} moved, {} improved, {} stayed",
            stats.moved, stats.improved, stats.stayed
        );
        stats
    }
}
