//! Particles: the search agents of the swarm.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::search::{Constraint, Objective, PositionSampler};

use super::tribe::TribeId;

/// Stable identity of a particle for as long as it lives in the swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A position together with the error the objective assigned to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub position: Vec<f64>,
    pub error: f64,
}

impl Solution {
    pub fn new(position: Vec<f64>, error: f64) -> Self {
        Self { position, error }
    }
}

/// A candidate solution moving through the search space
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,

    /// Current coordinates, one per dimension
    pub position: Vec<f64>,

    /// Objective value at `position`
    pub current_error: f64,

    /// Best position this particle has ever visited
    pub best_solution: Solution,

    /// Most recent first: did each of the last moves improve `best_solution`
    pub solution_history: VecDeque<bool>,

    pub history_length: usize,

    /// Tribe currently owning this particle
    pub parent: Option<TribeId>,
}

impl Particle {
    /// Create a detached particle at an already evaluated position
    pub fn new(id: ParticleId, position: Vec<f64>, error: f64, history_length: usize) -> Self {
        Self {
            id,
            best_solution: Solution::new(position.clone(), error),
            position,
            current_error: error,
            solution_history: VecDeque::from(vec![false; history_length]),
            history_length,
            parent: None,
        }
    }

    /// Two consecutive improvements on the most recent moves
    pub fn is_excellent(&self) -> bool {
        self.history_length >= 2
            && self.solution_history.len() >= 2
            && self.solution_history[0]
            && self.solution_history[1]
    }

    /// Apply the outcome of a move and report whether the best solution improved
    pub fn record_move(&mut self, new_position: Vec<f64>, new_error: f64) -> bool {
        let improved = new_error < self.best_solution.error;
        if improved {
            self.best_solution = Solution::new(new_position.clone(), new_error);
        }

        self.solution_history.push_front(improved);
        self.solution_history.truncate(self.history_length);

        self.position = new_position;
        self.current_error = new_error;
        improved
    }
}

/// Settings every freshly generated particle is built from
#[derive(Debug, Clone)]
pub struct ParticleSpec {
    pub constraints: Vec<Constraint>,
    pub history_length: usize,
}

/// Builds evaluated particles at sampled starting positions
#[derive(Debug, Clone)]
pub struct ParticleFactory<O, S> {
    pub spec: ParticleSpec,
    pub sampler: S,
    pub objective: O,
}

impl<O: Objective, S: PositionSampler> ParticleFactory<O, S> {
    pub fn new(spec: ParticleSpec, sampler: S, objective: O) -> Self {
        Self {
            spec,
            sampler,
            objective,
        }
    }

    /// Sample, evaluate and wrap a new particle
    pub fn create<R: Rng + ?Sized>(&self, id: ParticleId, rng: &mut R) -> Particle {
        let position = self.sampler.sample(&self.spec.constraints, rng);
        let error = self.objective.evaluate(&position);
        Particle::new(id, position, error, self.spec.history_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{Benchmark, FixedSampler};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_factory_builds_evaluated_particle() {
        let factory = ParticleFactory::new(
            ParticleSpec {
                constraints: vec![Constraint::new(1.0, 5.0, 1.0), Constraint::new(10.0, 25.0, 5.0)],
                history_length: 2,
            },
            FixedSampler::new(125.0),
            Benchmark::Plane,
        );
        let mut rng = StdRng::seed_from_u64(0);

        let particle = factory.create(ParticleId(0), &mut rng);

        assert_eq!(particle.position, vec![125.0, 125.0]);
        assert_eq!(particle.current_error, 125.0);
        assert_eq!(particle.history_length, 2);
        assert_eq!(particle.best_solution, Solution::new(vec![125.0, 125.0], 125.0));
        assert_eq!(particle.solution_history, VecDeque::from(vec![false, false]));
        assert!(particle.parent.is_none());
    }

    #[test]
    fn test_record_move_keeps_history_length() {
        let mut particle = Particle::new(ParticleId(1), vec![4.0], 4.0, 3);

        assert!(particle.record_move(vec![3.0], 3.0));
        assert!(!particle.record_move(vec![5.0], 5.0));
        assert!(particle.record_move(vec![1.0], 1.0));
        assert!(particle.record_move(vec![0.5], 0.5));

        assert_eq!(particle.solution_history.len(), 3);
        assert_eq!(particle.solution_history, VecDeque::from(vec![true, true, false]));
        assert_eq!(particle.best_solution.error, 0.5);
    }

    #[test]
    fn test_worse_move_updates_position_but_not_best() {
        let mut particle = Particle::new(ParticleId(1), vec![1.0], 1.0, 2);

        assert!(!particle.record_move(vec![2.0], 2.0));

        assert_eq!(particle.position, vec![2.0]);
        assert_eq!(particle.current_error, 2.0);
        assert_eq!(particle.best_solution, Solution::new(vec![1.0], 1.0));
    }

    #[test]
    fn test_excellence_needs_two_consecutive_improvements() {
        let mut particle = Particle::new(ParticleId(1), vec![9.0], 9.0, 2);
        assert!(!particle.is_excellent());

        particle.record_move(vec![8.0], 8.0);
        assert!(!particle.is_excellent());

        particle.record_move(vec![7.0], 7.0);
        assert!(particle.is_excellent());

        particle.record_move(vec![7.5], 7.5);
        assert!(!particle.is_excellent());
    }

    #[test]
    fn test_short_history_is_never_excellent() {
        let mut particle = Particle::new(ParticleId(1), vec![9.0], 9.0, 1);
        particle.record_move(vec![8.0], 8.0);
        particle.record_move(vec![7.0], 7.0);
        assert!(!particle.is_excellent());
    }
}
