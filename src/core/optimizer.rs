use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;

use crate::core::config::{Config, RunConfig};
use crate::core::error::TribesResult;
use crate::search::{Benchmark, Objective, PositionSampler, UniformSampler};
use crate::swarm::{
    AdaptationSummary, GravityPivot, MovementRule, MovementStats, ParticleFactory, ParticleSpec,
    Solution, Swarm,
};

/// What a single generation did
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub generation: usize,

    /// The swarm was empty and received its first tribe
    pub seeded: bool,

    pub movement: Option<MovementStats>,

    pub adaptation: Option<AdaptationSummary>,
}

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generations_run: usize,
    pub adaptations: usize,
    pub tribes: usize,
    pub particles: usize,
    pub best: Option<Solution>,
    pub reached_target: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives the swarm generation by generation
pub struct Optimizer<O, S, M> {
    swarm: Swarm,

    /// Builds seed particles and rescue particles
    factory: ParticleFactory<O, S>,

    rule: M,

    settings: RunConfig,

    generation: usize,

    moves_since_adaptation: usize,

    adaptations: usize,

    /// Best solution seen so far, kept even if its particle is later pruned
    best: Option<Solution>,
}

/// Optimizer over a built-in benchmark with uniform sampling and the default rule
pub type BenchmarkOptimizer = Optimizer<Benchmark, UniformSampler, GravityPivot>;

impl BenchmarkOptimizer {
    /// Build an optimizer from a validated configuration
    pub fn from_config(config: &Config) -> TribesResult<Self> {
        config.validate()?;
        let objective: Benchmark = config.search.objective.parse()?;

        let factory = ParticleFactory::new(
            ParticleSpec {
                constraints: config.search.constraints.clone(),
                history_length: config.particle.history_length,
            },
            UniformSampler,
            objective,
        );

        Ok(Self::new(
            factory,
            GravityPivot::from(&config.movement),
            config.run.clone(),
        ))
    }
}

impl<O, S, M> Optimizer<O, S, M>
where
    O: Objective,
    S: PositionSampler,
    M: MovementRule,
{
    pub fn new(factory: ParticleFactory<O, S>, rule: M, settings: RunConfig) -> Self {
        Self {
            swarm: Swarm::new(),
            factory,
            rule,
            settings,
            generation: 0,
            moves_since_adaptation: 0,
            adaptations: 0,
            best: None,
        }
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn moves_since_adaptation(&self) -> usize {
        self.moves_since_adaptation
    }

    pub fn adaptations(&self) -> usize {
        self.adaptations
    }

    pub fn best_solution(&self) -> Option<&Solution> {
        self.best.as_ref()
    }

    /// Run one generation.
    ///
    /// An empty swarm is seeded with a single one-particle tribe; otherwise
    /// every particle moves once and every shaman is re-elected. Afterwards,
    /// if the readiness test passes, tribes are classified and the swarm adapts.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TribesResult<GenerationReport> {
        let mut report = GenerationReport {
            generation: self.generation,
            ..Default::default()
        };

        if self.swarm.swarm_size() == 0 {
            let particle = self.swarm.spawn_particle(&self.factory, rng);
            let id = self.swarm.create_tribe(vec![particle])?;
            debug!("Seeded empty swarm with tribe {}", id);
            report.seeded = true;
        } else {
            let stats = self
                .swarm
                .move_swarm(&self.factory.objective, &self.rule, rng);
            self.moves_since_adaptation += 1;
            self.swarm.update_shamans();
            report.movement = Some(stats);
        }

        if self.swarm.requires_adaptation(self.moves_since_adaptation) {
            self.swarm.update_is_good();
            let summary = self.swarm.adapt(&self.factory, rng)?;
            self.moves_since_adaptation = 0;
            self.adaptations += 1;
            report.adaptation = Some(summary);
        }

        self.track_best();
        self.generation += 1;
        Ok(report)
    }

    /// Run the configured number of generations, stopping early once the
    /// target error is reached
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TribesResult<RunReport> {
        let started_at = Utc::now();
        let generations = self.settings.generations;
        if generations == 0 {
            warn!("Run configured with zero generations; nothing to do");
        }

        info!(
            "Starting TRIBES run: {} generations, {} dimensions",
            generations,
            self.factory.spec.constraints.len()
        );

        let mut generations_run = 0;
        let mut reached_target = false;

        for _ in 0..generations {
            self.step(rng)?;
            generations_run += 1;

            let interval = self.settings.log_interval;
            if interval > 0 && self.generation % interval == 0 {
                info!(
                    "Generation {}: best error {:e}, {} tribes, {} particles",
                    self.generation,
                    self.best.as_ref().map_or(f64::INFINITY, |s| s.error),
                    self.swarm.len(),
                    self.swarm.swarm_size()
                );
            }

            if self.target_reached() {
                info!("Target error reached after {} generations", self.generation);
                reached_target = true;
                break;
            }
        }

        let report = RunReport {
            generations_run,
            adaptations: self.adaptations,
            tribes: self.swarm.len(),
            particles: self.swarm.swarm_size(),
            best: self.best.clone(),
            reached_target,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "Run finished: best error {:e} after {} generations and {} adaptations",
            report.best.as_ref().map_or(f64::INFINITY, |s| s.error),
            report.generations_run,
            report.adaptations
        );

        Ok(report)
    }

    fn target_reached(&self) -> bool {
        match (self.settings.target_error, &self.best) {
            (Some(target), Some(best)) => best.error <= target,
            _ => false,
        }
    }

    fn track_best(&mut self) {
        if let Some(candidate) = self.swarm.best_solution() {
            let better = self
                .best
                .as_ref()
                .map_or(true, |best| candidate.error < best.error);
            if better {
                self.best = Some(candidate.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{Constraint, FixedSampler};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_optimizer(generations: usize) -> Optimizer<Benchmark, FixedSampler, GravityPivot> {
        let factory = ParticleFactory::new(
            ParticleSpec {
                constraints: vec![Constraint::new(1.0, 5.0, 1.0), Constraint::new(10.0, 25.0, 5.0)],
                history_length: 2,
            },
            FixedSampler::new(125.0),
            Benchmark::Plane,
        );
        Optimizer::new(
            factory,
            GravityPivot::default(),
            RunConfig {
                generations,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_first_step_seeds_empty_swarm() {
        let mut optimizer = fixed_optimizer(1);
        let mut rng = StdRng::seed_from_u64(1);

        let report = optimizer.step(&mut rng).unwrap();

        assert!(report.seeded);
        assert!(report.movement.is_none());
        assert!(report.adaptation.is_none());
        assert_eq!(optimizer.swarm().len(), 1);
        assert_eq!(optimizer.swarm().swarm_size(), 1);
        assert_eq!(optimizer.best_solution().unwrap().error, 125.0);
    }

    #[test]
    fn test_second_step_moves_then_adapts() {
        let mut optimizer = fixed_optimizer(2);
        let mut rng = StdRng::seed_from_u64(1);

        optimizer.step(&mut rng).unwrap();
        let report = optimizer.step(&mut rng).unwrap();

        let movement = report.movement.unwrap();
        assert_eq!(movement.stayed, 1);
        let adaptation = report.adaptation.unwrap();
        assert!(adaptation.tribe_created.is_some());
        assert_eq!(optimizer.swarm().len(), 2);
        assert_eq!(optimizer.moves_since_adaptation(), 0);
        assert_eq!(optimizer.adaptations(), 1);
    }

    #[test]
    fn test_from_config_rejects_unknown_objective() {
        let mut config = Config::default();
        config.search.objective = "griewank".into();
        assert!(BenchmarkOptimizer::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_rejects_unsampleable_bounds() {
        let mut config = Config::default();
        config.search.constraints[0] = Constraint::new(-1e308, 1e308, 0.0);
        assert!(BenchmarkOptimizer::from_config(&config).is_err());

        config.search.constraints[0] = Constraint::new(f64::NEG_INFINITY, f64::INFINITY, 0.0);
        assert!(BenchmarkOptimizer::from_config(&config).is_err());
    }

    #[test]
    fn test_run_reports_generations() {
        let mut optimizer = fixed_optimizer(25);
        let mut rng = StdRng::seed_from_u64(9);

        let report = optimizer.run(&mut rng).unwrap();

        assert_eq!(report.generations_run, 25);
        assert_eq!(optimizer.generation(), 25);
        assert!(report.finished_at >= report.started_at);
        assert!(optimizer.swarm().is_graph_consistent());
    }
}
