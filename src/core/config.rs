use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::core::error::{TribesError, TribesResult};
use crate::search::Constraint;

/// Top-level configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Search space and objective
    pub search: SearchConfig,

    /// Particle construction
    #[serde(default)]
    pub particle: ParticleConfig,

    /// Movement rule parameters
    #[serde(default)]
    pub movement: MovementConfig,

    /// Driver loop settings
    #[serde(default)]
    pub run: RunConfig,
}

/// Search space configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Name of the built-in objective function (e.g. "sphere", "rastrigin")
    #[serde(default = "default_objective")]
    pub objective: String,

    /// One constraint per search dimension
    pub constraints: Vec<Constraint>,
}

/// Configuration used whenever a new particle is created
#[derive(Debug, Deserialize, Clone)]
pub struct ParticleConfig {
    /// Number of recent moves remembered by each particle
    #[serde(default = "default_history_length")]
    pub history_length: usize,
}

/// Parameters of the default gravity-pivot movement rule
#[derive(Debug, Deserialize, Clone)]
pub struct MovementConfig {
    /// Mass of the best informer relative to the moving particle
    #[serde(default = "default_attraction")]
    pub attraction: f64,

    /// Scale of the exploration radius around the centre of gravity
    #[serde(default = "default_spread")]
    pub spread: f64,
}

/// Driver loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    /// Number of generations to simulate
    #[serde(default = "default_generations")]
    pub generations: usize,

    /// Seed for the random source; drawn from the OS when absent
    pub seed: Option<u64>,

    /// Log progress every N generations (0 disables)
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,

    /// Stop as soon as the best error drops to this value
    pub target_error: Option<f64>,
}

// Default values for optional configuration
fn default_objective() -> String {
    "sphere".to_string()
}

fn default_history_length() -> usize {
    2
}

fn default_attraction() -> f64 {
    2.0
}

fn default_spread() -> f64 {
    1.0
}

fn default_generations() -> usize {
    2500
}

fn default_log_interval() -> usize {
    100
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            history_length: default_history_length(),
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            attraction: default_attraction(),
            spread: default_spread(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            generations: default_generations(),
            seed: None,
            log_interval: default_log_interval(),
            target_error: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                objective: default_objective(),
                constraints: vec![Constraint::new(-10.0, 10.0, 0.0); 2],
            },
            particle: ParticleConfig::default(),
            movement: MovementConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config = toml::from_str(&config_text)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Check the values serde cannot check on its own
    pub fn validate(&self) -> TribesResult<()> {
        if self.search.constraints.is_empty() {
            return Err(TribesError::ConfigError(
                "at least one search constraint is required".into(),
            ));
        }

        for (dim, c) in self.search.constraints.iter().enumerate() {
            if !c.min.is_finite() || !c.max.is_finite() || !(c.max - c.min).is_finite() {
                return Err(TribesError::ConfigError(format!(
                    "constraint {} bounds [{}, {}] must be finite with a finite width",
                    dim, c.min, c.max
                )));
            }
            if !(c.min <= c.max) {
                return Err(TribesError::ConfigError(format!(
                    "constraint {} has min {} greater than max {}",
                    dim, c.min, c.max
                )));
            }
            if !(c.step >= 0.0) {
                return Err(TribesError::ConfigError(format!(
                    "constraint {} has negative step {}",
                    dim, c.step
                )));
            }
        }

        if self.particle.history_length == 0 {
            return Err(TribesError::ConfigError(
                "history_length must be at least 1".into(),
            ));
        }

        if !(self.movement.attraction > 0.0) || !(self.movement.spread > 0.0) {
            return Err(TribesError::ConfigError(
                "movement attraction and spread must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Number of search dimensions
    pub fn dimensions(&self) -> usize {
        self.search.constraints.len()
    }
}
