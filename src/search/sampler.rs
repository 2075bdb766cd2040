//! Initial position generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

const GRID_TOLERANCE: f64 = 1e-9;

/// Legal range of one search dimension.
///
/// A `step` of zero means the dimension is continuous; otherwise positions
/// are restricted to `min + k * step` for integer `k`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Constraint {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub step: f64,
}

impl Constraint {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Number of grid points above `min`, or `None` for a continuous dimension.
    ///
    /// The quotient is nudged before flooring so a `max` that lies on the grid
    /// is not lost to rounding, e.g. `(0.3 - 0.1) / 0.1 = 1.999...`.
    fn step_count(&self) -> Option<u64> {
        if self.step > 0.0 {
            let quotient = (self.max - self.min) / self.step;
            Some((quotient + GRID_TOLERANCE).floor().max(0.0) as u64)
        } else {
            None
        }
    }
}

/// Produces a starting position for every newly created particle
pub trait PositionSampler {
    fn sample<R: Rng + ?Sized>(&self, constraints: &[Constraint], rng: &mut R) -> Vec<f64>;
}

/// Uniform draw inside each constraint, snapped to its step grid
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampler;

impl PositionSampler for UniformSampler {
    fn sample<R: Rng + ?Sized>(&self, constraints: &[Constraint], rng: &mut R) -> Vec<f64> {
        constraints
            .iter()
            .map(|c| match c.step_count() {
                Some(steps) => (c.min + rng.random_range(0..=steps) as f64 * c.step).min(c.max),
                None if c.max > c.min => rng.random_range(c.min..=c.max),
                None => c.min,
            })
            .collect()
    }
}

/// Ignores the bounds and returns the same coordinate in every dimension.
///
/// Only useful where a test needs fully deterministic particles.
#[derive(Debug, Clone, Copy)]
pub struct FixedSampler {
    pub value: f64,
}

impl FixedSampler {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl PositionSampler for FixedSampler {
    fn sample<R: Rng + ?Sized>(&self, constraints: &[Constraint], _rng: &mut R) -> Vec<f64> {
        vec![self.value; constraints.len()]
    }
}
