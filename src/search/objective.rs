//! Objective functions the swarm minimizes.
//!
//! The swarm only ever sees the [`Objective`] trait. Any closure of the
//! shape `Fn(&[f64]) -> f64` is an objective, and [`Benchmark`] bundles the
//! classic test functions so the binary can pick one by name.

use serde::{Deserialize, Serialize};
use std::f64::consts::{E, PI};
use std::fmt;
use std::str::FromStr;

use crate::core::error::TribesError;

/// Maps a position to the scalar error the swarm tries to minimize.
///
/// Implementations must be deterministic: the same position always yields
/// the same error.
#[cfg_attr(test, mockall::automock)]
pub trait Objective {
    fn evaluate(&self, position: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64,
{
    fn evaluate(&self, position: &[f64]) -> f64 {
        self(position)
    }
}

/// Built-in benchmark functions, all with a global minimum of 0 except `Plane`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Benchmark {
    /// The first coordinate itself; unbounded below, handy for smoke tests
    Plane,
    Sphere,
    Rastrigin,
    Rosenbrock,
    Ackley,
}

impl Benchmark {
    pub const ALL: [Benchmark; 5] = [
        Benchmark::Plane,
        Benchmark::Sphere,
        Benchmark::Rastrigin,
        Benchmark::Rosenbrock,
        Benchmark::Ackley,
    ];
}

impl Objective for Benchmark {
    fn evaluate(&self, position: &[f64]) -> f64 {
        match self {
            Benchmark::Plane => position.first().copied().unwrap_or(0.0),
            Benchmark::Sphere => position.iter().map(|x| x * x).sum(),
            Benchmark::Rastrigin => {
                10.0 * position.len() as f64
                    + position
                        .iter()
                        .map(|x| x * x - 10.0 * (2.0 * PI * x).cos())
                        .sum::<f64>()
            }
            Benchmark::Rosenbrock => position
                .windows(2)
                .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
                .sum(),
            Benchmark::Ackley => {
                if position.is_empty() {
                    return 0.0;
                }
                let n = position.len() as f64;
                let sum_sq = position.iter().map(|x| x * x).sum::<f64>() / n;
                let sum_cos = position.iter().map(|x| (2.0 * PI * x).cos()).sum::<f64>() / n;
                -20.0 * (-0.2 * sum_sq.sqrt()).exp() - sum_cos.exp() + 20.0 + E
            }
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Benchmark::Plane => write!(f, "plane"),
            Benchmark::Sphere => write!(f, "sphere"),
            Benchmark::Rastrigin => write!(f, "rastrigin"),
            Benchmark::Rosenbrock => write!(f, "rosenbrock"),
            Benchmark::Ackley => write!(f, "ackley"),
        }
    }
}

impl FromStr for Benchmark {
    type Err = TribesError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Benchmark::ALL
            .iter()
            .copied()
            .find(|b| b.to_string().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| TribesError::UnknownObjective(name.to_string()))
    }
}
