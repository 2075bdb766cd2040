use thiserror::Error;

use crate::swarm::TribeId;

/// Custom error types for the TRIBES optimizer
#[derive(Error, Debug)]
pub enum TribesError {
    /// A tribe was built from an unusable member list
    #[error("Invalid tribe membership: {0}")]
    InvalidMembership(String),

    /// A link referenced a tribe that is not part of the swarm
    #[error("Invalid informer: tribe {0} is not part of the swarm")]
    InvalidInformer(TribeId),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Objective name did not match any built-in benchmark
    #[error("Unknown objective function: {0}")]
    UnknownObjective(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type TribesResult<T> = std::result::Result<T, TribesError>;
