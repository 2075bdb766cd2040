//! External collaborators of the swarm: objective functions and position samplers.

pub mod objective;
pub mod sampler;

pub use objective::*;
pub use sampler::*;
