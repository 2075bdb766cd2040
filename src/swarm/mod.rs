//! Swarm module: particles, tribes, the informer graph and the adaptive loop
//! that restructures them.

pub mod adaptation;
pub mod convergence;
pub mod graph;
pub mod movement;
pub mod particle;
pub mod population;
pub mod tribe;

pub use adaptation::*;
pub use movement::*;
pub use particle::*;
pub use population::*;
pub use tribe::*;
