pub mod core;
pub mod search;
pub mod swarm;
