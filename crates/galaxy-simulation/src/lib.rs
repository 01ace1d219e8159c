//! # Galaxy Simulation Engine
//!
//! GPU compute stage: per-frame uniform parameters, the ping-pong particle
//! store, and the physics pipeline that advances every particle one step
//! per dispatch.

pub mod params;
pub mod simulation;
pub mod store;

pub use params::*;
pub use simulation::*;
pub use store::*;
