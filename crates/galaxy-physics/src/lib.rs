//! # Galaxy Physics
//!
//! Data model and analytic force field for the spiral-galaxy simulation:
//! the GPU-shared particle record, the initial-state distribution, and a
//! CPU reference implementation of the per-particle integration kernel.

pub mod constants;
pub mod field;
pub mod galaxy;
pub mod particle;

pub use constants::*;
pub use field::*;
pub use galaxy::*;
pub use particle::*;
