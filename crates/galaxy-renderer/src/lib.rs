//! # Galaxy Renderer
//!
//! Raster stage: draws every particle as an additively blended billboard
//! quad, instanced straight out of the simulation's storage buffers.

pub mod renderer;

pub use renderer::*;
