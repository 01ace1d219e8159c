//! Simulation constants
//!
//! Scaled for real-time visualization, not physical accuracy: the force
//! field is an analytic approximation of a galactic potential, not pairwise
//! gravity.

use std::f32::consts::TAU;

/// Strength of the softened inverse-square pull toward the galactic core
pub const CENTRAL_PULL: f32 = 1000.0;

/// Softening term in the central pull denominator (d² + softening).
/// Bounds the force at CENTRAL_PULL / CENTRAL_SOFTENING as d → 0.
pub const CENTRAL_SOFTENING: f32 = 100.0;

/// Strength of the tangential drive that maintains the spiral shape
pub const SPIRAL_DRIVE: f32 = 50.0;

/// Radius below which the tangential drive is disabled
pub const SPIRAL_CORE_RADIUS: f32 = 0.1;

/// Strength of the pointer attractor ("black hole")
pub const POINTER_PULL: f32 = 5000.0;

/// Softening term for the pointer attractor (d² + softening)
pub const POINTER_SOFTENING: f32 = 0.01;

/// Capture radius of the pointer attractor, in simulation units
pub const POINTER_CAPTURE_RADIUS: f32 = 0.5;

/// Maximum spawn radius of the galaxy disc
pub const GALAXY_RADIUS: f32 = 5.0;

/// Number of spiral arms
pub const ARM_COUNT: u32 = 3;

/// Angular offset between adjacent arms
pub const ARM_SEPARATION: f32 = TAU / ARM_COUNT as f32;

/// Winding factor of the spiral (radians of twist across the full radius)
pub const SPIRAL_WINDING: f32 = 10.0;

/// Vertical squash applied to spawn positions (the disc is an ellipse)
pub const DISC_FLATTEN: f32 = 0.5;

/// Orbital speed numerator: v = ORBIT_SPEED / (√r + ORBIT_SOFTENING)
pub const ORBIT_SPEED: f32 = 0.5;

/// Keeps the orbital speed finite at r = 0
pub const ORBIT_SOFTENING: f32 = 0.1;

/// Particle mass range (mass only affects billboard size, never the force law)
pub const MASS_MIN: f32 = 0.5;
pub const MASS_MAX: f32 = 1.0;

/// Default field strength multiplier (the "gravity" slider)
pub const DEFAULT_FIELD_STRENGTH: f32 = 1.0;

/// Velocity retained per step; < 1 acts as numerical friction
pub const DEFAULT_DAMPING: f32 = 0.99;

/// Nominal integration step. The scheduler scales this by the time-dilation
/// slider instead of measuring wall clock, so playback speed is deterministic
/// under frame-rate variance.
pub const NOMINAL_DT: f32 = 1.0 / 60.0;

/// Clip-space half-extent of a unit-mass billboard quad.
/// Mirrored in the billboard shader.
pub const BASE_PARTICLE_SIZE: f32 = 0.003;

/// Radial distance thresholds for the three billboard color bands.
/// Mirrored in the billboard shader.
pub const CORE_BAND_RADIUS: f32 = 0.3;
pub const MID_BAND_RADIUS: f32 = 0.6;
