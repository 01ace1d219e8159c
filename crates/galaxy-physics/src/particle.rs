//! GPU-shared particle record

use bytemuck::{Pod, Zeroable};

/// One simulated body.
///
/// Laid out exactly as the WGSL `Particle` struct: two `vec2<f32>` followed
/// by two `f32`, 24 bytes with no padding. Both the compute and render
/// shaders index storage buffers with this stride, so the layout is part of
/// the host/device contract.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Position in simulation space, roughly [-5, 5] per axis
    pub position: [f32; 2],
    /// Velocity, advanced by the integrator each step
    pub velocity: [f32; 2],
    /// Mass; scales the rendered billboard, not the force law
    pub mass: f32,
    /// Reserved per-particle tint seed in [0, 1); carried through unchanged
    pub color_seed: f32,
}

/// Byte stride of one particle in the storage buffers
pub const PARTICLE_STRIDE: usize = std::mem::size_of::<Particle>();

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn record_is_24_bytes() {
        assert_eq!(PARTICLE_STRIDE, 24);
        assert_eq!(std::mem::align_of::<Particle>(), 4);
    }

    #[test]
    fn field_offsets_match_wgsl_layout() {
        assert_eq!(offset_of!(Particle, position), 0);
        assert_eq!(offset_of!(Particle, velocity), 8);
        assert_eq!(offset_of!(Particle, mass), 16);
        assert_eq!(offset_of!(Particle, color_seed), 20);
    }
}
