//! Per-frame simulation parameters, rewritten into the uniform buffer every
//! step from host-side state.

use bytemuck::{Pod, Zeroable};
use galaxy_physics::{DEFAULT_DAMPING, DEFAULT_FIELD_STRENGTH, NOMINAL_DT};

/// Uniform stride both host and device agree on, byte for byte
pub const SIM_PARAMS_STRIDE: usize = 48;

/// Uniform record shared with both WGSL shaders.
///
/// WGSL places a `vec2<f32>` on an 8-byte boundary, so the three leading
/// scalars are followed by explicit padding and the whole record is padded
/// out to a fixed 48-byte stride. Field offsets: 0 delta_time, 4
/// field_strength, 8 damping, 16 pointer_pos, 24 pointer_active, 28 time,
/// 32 viewport.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SimParams {
    /// Integration step for this frame (nominal step × time dilation)
    pub delta_time: f32,
    /// Force-field multiplier (the "gravity" slider)
    pub field_strength: f32,
    /// Velocity retained per step, < 1
    pub damping: f32,
    pub _pad0: f32,
    /// Pointer position in normalized device coordinates
    pub pointer_pos: [f32; 2],
    /// Non-zero while the pointer attractor is held active
    pub pointer_active: u32,
    /// Accumulated simulation time
    pub time: f32,
    /// Surface size in pixels, for aspect correction in the vertex shader
    pub viewport: [f32; 2],
    pub _pad1: [f32; 2],
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            delta_time: NOMINAL_DT,
            field_strength: DEFAULT_FIELD_STRENGTH,
            damping: DEFAULT_DAMPING,
            _pad0: 0.0,
            pointer_pos: [0.0, 0.0],
            pointer_active: 0,
            time: 0.0,
            viewport: [1.0, 1.0],
            _pad1: [0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn record_matches_uniform_stride() {
        assert_eq!(std::mem::size_of::<SimParams>(), SIM_PARAMS_STRIDE);
    }

    #[test]
    fn field_offsets_match_wgsl_layout() {
        assert_eq!(offset_of!(SimParams, delta_time), 0);
        assert_eq!(offset_of!(SimParams, field_strength), 4);
        assert_eq!(offset_of!(SimParams, damping), 8);
        assert_eq!(offset_of!(SimParams, pointer_pos), 16);
        assert_eq!(offset_of!(SimParams, pointer_active), 24);
        assert_eq!(offset_of!(SimParams, time), 28);
        assert_eq!(offset_of!(SimParams, viewport), 32);
    }
}
