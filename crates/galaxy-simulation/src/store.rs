//! Double-buffered particle storage
//!
//! The physics stage reads one buffer and writes the other, so a dispatch
//! never reads and writes the same memory; which buffer is authoritative
//! flips once per frame.

use galaxy_physics::{Particle, PARTICLE_STRIDE};
use wgpu::util::DeviceExt;

/// Byte size of one particle buffer for a given population
pub fn buffer_size(particle_count: u32) -> u64 {
    particle_count as u64 * PARTICLE_STRIDE as u64
}

/// Which of the two buffers holds the authoritative state.
///
/// Starts at buffer 0; after `n` swaps the authoritative index is `n mod 2`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepParity(usize);

impl StepParity {
    /// Index of the authoritative ("current") buffer
    pub fn current_index(self) -> usize {
        self.0
    }

    /// Index of the overwritable ("next") buffer
    pub fn next_index(self) -> usize {
        self.0 ^ 1
    }

    pub fn swap(&mut self) {
        self.0 ^= 1;
    }
}

/// The two equally sized storage buffers plus the parity flag.
///
/// There is no incremental resize: a population change replaces the whole
/// store, and every bind group referencing the old buffers must be rebuilt.
pub struct ParticleStore {
    buffers: [wgpu::Buffer; 2],
    parity: StepParity,
    particle_count: u32,
}

impl ParticleStore {
    /// Allocate both buffers; buffer 0 is uploaded from `particles`, buffer 1
    /// starts empty and is first written by the physics stage.
    pub fn new(device: &wgpu::Device, particles: &[Particle]) -> Self {
        let particle_count = particles.len() as u32;

        let primary = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Buffer A"),
            contents: bytemuck::cast_slice(particles),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });

        let secondary = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Buffer B"),
            size: buffer_size(particle_count),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffers: [primary, secondary],
            parity: StepParity::default(),
            particle_count,
        }
    }

    pub fn buffer(&self, index: usize) -> &wgpu::Buffer {
        &self.buffers[index]
    }

    /// The authoritative buffer the next physics step reads
    pub fn current(&self) -> &wgpu::Buffer {
        &self.buffers[self.parity.current_index()]
    }

    /// The buffer the next physics step writes
    pub fn next(&self) -> &wgpu::Buffer {
        &self.buffers[self.parity.next_index()]
    }

    pub fn current_index(&self) -> usize {
        self.parity.current_index()
    }

    pub fn next_index(&self) -> usize {
        self.parity.next_index()
    }

    /// Flip which buffer is authoritative. O(1), no data movement.
    pub fn swap(&mut self) {
        self.parity.swap();
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn size_bytes(&self) -> u64 {
        buffer_size(self.particle_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_size_is_count_times_stride() {
        assert_eq!(PARTICLE_STRIDE, 24);
        assert_eq!(buffer_size(0), 0);
        assert_eq!(buffer_size(1), 24);
        assert_eq!(buffer_size(50_000), 1_200_000);
        assert_eq!(buffer_size(1_000_000), 24_000_000);
    }

    #[test]
    fn parity_alternates_from_buffer_zero() {
        let mut parity = StepParity::default();
        for n in 0..16 {
            assert_eq!(parity.current_index(), n % 2);
            assert_eq!(parity.next_index(), (n + 1) % 2);
            parity.swap();
        }
    }
}
