//! GPU physics stage: compute pipeline, parity bind groups, step encoding

use crate::params::SimParams;
use crate::store::ParticleStore;
use galaxy_physics::Particle;
use wgpu::util::DeviceExt;

/// Compute workgroup size; must match `WORKGROUP_SIZE` in `shaders/step.wgsl`
pub const WORKGROUP_SIZE: u32 = 64;

const STEP_SHADER: &str = include_str!("shaders/step.wgsl");

/// Number of workgroups needed to cover `particle_count` invocations
pub fn workgroup_count(particle_count: u32) -> u32 {
    (particle_count + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE
}

/// The physics stage: owns the uniform buffer, the step pipeline, the
/// particle store, and one bind group per buffer parity (A→B and B→A).
pub struct GalaxySimulation {
    device: wgpu::Device,
    queue: wgpu::Queue,

    params_buffer: wgpu::Buffer,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    step_bind_groups: [wgpu::BindGroup; 2],

    store: ParticleStore,
}

impl GalaxySimulation {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, particles: &[Particle]) -> Self {
        log::info!("Initializing simulation with {} particles", particles.len());

        let store = ParticleStore::new(&device, particles);

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sim Params Buffer"),
            contents: bytemuck::cast_slice(&[SimParams::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Physics Step Shader"),
            source: wgpu::ShaderSource::Wgsl(STEP_SHADER.into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Physics Step Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Physics Step Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Physics Step Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let step_bind_groups =
            Self::create_step_bind_groups(&device, &bind_group_layout, &params_buffer, &store);

        log::info!("Physics pipeline created");

        Self {
            device,
            queue,
            params_buffer,
            pipeline,
            bind_group_layout,
            step_bind_groups,
            store,
        }
    }

    /// One bind group per parity: index 0 reads buffer A and writes buffer B,
    /// index 1 the reverse.
    fn create_step_bind_groups(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        params_buffer: &wgpu::Buffer,
        store: &ParticleStore,
    ) -> [wgpu::BindGroup; 2] {
        let make = |label, read: usize, write: usize| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: store.buffer(read).as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: store.buffer(write).as_entire_binding(),
                    },
                ],
            })
        };

        [
            make("Physics Step Bind Group A->B", 0, 1),
            make("Physics Step Bind Group B->A", 1, 0),
        ]
    }

    /// Rewrite the uniform buffer from host-side state. Called once per frame.
    pub fn update_params(&self, params: &SimParams) {
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[*params]));
    }

    /// Encode this frame's physics dispatch: reads the current buffer,
    /// writes the next one. The caller submits and then calls [`swap`].
    ///
    /// [`swap`]: Self::swap
    pub fn encode_step(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Physics Step Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&self.pipeline);
        compute_pass.set_bind_group(0, &self.step_bind_groups[self.store.current_index()], &[]);
        compute_pass.dispatch_workgroups(workgroup_count(self.store.particle_count()), 1, 1);
    }

    /// Flip buffer parity after the frame's work is submitted
    pub fn swap(&mut self) {
        self.store.swap();
    }

    /// Replace the particle population wholesale. The old buffers and bind
    /// groups are dropped together; anything else holding bind groups onto
    /// the store (the raster stage) must rebuild afterwards.
    pub fn reset(&mut self, particles: &[Particle]) {
        log::info!("Resetting particle store to {} particles", particles.len());

        let store = ParticleStore::new(&self.device, particles);
        self.step_bind_groups = Self::create_step_bind_groups(
            &self.device,
            &self.bind_group_layout,
            &self.params_buffer,
            &store,
        );
        self.store = store;
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn particle_count(&self) -> u32 {
        self.store.particle_count()
    }

    /// The shared uniform buffer; the raster stage binds the same record
    pub fn params_buffer(&self) -> &wgpu::Buffer {
        &self.params_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_workgroup_size_matches_dispatch_math() {
        let needle = format!("const WORKGROUP_SIZE: u32 = {}u;", WORKGROUP_SIZE);
        assert!(
            STEP_SHADER.contains(&needle),
            "step.wgsl workgroup size drifted from the Rust constant"
        );
    }

    #[test]
    fn workgroup_count_covers_all_particles() {
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(WORKGROUP_SIZE), 1);
        assert_eq!(workgroup_count(WORKGROUP_SIZE + 1), 2);
        assert_eq!(workgroup_count(1_000_000), 15_625);
    }
}
