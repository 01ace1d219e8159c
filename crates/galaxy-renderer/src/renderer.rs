//! Billboard render pipeline and per-buffer bind groups

use galaxy_simulation::ParticleStore;

const BILLBOARD_SHADER: &str = include_str!("shaders/billboard.wgsl");

/// The raster stage: one render pipeline plus one bind group per store
/// buffer, so the scheduler can draw whichever buffer the same frame's
/// physics step just wrote.
pub struct GalaxyRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_groups: [wgpu::BindGroup; 2],
}

impl GalaxyRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        params_buffer: &wgpu::Buffer,
        store: &ParticleStore,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Billboard Shader"),
            source: wgpu::ShaderSource::Wgsl(BILLBOARD_SHADER.into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Billboard Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Billboard Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Additive blending: overlapping particles brighten instead of
        // occluding, which is what sells the "many faint stars" look. No
        // depth buffer for the same reason.
        let additive = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Billboard Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState {
                        color: additive,
                        alpha: additive,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let bind_groups =
            Self::create_bind_groups(device, &bind_group_layout, params_buffer, store);

        Self {
            pipeline,
            bind_group_layout,
            bind_groups,
        }
    }

    fn create_bind_groups(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        params_buffer: &wgpu::Buffer,
        store: &ParticleStore,
    ) -> [wgpu::BindGroup; 2] {
        let make = |label, index: usize| {
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
                        resource: store.buffer(index).as_entire_binding(),
                    },
                ],
            })
        };

        [
            make("Billboard Bind Group A", 0),
            make("Billboard Bind Group B", 1),
        ]
    }

    /// Recreate the bind groups against a replaced particle store. Required
    /// after every `GalaxySimulation::reset`; the old groups keep dead
    /// buffers alive until dropped here.
    pub fn rebuild(
        &mut self,
        device: &wgpu::Device,
        params_buffer: &wgpu::Buffer,
        store: &ParticleStore,
    ) {
        self.bind_groups =
            Self::create_bind_groups(device, &self.bind_group_layout, params_buffer, store);
    }

    /// Encode the frame's draw: clear to black, then one 6-vertex instance
    /// per particle out of `source_index` (the buffer this frame's physics
    /// step wrote).
    pub fn encode_draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        source_index: usize,
        particle_count: u32,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Billboard Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_groups[source_index], &[]);
        render_pass.draw(0..6, 0..particle_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_constants_match_physics_crate() {
        for (name, value) in [
            ("BASE_PARTICLE_SIZE", galaxy_physics::BASE_PARTICLE_SIZE),
            ("CORE_BAND_RADIUS", galaxy_physics::CORE_BAND_RADIUS),
            ("MID_BAND_RADIUS", galaxy_physics::MID_BAND_RADIUS),
        ] {
            let needle = format!("const {}: f32 = {};", name, value);
            assert!(
                BILLBOARD_SHADER.contains(&needle),
                "billboard.wgsl {} drifted from galaxy-physics",
                name
            );
        }
    }
}
