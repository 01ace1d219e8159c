use egui::Context;
use egui_wgpu::{Renderer, RendererOptions};
use egui_winit::State;
use galaxy_physics::{DEFAULT_DAMPING, DEFAULT_FIELD_STRENGTH};
use wgpu::{Device, TextureFormat};
use winit::{event::WindowEvent, window::Window};

use crate::{INITIAL_STAR_COUNT, MAX_STAR_COUNT, MIN_STAR_COUNT};

pub struct UiState {
    pub fps: f32,
    pub frame_time: f32,
    /// Host-measured wall clock of the frame's encode + submit, in ms
    pub compute_time: f32,
    pub particle_count: u32,

    pub field_strength: f32,
    pub damping: f32,
    pub time_dilation: f32,

    /// Star-count slider value; applied (as a full store rebuild) only when
    /// the drag ends, not continuously while scrubbing
    pub requested_star_count: u32,
    pub recount_requested: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time: 0.0,
            compute_time: 0.0,
            particle_count: INITIAL_STAR_COUNT,
            field_strength: DEFAULT_FIELD_STRENGTH,
            damping: DEFAULT_DAMPING,
            time_dilation: 1.0,
            requested_star_count: INITIAL_STAR_COUNT,
            recount_requested: false,
        }
    }
}

pub struct Gui {
    context: Context,
    state: State,
    renderer: Renderer,
}

impl Gui {
    pub fn new(device: &Device, output_color_format: TextureFormat, window: &Window) -> Self {
        let context = Context::default();
        let id = context.viewport_id();

        let state = State::new(
            context.clone(),
            id,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );

        let renderer = Renderer::new(
            device,
            output_color_format,
            RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: false,
                ..Default::default()
            },
        );

        Self {
            context,
            state,
            renderer,
        }
    }

    /// Returns true when egui consumed the event; consumed events must not
    /// reach the simulation's pointer handling.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    pub fn render(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        ui_state: &mut UiState,
    ) {
        let raw_input = self.state.take_egui_input(window);

        let full_output = self.context.run(raw_input, |ctx| {
            self.ui(ctx, ui_state);
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Egui Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        // SAFETY: Workaround for lifetime issues with egui-wgpu render pass
        let render_pass: &mut wgpu::RenderPass<'static> =
            unsafe { std::mem::transmute(&mut render_pass) };

        self.renderer
            .render(render_pass, &clipped_primitives, &screen_descriptor);

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    fn ui(&self, ctx: &Context, state: &mut UiState) {
        // Diagnostics Panel (Top Left)
        egui::Window::new("Diagnostics")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.1}", state.fps));
                ui.label(format!("Frame Time: {:.2} ms", state.frame_time));
                ui.label(format!("Compute: {:.2} ms", state.compute_time));
                ui.label(format!("Stars: {}", state.particle_count));
            });

        // Galaxy Controls (Bottom Left)
        egui::Window::new("Galaxy Controls")
            .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.heading("Field");
                ui.add(egui::Slider::new(&mut state.field_strength, 0.0..=3.0).text("Gravity"));
                ui.label(format!("Damping: {:.2}", state.damping));

                ui.separator();
                ui.heading("Time");
                ui.add(
                    egui::Slider::new(&mut state.time_dilation, 0.0..=3.0).text("Time Dilation"),
                );

                ui.separator();
                ui.heading("Population");
                let response = ui.add(
                    egui::Slider::new(
                        &mut state.requested_star_count,
                        MIN_STAR_COUNT..=MAX_STAR_COUNT,
                    )
                    .logarithmic(true)
                    .text("Star Count"),
                );
                // Rebuilding a million-star store is expensive; wait for the
                // drag to finish instead of rebuilding per scrub tick.
                if response.drag_stopped() && state.requested_star_count != state.particle_count {
                    state.recount_requested = true;
                }
            });
    }
}
