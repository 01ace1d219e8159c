//! GPU Spiral-Galaxy Particle Simulation
//!
//! A compute pass advances up to a million stars per frame under an
//! analytic galaxy field; an instanced billboard pass draws them with
//! additive blending out of the buffer the same frame just wrote.

mod gui;

use anyhow::Context as _;
use galaxy_physics::{spawn_galaxy, NOMINAL_DT};
use galaxy_renderer::GalaxyRenderer;
use galaxy_simulation::{GalaxySimulation, SimParams};
use gui::{Gui, UiState};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const INITIAL_STAR_COUNT: u32 = 50_000;
const MIN_STAR_COUNT: u32 = 1_000;
const MAX_STAR_COUNT: u32 = 1_000_000;

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    simulation: GalaxySimulation,
    renderer: GalaxyRenderer,

    gui: Gui,
    ui_state: UiState,

    // Pointer collaborator state, already converted to NDC
    pointer_ndc: [f32; 2],
    pointer_active: bool,

    // Accumulated simulation time (scaled dt, not wall clock)
    elapsed: f32,

    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create drawable surface")?;

        // No software fallback: a missing adapter or device is terminal.
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to acquire GPU device")?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut rng = rand::rng();
        let particles = spawn_galaxy(INITIAL_STAR_COUNT, &mut rng);

        let simulation = GalaxySimulation::new(device.clone(), queue.clone(), &particles);
        log::info!("✓ Simulation initialized");

        let renderer = GalaxyRenderer::new(
            &device,
            config.format,
            simulation.params_buffer(),
            simulation.store(),
        );
        log::info!("✓ Renderer initialized");

        let gui = Gui::new(&device, config.format, &window);
        let ui_state = UiState::default();

        Ok(Self {
            surface,
            device,
            queue,
            config,
            simulation,
            renderer,
            gui,
            ui_state,
            pointer_ndc: [0.0, 0.0],
            pointer_active: false,
            elapsed: 0.0,
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Regenerate the galaxy at the requested population. The store and all
    /// bind groups referencing its buffers are replaced before the next
    /// dispatch; nothing dispatches against half-updated state.
    fn apply_recount(&mut self) {
        let count = self
            .ui_state
            .requested_star_count
            .clamp(MIN_STAR_COUNT, MAX_STAR_COUNT);

        let mut rng = rand::rng();
        let particles = spawn_galaxy(count, &mut rng);

        self.simulation.reset(&particles);
        self.renderer.rebuild(
            &self.device,
            self.simulation.params_buffer(),
            self.simulation.store(),
        );

        self.ui_state.particle_count = count;
        self.ui_state.requested_star_count = count;
    }

    fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }
        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;

        // Apply a pending recount before encoding anything against the store.
        if self.ui_state.recount_requested {
            self.ui_state.recount_requested = false;
            self.apply_recount();
        }

        // Fixed nominal step scaled by the time-dilation slider, not measured
        // wall clock: playback stays deterministic under frame-rate variance.
        let dt = NOMINAL_DT * self.ui_state.time_dilation;
        self.elapsed += dt;

        let params = SimParams {
            delta_time: dt,
            field_strength: self.ui_state.field_strength,
            damping: self.ui_state.damping,
            pointer_pos: self.pointer_ndc,
            pointer_active: self.pointer_active as u32,
            time: self.elapsed,
            viewport: [self.config.width as f32, self.config.height as f32],
            ..SimParams::default()
        };
        self.simulation.update_params(&params);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Physics and draw share one command buffer: the queue orders the
        // render's read of the next buffer after the compute write, and the
        // draw shows this frame's state rather than a one-frame-stale one.
        let step_started = Instant::now();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.simulation.encode_step(&mut encoder);
        self.renderer.encode_draw(
            &mut encoder,
            &view,
            self.simulation.store().next_index(),
            self.simulation.particle_count(),
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        self.ui_state.compute_time = step_started.elapsed().as_secs_f32() * 1000.0;

        self.simulation.swap();

        // Telemetry for the overlay
        self.ui_state.fps = 1000.0 / avg_frame_time;
        self.ui_state.frame_time = avg_frame_time;
        self.ui_state.particle_count = self.simulation.particle_count();

        // GUI overlay on top of the galaxy
        {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("GUI Encoder"),
                });

            self.gui.render(
                &self.device,
                &self.queue,
                &mut encoder,
                window,
                &view,
                &mut self.ui_state,
            );

            self.queue.submit(std::iter::once(encoder.finish()));
        }

        output.present();
        Ok(())
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    init_error: Option<anyhow::Error>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title("Galaxy")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

            let window = Arc::new(event_loop.create_window(window_attributes).unwrap());
            self.window = Some(window.clone());

            match pollster::block_on(GpuState::new(window)) {
                Ok(state) => self.gpu_state = Some(state),
                Err(e) => {
                    // Terminal: no adapter/device/surface. Report clearly
                    // instead of leaving a silently blank canvas.
                    log::error!("simulation unavailable: {e:#}");
                    if let Some(window) = &self.window {
                        window.set_title("Galaxy — simulation unavailable");
                    }
                    self.init_error = Some(e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Events egui consumes (slider drags, panel clicks) never reach the
        // simulation's pointer attractor.
        if let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) {
            if gpu_state.gui.handle_event(window, &event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) {
                    let size = window.inner_size();
                    let w = size.width.max(1) as f64;
                    let h = size.height.max(1) as f64;
                    // Window pixels -> NDC, y flipped so up is positive.
                    gpu_state.pointer_ndc = [
                        ((position.x / w) * 2.0 - 1.0) as f32,
                        (-(position.y / h) * 2.0 + 1.0) as f32,
                    ];
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.pointer_active = state == ElementState::Pressed;
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render(window) {
                        Ok(()) => {
                            window.set_title(&format!(
                                "Galaxy - {:.0} FPS - {} stars",
                                gpu_state.ui_state.fps, gpu_state.ui_state.particle_count
                            ));
                        }
                        Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("surface out of memory, stopping");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("render error: {:?}", e),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting galaxy simulation...");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        gpu_state: None,
        init_error: None,
    };

    event_loop.run_app(&mut app)?;

    match app.init_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
