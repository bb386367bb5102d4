//! Window, event handling and the per-frame sequence.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use galaxy_config::Config;
use galaxy_input::{KeyboardState, MouseState, NormalizedCursor, OrbitControls, OrbitSettings};
use galaxy_panel::{
    Hotkeys, PanelServer, PanelState, ParameterPanel, create_panel_server, get_panel_port,
};
use galaxy_render::{
    Camera, FrameEncoder, GpuParticleBackend, GpuParticles, PointsPipeline, PointsUniform,
    RenderContext, RenderPassBuilder, SurfaceError, SurfaceResizeEvent, SurfaceWrapper,
    UpscaleTarget, init_render_context_blocking,
};
use galaxy_scene::GalaxyScene;
use glam::Vec3;
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::render_loop::RenderLoop;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ))
        .with_fullscreen(
            config
                .window
                .fullscreen
                .then_some(Fullscreen::Borderless(None)),
        )
}

fn orbit_settings_from_config(config: &Config) -> OrbitSettings {
    let camera = &config.camera;
    OrbitSettings {
        damping_factor: camera.damping_factor,
        rotate_speed: camera.rotate_speed,
        pan_speed: camera.pan_speed,
        zoom_speed: camera.zoom_speed,
        min_distance: camera.min_distance,
        max_distance: camera.max_distance,
        fov_y: config.render.fov_y_degrees.to_radians(),
        ..OrbitSettings::default()
    }
}

/// What the panel asked for since the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PanelPoll {
    quit: bool,
    regenerate: bool,
}

/// Everything the running viewer owns.
///
/// Constructed from a [`Config`], driven by winit through
/// [`ApplicationHandler`], and torn down on close, when the active galaxy is
/// released.
pub struct AppState {
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    pipeline: Option<PointsPipeline>,
    /// Render-size color target the points pass draws into.
    upscale: Option<UpscaleTarget>,
    surface_wrapper: SurfaceWrapper,
    camera: Camera,
    orbit: OrbitControls,
    scene: GalaxyScene<GpuParticles>,
    panel_state: Arc<Mutex<PanelState>>,
    panel_server: Option<PanelServer>,
    hotkeys: Hotkeys,
    keyboard: KeyboardState,
    mouse: MouseState,
    /// Kept current on every cursor move; nothing reads it yet.
    cursor: NormalizedCursor,
    render_loop: RenderLoop,
}

impl AppState {
    pub fn with_config(config: Config) -> Self {
        let surface_wrapper = SurfaceWrapper::new(
            config.window.width,
            config.window.height,
            1.0,
            config.render.max_pixel_ratio,
        );
        let render = surface_wrapper.render_size();
        let camera = Camera::new(
            config.render.fov_y_degrees,
            render.aspect_ratio(),
            config.render.near,
            config.render.far,
        );
        let orbit = OrbitControls::new(
            Vec3::from_array(config.camera.position),
            Vec3::ZERO,
            orbit_settings_from_config(&config),
        );

        let panel_state = Arc::new(Mutex::new(PanelState::new(ParameterPanel::new(
            config.galaxy,
        ))));
        let panel_server = config
            .panel
            .enabled
            .then(|| create_panel_server(get_panel_port(config.panel.port)));

        Self {
            config,
            window: None,
            gpu: None,
            pipeline: None,
            upscale: None,
            surface_wrapper,
            camera,
            orbit,
            scene: GalaxyScene::new(),
            panel_state,
            panel_server,
            hotkeys: Hotkeys::new(),
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            cursor: NormalizedCursor::default(),
            render_loop: RenderLoop::new(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn cursor(&self) -> NormalizedCursor {
        self.cursor
    }

    pub fn scene(&self) -> &GalaxyScene<GpuParticles> {
        &self.scene
    }

    pub fn panel_state(&self) -> Arc<Mutex<PanelState>> {
        self.panel_state.clone()
    }

    /// Builds a galaxy from the panel's current parameters and swaps it into
    /// the scene, releasing the previous one first.
    ///
    /// Does nothing before the GPU is up.
    pub fn regenerate_galaxy(&mut self) {
        let Some(gpu) = &self.gpu else {
            debug!("Regeneration requested before GPU init, skipping");
            return;
        };

        let params = *self.lock_panel().panel.params();
        let started = Instant::now();
        let mut backend = GpuParticleBackend::new(&gpu.device);
        self.scene.regenerate(&mut backend, &params, &mut rand::rng());
        info!(
            "Generated galaxy #{}: {} particles, {} branches in {:.1}ms",
            self.scene.generation(),
            self.scene.particle_count(),
            params.branches,
            started.elapsed().as_secs_f64() * 1000.0
        );

        let particle_count = self.scene.particle_count();
        let generation = self.scene.generation();
        let mut state = self.lock_panel();
        state.metrics.particle_count = particle_count;
        state.metrics.regeneration_count = generation;
    }

    fn lock_panel(&self) -> MutexGuard<'_, PanelState> {
        self.panel_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies hotkeys and drains quit/commit requests from the panel.
    fn poll_panel(&mut self) -> PanelPoll {
        let mut state = self
            .panel_state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.hotkeys.process(&self.keyboard, &mut state.panel);
        PanelPoll {
            quit: state.quit_requested,
            regenerate: state.panel.take_commit(),
        }
    }

    fn publish_metrics(&self) {
        let surface = self.surface_wrapper.surface_size();
        let render = self.surface_wrapper.render_size();
        let mut state = self.lock_panel();
        let metrics = &mut state.metrics;
        metrics.frame_count = self.render_loop.frame_count();
        metrics.frame_time_ms = self.render_loop.frame_time_ms();
        metrics.fps = self.render_loop.fps();
        metrics.surface_width = surface.width;
        metrics.surface_height = surface.height;
        metrics.render_width = render.width;
        metrics.render_height = render.height;
        metrics.uptime_seconds = self.render_loop.uptime_seconds();
    }

    fn on_surface_resized(&mut self, resize: SurfaceResizeEvent) {
        let surface = resize.surface;
        let render = resize.render;
        self.camera
            .set_aspect_ratio(render.width as f32, render.height as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(surface.width, surface.height);
            if let Some(upscale) = &mut self.upscale {
                upscale.resize(&gpu.device, render);
            }
        }
        info!(
            "Surface resized to {}x{}, rendering at {}x{} ({:.0}x{:.0} logical, pixel ratio {:.2})",
            surface.width,
            surface.height,
            render.width,
            render.height,
            resize.logical_width,
            resize.logical_height,
            resize.pixel_ratio
        );
    }

    fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.config.render.clear_color;
        wgpu::Color { r, g, b, a: 1.0 }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let poll = self.poll_panel();
        if poll.quit {
            info!("Quit requested via panel");
            self.shutdown(event_loop);
            return;
        }
        if poll.regenerate {
            self.regenerate_galaxy();
        }

        let viewport_height = self
            .window
            .as_ref()
            .map_or(1.0, |w| w.inner_size().height as f32);
        self.orbit.handle_mouse(&self.mouse, viewport_height);

        let clear_color = self.clear_color();
        let render = self.surface_wrapper.render_size();
        let orbit = &mut self.orbit;
        let camera = &mut self.camera;
        let scene = &self.scene;
        let gpu = self.gpu.as_ref();
        let pipeline = self.pipeline.as_ref();
        let upscale = self.upscale.as_ref();

        let outcome = self.render_loop.frame(
            || {
                let pose = orbit.update();
                camera.set_pose(pose.position, pose.rotation);
                if let (Some(gpu), Some(pipeline)) = (gpu, pipeline) {
                    let size = scene.active().map_or(0.0, |p| p.material().size);
                    let uniform = PointsUniform::new(camera, render.width, render.height, size);
                    pipeline.write_uniform(&gpu.queue, &uniform);
                }
            },
            || match (gpu, pipeline, upscale) {
                (Some(gpu), Some(pipeline), Some(upscale)) => {
                    draw_frame(gpu, pipeline, upscale, scene.active(), clear_color)
                }
                _ => Ok(()),
            },
        );

        match outcome {
            Some(Err(SurfaceError::OutOfMemory)) => {
                error!("Out of GPU memory, stopping");
                self.shutdown(event_loop);
                return;
            }
            Some(Err(e)) => debug!("Skipping frame: {e}"),
            Some(Ok(())) | None => {}
        }

        self.publish_metrics();
        self.keyboard.clear_transients();
        self.mouse.clear_transients();

        if self.render_loop.is_running()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.render_loop.stop();
        if let Some(gpu) = &self.gpu {
            self.scene.dispose(&mut GpuParticleBackend::new(&gpu.device));
        }
        if let Some(server) = &mut self.panel_server {
            server.stop();
        }
        event_loop.exit();
    }
}

/// Draws the galaxy at the render size, then stretches it over the
/// full-size surface.
fn draw_frame(
    gpu: &RenderContext,
    pipeline: &PointsPipeline,
    upscale: &UpscaleTarget,
    particles: Option<&GpuParticles>,
    clear_color: wgpu::Color,
) -> Result<(), SurfaceError> {
    let surface_texture = gpu.get_current_texture()?;
    let mut frame = FrameEncoder::new(&gpu.device, &gpu.queue, surface_texture);
    let builder = RenderPassBuilder::new()
        .clear_color(clear_color)
        .label("galaxy-pass");

    if let Some(mut pass) = frame.begin_render_pass(&builder, upscale.view())
        && let Some(particles) = particles
    {
        pipeline.draw(&mut pass, particles);
    }
    frame.upscale_to_surface(upscale);

    frame.submit();
    Ok(())
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let inner_size = window.inner_size();
        self.surface_wrapper = SurfaceWrapper::new(
            inner_size.width,
            inner_size.height,
            window.scale_factor(),
            self.config.render.max_pixel_ratio,
        );
        let surface = self.surface_wrapper.surface_size();
        let render = self.surface_wrapper.render_size();
        self.camera
            .set_aspect_ratio(render.width as f32, render.height as f32);
        info!(
            "Window {}x{} (scale {:.2}), rendering at {}x{}",
            surface.width,
            surface.height,
            window.scale_factor(),
            render.width,
            render.height
        );

        match init_render_context_blocking(
            window.clone(),
            surface.width,
            surface.height,
            self.config.window.vsync,
        ) {
            Ok(ctx) => {
                self.pipeline = Some(PointsPipeline::new(&ctx.device, ctx.surface_format));
                self.upscale = Some(UpscaleTarget::new(&ctx.device, ctx.surface_format, render));
                self.gpu = Some(ctx);
            }
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        self.window = Some(window.clone());
        self.regenerate_galaxy();

        if let Some(server) = &mut self.panel_server
            && let Err(e) = server.start(self.panel_state.clone())
        {
            warn!("Failed to start parameter panel: {e}");
        }

        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self
                    .surface_wrapper
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.on_surface_resized(resize);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let inner = window.inner_size();
                    if let Some(resize) = self.surface_wrapper.handle_scale_factor_changed(
                        scale_factor,
                        inner.width,
                        inner.height,
                    ) {
                        self.on_surface_resized(resize);
                    }
                }
            }
            WindowEvent::Focused(false) => {
                self.keyboard.release_all();
                self.mouse.release_all();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.cursor.update(
                        position.x,
                        position.y,
                        f64::from(size.width),
                        f64::from(size.height),
                    );
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse.on_cursor_left();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse.on_scroll(delta);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer until the window closes or the
/// panel sends `quit`.
#[instrument(skip(config))]
pub fn run_with_config(config: Config) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::with_config(config);
    event_loop.run_app(&mut app)
}
