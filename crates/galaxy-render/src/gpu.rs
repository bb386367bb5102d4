//! GPU device initialization and frame acquisition.

use std::sync::Arc;
use winit::window::Window;

/// Failures while bringing up the GPU.
#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("surface is not supported by the selected adapter")]
    UnsupportedSurface,
}

/// Why a frame could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// Still lost after one reconfigure. Skip the frame.
    #[error("surface lost")]
    Lost,

    /// Fatal; the render loop stops.
    #[error("out of memory")]
    OutOfMemory,

    /// Skip the frame and try again on the next one.
    #[error("timeout")]
    Timeout,
}

/// Owns the wgpu instance, device, queue, and the window surface.
pub struct RenderContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
}

impl RenderContext {
    /// Creates the device and configures the surface at `width`×`height`,
    /// the window's physical size.
    pub async fn new(
        window: Arc<Window>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderContextError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("galaxy-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let surface_config = surface_config(
            &caps.formats,
            &caps.present_modes,
            &caps.alpha_modes,
            vsync,
            width,
            height,
        )?;
        let surface_format = surface_config.format;
        log::debug!(
            "Surface format {surface_format:?}, present mode {:?}",
            surface_config.present_mode
        );
        surface.configure(&device, &surface_config);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            surface_format,
        })
    }

    /// Reconfigures the surface to the window's new physical size. Zero
    /// dimensions are clamped to 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Acquires the next frame, reconfiguring once if the surface was lost
    /// or went stale.
    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, SurfaceError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                self.surface
                    .get_current_texture()
                    .map_err(|_| SurfaceError::Lost)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(SurfaceError::OutOfMemory),
            Err(wgpu::SurfaceError::Timeout) => Err(SurfaceError::Timeout),
            Err(wgpu::SurfaceError::Other) => {
                log::error!("Unknown surface error");
                Err(SurfaceError::Lost)
            }
        }
    }
}

/// Blocking wrapper around [`RenderContext::new`].
pub fn init_render_context_blocking(
    window: Arc<Window>,
    width: u32,
    height: u32,
    vsync: bool,
) -> Result<RenderContext, RenderContextError> {
    pollster::block_on(RenderContext::new(window, width, height, vsync))
}

/// Builds the swapchain configuration from the surface capabilities.
///
/// An adapter that reports no formats or alpha modes cannot present to
/// this surface.
fn surface_config(
    formats: &[wgpu::TextureFormat],
    present_modes: &[wgpu::PresentMode],
    alpha_modes: &[wgpu::CompositeAlphaMode],
    vsync: bool,
    width: u32,
    height: u32,
) -> Result<wgpu::SurfaceConfiguration, RenderContextError> {
    let format =
        select_preferred_srgb_format(formats).ok_or(RenderContextError::UnsupportedSurface)?;
    let alpha_mode = alpha_modes
        .first()
        .copied()
        .ok_or(RenderContextError::UnsupportedSurface)?;

    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode: choose_present_mode(vsync, present_modes),
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    })
}

/// Prefers an sRGB surface so linear particle colors are encoded on write.
fn select_preferred_srgb_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    if formats.contains(&wgpu::TextureFormat::Bgra8UnormSrgb) {
        Some(wgpu::TextureFormat::Bgra8UnormSrgb)
    } else if formats.contains(&wgpu::TextureFormat::Rgba8UnormSrgb) {
        Some(wgpu::TextureFormat::Rgba8UnormSrgb)
    } else {
        formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| formats.first().copied())
    }
}

/// Fifo when vsync is on. Otherwise the lowest-latency mode available,
/// falling back to Fifo which every surface supports.
fn choose_present_mode(vsync: bool, modes: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
        .into_iter()
        .find(|mode| modes.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}
