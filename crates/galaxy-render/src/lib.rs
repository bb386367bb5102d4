//! wgpu rendering for the galaxy: device setup, pixel-ratio aware surface
//! sizing, a perspective camera, the additive points pipeline and the
//! upscale onto the swapchain.

pub mod camera;
pub mod gpu;
pub mod pass;
pub mod points;
pub mod surface;
pub mod upscale;

pub use camera::Camera;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use points::{
    GpuParticleBackend, GpuParticles, POINTS_SHADER_SOURCE, ParticleInstance, PointsPipeline,
    PointsUniform, instances_from_buffers,
};
pub use surface::{DEFAULT_MAX_PIXEL_RATIO, RenderSize, SurfaceResizeEvent, SurfaceWrapper};
pub use upscale::{UPSCALE_SHADER_SOURCE, UpscaleTarget};
