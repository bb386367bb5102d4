//! The seam between the scene and whatever owns GPU memory.

use galaxy_generator::{GalaxyParameters, ParticleBuffers};

/// Per-object draw settings derived from the parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// Point size in world units; points shrink with distance.
    pub size: f32,
}

impl PointMaterial {
    /// Material for a galaxy generated from `params`.
    pub fn from_params(params: &GalaxyParameters) -> Self {
        Self { size: params.size }
    }
}

/// Uploads particle buffers and frees the resulting objects.
///
/// Implemented by the renderer for real GPU buffers and by tests for
/// bookkeeping without a device.
pub trait ParticleBackend {
    /// Handle to one uploaded particle object.
    type Handle;

    /// Creates a drawable object from freshly generated buffers.
    fn upload(&mut self, buffers: &ParticleBuffers, material: PointMaterial) -> Self::Handle;

    /// Frees the resources behind `handle`. The handle is consumed.
    fn release(&mut self, handle: Self::Handle);
}
