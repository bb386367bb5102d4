//! Scene ownership of the generated galaxy.
//!
//! The scene holds at most one particle object at a time. Replacing it goes
//! through [`GalaxyScene::apply`], which releases the previous object before
//! the new one is uploaded, so regenerating never retains two copies of the
//! particle data on the GPU.

mod backend;
mod scene;

pub use backend::{ParticleBackend, PointMaterial};
pub use scene::GalaxyScene;
