//! Single-slot scene holding the active galaxy object.

use galaxy_generator::{GalaxyParameters, ParticleBuffers, generate};
use rand::Rng;

use crate::backend::{ParticleBackend, PointMaterial};

/// Owns the one particle object currently attached to the scene.
///
/// The slot is the only writer of the active object. Readers borrow it
/// through [`active`](Self::active) once per frame.
#[derive(Debug)]
pub struct GalaxyScene<H> {
    active: Option<H>,
    generation: u64,
    particle_count: usize,
}

impl<H> Default for GalaxyScene<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> GalaxyScene<H> {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self {
            active: None,
            generation: 0,
            particle_count: 0,
        }
    }

    /// Replaces the active object with one built from `buffers`.
    ///
    /// The previous object, if any, is released before the new one is
    /// uploaded. Returns the newly attached handle.
    pub fn apply<B>(&mut self, backend: &mut B, buffers: &ParticleBuffers, material: PointMaterial) -> &H
    where
        B: ParticleBackend<Handle = H>,
    {
        if let Some(previous) = self.active.take() {
            backend.release(previous);
        }

        let handle = backend.upload(buffers, material);
        self.generation += 1;
        self.particle_count = buffers.particle_count();
        log::debug!(
            "Attached galaxy #{} with {} particles",
            self.generation,
            self.particle_count
        );

        self.active.insert(handle)
    }

    /// Generates a new galaxy from `params` and swaps it in.
    pub fn regenerate<B, R>(&mut self, backend: &mut B, params: &GalaxyParameters, rng: &mut R) -> &H
    where
        B: ParticleBackend<Handle = H>,
        R: Rng + ?Sized,
    {
        // Release first so the old GPU object is gone before the new
        // buffers are even allocated.
        if let Some(previous) = self.active.take() {
            backend.release(previous);
        }
        let buffers = generate(params, rng);
        self.apply(backend, &buffers, PointMaterial::from_params(params))
    }

    /// The currently attached object.
    pub fn active(&self) -> Option<&H> {
        self.active.as_ref()
    }

    /// Whether an object is attached.
    pub fn is_attached(&self) -> bool {
        self.active.is_some()
    }

    /// Number of objects attached over the scene's lifetime.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Particle count of the active object (0 when empty).
    pub fn particle_count(&self) -> usize {
        if self.active.is_some() {
            self.particle_count
        } else {
            0
        }
    }

    /// Releases the active object, leaving the scene empty.
    pub fn dispose<B>(&mut self, backend: &mut B)
    where
        B: ParticleBackend<Handle = H>,
    {
        if let Some(previous) = self.active.take() {
            backend.release(previous);
            log::debug!("Disposed galaxy #{}", self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Upload(u32),
        Release(u32),
    }

    #[derive(Debug, PartialEq, Eq)]
    struct FakeHandle {
        id: u32,
        particles: usize,
    }

    /// Backend that tracks live handles instead of GPU memory.
    #[derive(Default)]
    struct CountingBackend {
        next_id: u32,
        live: HashSet<u32>,
        log: Vec<Op>,
        last_material: Option<PointMaterial>,
    }

    impl ParticleBackend for CountingBackend {
        type Handle = FakeHandle;

        fn upload(&mut self, buffers: &ParticleBuffers, material: PointMaterial) -> FakeHandle {
            let id = self.next_id;
            self.next_id += 1;
            self.live.insert(id);
            self.log.push(Op::Upload(id));
            self.last_material = Some(material);
            FakeHandle {
                id,
                particles: buffers.particle_count(),
            }
        }

        fn release(&mut self, handle: FakeHandle) {
            assert!(self.live.remove(&handle.id), "double release of {}", handle.id);
            self.log.push(Op::Release(handle.id));
        }
    }

    fn small_params() -> GalaxyParameters {
        GalaxyParameters {
            particle_count: 500,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_scene_is_empty() {
        let scene: GalaxyScene<FakeHandle> = GalaxyScene::new();
        assert!(!scene.is_attached());
        assert_eq!(scene.generation(), 0);
        assert_eq!(scene.particle_count(), 0);
    }

    #[test]
    fn test_regenerate_twice_leaves_one_live_object() {
        let mut backend = CountingBackend::default();
        let mut scene = GalaxyScene::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        scene.regenerate(&mut backend, &small_params(), &mut rng);
        scene.regenerate(&mut backend, &small_params(), &mut rng);

        assert_eq!(backend.live.len(), 1);
        assert_eq!(scene.active().map(|h| h.id), Some(1));
        assert_eq!(scene.generation(), 2);
    }

    #[test]
    fn test_previous_object_released_before_next_upload() {
        let mut backend = CountingBackend::default();
        let mut scene = GalaxyScene::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        for _ in 0..3 {
            scene.regenerate(&mut backend, &small_params(), &mut rng);
        }

        assert_eq!(
            backend.log,
            vec![
                Op::Upload(0),
                Op::Release(0),
                Op::Upload(1),
                Op::Release(1),
                Op::Upload(2),
            ]
        );
    }

    #[test]
    fn test_apply_returns_new_handle() {
        let mut backend = CountingBackend::default();
        let mut scene = GalaxyScene::new();
        let buffers = ParticleBuffers::zeroed(42);

        let handle = scene.apply(&mut backend, &buffers, PointMaterial { size: 0.05 });
        assert_eq!(
            handle,
            &FakeHandle {
                id: 0,
                particles: 42
            }
        );
        assert_eq!(scene.particle_count(), 42);
        assert_eq!(backend.last_material, Some(PointMaterial { size: 0.05 }));
    }

    #[test]
    fn test_material_follows_parameters() {
        let mut backend = CountingBackend::default();
        let mut scene = GalaxyScene::new();
        let params = GalaxyParameters {
            size: 0.07,
            ..small_params()
        };
        scene.regenerate(&mut backend, &params, &mut ChaCha8Rng::seed_from_u64(3));
        assert_eq!(backend.last_material, Some(PointMaterial { size: 0.07 }));
    }

    #[test]
    fn test_dispose_releases_everything() {
        let mut backend = CountingBackend::default();
        let mut scene = GalaxyScene::new();
        scene.regenerate(&mut backend, &small_params(), &mut ChaCha8Rng::seed_from_u64(4));

        scene.dispose(&mut backend);
        assert!(backend.live.is_empty());
        assert!(!scene.is_attached());

        // Disposing an empty scene is a no-op.
        scene.dispose(&mut backend);
        assert_eq!(backend.log.len(), 2);
    }

    #[test]
    fn test_empty_galaxy_still_attaches() {
        let mut backend = CountingBackend::default();
        let mut scene = GalaxyScene::new();
        let params = GalaxyParameters {
            particle_count: 0,
            ..Default::default()
        };
        let handle = scene.regenerate(&mut backend, &params, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(handle.particles, 0);
        assert!(scene.is_attached());
    }
}
