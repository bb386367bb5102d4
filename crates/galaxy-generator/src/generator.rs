//! Spiral-arm point cloud generation.
//!
//! Each particle lands on one of `branches` evenly spaced arms at a uniformly
//! random distance from the center. The arm is twisted by `spin` radians per
//! unit of radius and every particle is scattered around the arm center line
//! by a power-law offset, so most particles sit close to the arm and a few
//! stray far from it.

use std::f32::consts::TAU;

use rand::Rng;

use crate::color::mix_color;
use crate::params::GalaxyParameters;

/// Interleaved particle data ready for upload.
///
/// `positions` holds `(x, y, z)` triples, `colors` holds linear `(r, g, b)`
/// triples, both of length `3 * particle_count`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl ParticleBuffers {
    /// Allocates zeroed buffers for `particle_count` particles.
    pub fn zeroed(particle_count: usize) -> Self {
        Self {
            positions: vec![0.0; particle_count * 3],
            colors: vec![0.0; particle_count * 3],
        }
    }

    /// Number of particles held.
    pub fn particle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Whether the buffers hold no particles.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of particle `i`.
    pub fn position(&self, i: usize) -> [f32; 3] {
        let p = &self.positions[i * 3..i * 3 + 3];
        [p[0], p[1], p[2]]
    }

    /// Color of particle `i`.
    pub fn color(&self, i: usize) -> [f32; 3] {
        let c = &self.colors[i * 3..i * 3 + 3];
        [c[0], c[1], c[2]]
    }
}

/// Angle of the arm that particle `index` belongs to.
///
/// # Panics
///
/// Panics if `branches` is zero.
pub fn branch_angle(index: u32, branches: u32) -> f32 {
    (index % branches) as f32 / branches as f32 * TAU
}

/// Draws one signed scatter offset: `u^power`, negated half of the time,
/// scaled by `randomness`.
pub fn random_offset<R: Rng + ?Sized>(rng: &mut R, power: f32, randomness: f32) -> f32 {
    let magnitude = rng.random::<f32>().powf(power);
    let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    magnitude * sign * randomness
}

/// Generates a galaxy from `params`, drawing all randomness from `rng`.
///
/// Output is reproducible for a seeded `rng`.
///
/// # Panics
///
/// Panics if `params.branches` is zero and `params.particle_count` is not.
pub fn generate<R: Rng + ?Sized>(params: &GalaxyParameters, rng: &mut R) -> ParticleBuffers {
    let mut buffers = ParticleBuffers::zeroed(params.particle_count as usize);

    let positions = buffers.positions.chunks_exact_mut(3);
    let colors = buffers.colors.chunks_exact_mut(3);

    for (i, (position, color)) in positions.zip(colors).enumerate() {
        let radius = rng.random::<f32>() * params.radius;
        let spin_angle = radius * params.spin;
        let angle = branch_angle(i as u32, params.branches) + spin_angle;

        let offset_x = random_offset(rng, params.randomness_power, params.randomness);
        let offset_y = random_offset(rng, params.randomness_power, params.randomness);
        let offset_z = random_offset(rng, params.randomness_power, params.randomness);

        position[0] = angle.cos() * radius + offset_x;
        position[1] = offset_y;
        position[2] = angle.sin() * radius + offset_z;

        let mixed = mix_color(
            params.inner_color,
            params.outer_color,
            radius / params.radius,
        );
        color.copy_from_slice(&mixed.to_array());
    }

    buffers
}

/// Generates a galaxy using fresh thread-local entropy. Two calls with the
/// same parameters produce different point clouds.
pub fn generate_galaxy(params: &GalaxyParameters) -> ParticleBuffers {
    generate(params, &mut rand::rng())
}
