//! The parameter set that drives galaxy generation.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Inputs to [`generate`](crate::generate).
///
/// The generator trusts these values. Range enforcement is the job of the
/// parameter panel that edits them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyParameters {
    /// Number of particles to emit.
    pub particle_count: u32,
    /// Point size in world units.
    pub size: f32,
    /// Outer radius of the disc.
    pub radius: f32,
    /// Number of spiral arms. Must be at least 1.
    pub branches: u32,
    /// Angular twist per unit of radius, in radians. Negative values wind the
    /// arms the other way.
    pub spin: f32,
    /// Scale of the random scatter around each arm.
    pub randomness: f32,
    /// Exponent applied to the scatter; higher values hug the arm center line.
    pub randomness_power: f32,
    /// Color at the galactic center.
    pub inner_color: Rgb,
    /// Color at the rim.
    pub outer_color: Rgb,
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            particle_count: 100_000,
            size: 0.01,
            radius: 5.0,
            branches: 3,
            spin: 1.0,
            randomness: 0.2,
            randomness_power: 3.0,
            // #ff6030 and #1b3984
            inner_color: Rgb::from_srgb8(0xff, 0x60, 0x30),
            outer_color: Rgb::from_srgb8(0x1b, 0x39, 0x84),
        }
    }
}

impl GalaxyParameters {
    /// Length of each buffer produced for these parameters.
    pub fn buffer_len(&self) -> usize {
        self.particle_count as usize * 3
    }
}
