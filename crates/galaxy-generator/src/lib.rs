//! Procedural spiral galaxy point clouds.
//!
//! A [`GalaxyParameters`] set is turned into a [`ParticleBuffers`] pair of
//! interleaved position and color arrays by [`generate`]. The generator is a
//! pure function of its parameters and the random source it is handed.

pub mod color;
pub mod generator;
pub mod params;

pub use color::{ColorParseError, Rgb, mix_color};
pub use generator::{ParticleBuffers, branch_angle, generate, generate_galaxy, random_offset};
pub use params::GalaxyParameters;
