//! RGB colors parsed from sRGB hex strings and blended in linear space.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Errors produced when parsing a `#rrggbb` color string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    /// The string does not start with `#` or is not seven characters long.
    #[error("expected a color of the form #rrggbb, got {0:?}")]
    Format(String),

    /// One of the channel pairs is not valid hexadecimal.
    #[error("invalid hex digits in color {0:?}")]
    Digits(String),
}

/// A color in linear RGB, each channel in `[0, 1]`.
///
/// Serialized as an sRGB `#rrggbb` string so that config files and the panel
/// API use the same notation as a color picker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Builds a color from linear channel values.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#rrggbb` sRGB hex string into linear RGB.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.is_ascii())
            .ok_or_else(|| ColorParseError::Format(hex.to_string()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digits(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorParseError::Digits(hex.to_string()))
        };
        let (r, g, b) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);

        Ok(Self::from_srgb8(r, g, b))
    }

    /// Converts 8-bit sRGB channels to linear RGB.
    pub fn from_srgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: srgb_to_linear(f32::from(r) / 255.0),
            g: srgb_to_linear(f32::from(g) / 255.0),
            b: srgb_to_linear(f32::from(b) / 255.0),
        }
    }

    /// Formats the color as an sRGB `#rrggbb` string.
    pub fn to_hex(&self) -> String {
        let byte = |c: f32| (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    /// Channels as an array, in `r, g, b` order.
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Rgb> for Vec3 {
    fn from(c: Rgb) -> Self {
        Vec3::new(c.r, c.g, c.b)
    }
}

impl From<Vec3> for Rgb {
    fn from(v: Vec3) -> Self {
        Rgb::new(v.x, v.y, v.z)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Linearly interpolates between two linear colors. `t = 0` yields `inner`,
/// `t = 1` yields `outer`.
pub fn mix_color(inner: Rgb, outer: Rgb, t: f32) -> Rgb {
    Vec3::from(inner).lerp(Vec3::from(outer), t).into()
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(0.416_666_66) - 0.055
    }
}
