//! Cursor position normalized to the window, centered on zero.

use glam::Vec2;

/// Cursor position in `[-0.5, 0.5]` on both axes, `y` pointing up.
///
/// Nothing renders from this yet; it is kept current so pointer-driven
/// effects can read it without touching the event plumbing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizedCursor {
    pub x: f32,
    pub y: f32,
}

impl NormalizedCursor {
    /// Updates from a position in the same units as `width`/`height`.
    /// A zero-sized window leaves the value unchanged.
    pub fn update(&mut self, px: f64, py: f64, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.x = (px / width - 0.5) as f32;
        self.y = -(py / height - 0.5) as f32;
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}
