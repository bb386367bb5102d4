//! Render-size tracking with a capped device pixel ratio.
//!
//! High-density displays can report scale factors of 3 or more. Rendering a
//! few hundred thousand additive quads at that density costs a lot for little
//! visible gain, so the render size is the logical window size times
//! `min(scale_factor, max_pixel_ratio)`.
//!
//! The swapchain itself always matches the window's physical size. Points
//! are drawn into an offscreen target of the render size, which is then
//! upscaled onto the surface.

/// Pixel ratio cap used unless configured otherwise.
pub const DEFAULT_MAX_PIXEL_RATIO: f64 = 2.0;

const MIN_SURFACE_DIMENSION: u32 = 1;

/// Size of the render target in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

impl RenderSize {
    const MIN: Self = Self {
        width: MIN_SURFACE_DIMENSION,
        height: MIN_SURFACE_DIMENSION,
    };

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Emitted when the surface or render size changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceResizeEvent {
    /// Swapchain size: the window's physical size.
    pub surface: RenderSize,
    /// Offscreen target size after the pixel-ratio cap.
    pub render: RenderSize,
    pub logical_width: f64,
    pub logical_height: f64,
    /// Effective pixel ratio after the cap.
    pub pixel_ratio: f64,
}

/// Tracks window size and scale factor and derives the render size.
#[derive(Clone, Debug)]
pub struct SurfaceWrapper {
    logical_width: f64,
    logical_height: f64,
    scale_factor: f64,
    max_pixel_ratio: f64,
    surface: RenderSize,
    render: RenderSize,
}

impl SurfaceWrapper {
    /// Creates a wrapper from the window's physical size and scale factor.
    /// A non-positive cap falls back to [`DEFAULT_MAX_PIXEL_RATIO`].
    pub fn new(
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
        max_pixel_ratio: f64,
    ) -> Self {
        let max_pixel_ratio = if max_pixel_ratio > 0.0 {
            max_pixel_ratio
        } else {
            DEFAULT_MAX_PIXEL_RATIO
        };
        let mut wrapper = Self {
            logical_width: 0.0,
            logical_height: 0.0,
            scale_factor: sanitize_scale(scale_factor),
            max_pixel_ratio,
            surface: RenderSize::MIN,
            render: RenderSize::MIN,
        };
        wrapper.set_physical(physical_width, physical_height);
        wrapper
    }

    /// Handles a window resize (physical pixels). Returns an event only if
    /// the surface or render size changed.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        let before = (self.surface, self.render);
        self.set_physical(physical_width, physical_height);
        ((self.surface, self.render) != before).then(|| self.event())
    }

    /// Handles a move to a display with a different scale factor.
    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        self.scale_factor = sanitize_scale(scale_factor);
        self.handle_resize(physical_width, physical_height)
    }

    /// Size the swapchain is configured at, clamped to at least 1×1.
    pub fn surface_size(&self) -> RenderSize {
        self.surface
    }

    pub fn render_size(&self) -> RenderSize {
        self.render
    }

    pub fn logical_width(&self) -> f64 {
        self.logical_width
    }

    pub fn logical_height(&self) -> f64 {
        self.logical_height
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Scale factor after the cap.
    pub fn pixel_ratio(&self) -> f64 {
        self.scale_factor.min(self.max_pixel_ratio)
    }

    fn set_physical(&mut self, physical_width: u32, physical_height: u32) {
        self.surface = RenderSize {
            width: physical_width.max(MIN_SURFACE_DIMENSION),
            height: physical_height.max(MIN_SURFACE_DIMENSION),
        };
        self.logical_width = f64::from(physical_width) / self.scale_factor;
        self.logical_height = f64::from(physical_height) / self.scale_factor;

        let ratio = self.pixel_ratio();
        self.render = RenderSize {
            width: scaled(self.logical_width, ratio),
            height: scaled(self.logical_height, ratio),
        };
    }

    fn event(&self) -> SurfaceResizeEvent {
        SurfaceResizeEvent {
            surface: self.surface,
            render: self.render,
            logical_width: self.logical_width,
            logical_height: self.logical_height,
            pixel_ratio: self.pixel_ratio(),
        }
    }
}

fn scaled(logical: f64, ratio: f64) -> u32 {
    ((logical * ratio).round() as u32).max(MIN_SURFACE_DIMENSION)
}

fn sanitize_scale(scale_factor: f64) -> f64 {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_below_cap_uses_physical_size() {
        let wrapper = SurfaceWrapper::new(2560, 1440, 2.0, 2.0);
        assert_eq!(
            wrapper.render_size(),
            RenderSize {
                width: 2560,
                height: 1440
            }
        );
        assert!((wrapper.logical_width() - 1280.0).abs() < 1e-9);
        assert_eq!(wrapper.pixel_ratio(), 2.0);
    }

    #[test]
    fn test_pixel_ratio_capped_at_two() {
        // 1280x720 logical on a 3x display.
        let wrapper = SurfaceWrapper::new(3840, 2160, 3.0, DEFAULT_MAX_PIXEL_RATIO);
        assert_eq!(wrapper.pixel_ratio(), 2.0);
        assert_eq!(
            wrapper.render_size(),
            RenderSize {
                width: 2560,
                height: 1440
            }
        );
    }

    #[test]
    fn test_surface_size_matches_window_above_cap() {
        let mut wrapper = SurfaceWrapper::new(3840, 2160, 3.0, DEFAULT_MAX_PIXEL_RATIO);
        assert_eq!(
            wrapper.surface_size(),
            RenderSize {
                width: 3840,
                height: 2160
            }
        );

        for (scale, width, height) in [(4.0, 5120, 2880), (3.0, 3000, 1701), (1.5, 1200, 800)] {
            let event = wrapper
                .handle_scale_factor_changed(scale, width, height)
                .unwrap();
            assert_eq!(event.surface, RenderSize { width, height });
            assert_eq!(wrapper.surface_size(), RenderSize { width, height });
            assert!(event.render.width <= width && event.render.height <= height);
        }
    }

    #[test]
    fn test_zero_size_clamped_to_one() {
        let mut wrapper = SurfaceWrapper::new(0, 0, 1.0, 2.0);
        assert_eq!(wrapper.render_size(), RenderSize::MIN);
        assert_eq!(wrapper.surface_size(), RenderSize::MIN);

        let event = wrapper.handle_resize(1920, 1080).unwrap();
        assert_eq!(event.render.width, 1920);

        wrapper.handle_resize(0, 500);
        assert_eq!(wrapper.render_size().width, 1);
        assert_eq!(wrapper.render_size().height, 500);
    }

    #[test]
    fn test_no_event_on_same_size() {
        let mut wrapper = SurfaceWrapper::new(1920, 1080, 1.0, 2.0);
        assert!(wrapper.handle_resize(1920, 1080).is_none());
    }

    #[test]
    fn test_resize_event_contents() {
        let mut wrapper = SurfaceWrapper::new(1280, 720, 1.0, 2.0);
        let event = wrapper.handle_resize(1600, 900).unwrap();
        assert_eq!(
            event,
            SurfaceResizeEvent {
                surface: RenderSize {
                    width: 1600,
                    height: 900
                },
                render: RenderSize {
                    width: 1600,
                    height: 900
                },
                logical_width: 1600.0,
                logical_height: 900.0,
                pixel_ratio: 1.0,
            }
        );
        assert!((event.render.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_scale_change_within_cap_changes_render_size() {
        let mut wrapper = SurfaceWrapper::new(1280, 720, 1.0, 2.0);
        let event = wrapper.handle_scale_factor_changed(2.0, 2560, 1440).unwrap();
        assert_eq!(event.render.width, 2560);
        assert_eq!(event.pixel_ratio, 2.0);
    }

    #[test]
    fn test_scale_change_above_cap_keeps_render_size() {
        // 2x -> 3x with the same logical size: the swapchain grows, the
        // capped render size does not.
        let mut wrapper = SurfaceWrapper::new(2560, 1440, 2.0, 2.0);
        let event = wrapper.handle_scale_factor_changed(3.0, 3840, 2160).unwrap();
        assert_eq!(
            event.surface,
            RenderSize {
                width: 3840,
                height: 2160
            }
        );
        assert_eq!(
            event.render,
            RenderSize {
                width: 2560,
                height: 1440
            }
        );
        assert_eq!(wrapper.scale_factor(), 3.0);
    }

    #[test]
    fn test_invalid_inputs_sanitized() {
        let wrapper = SurfaceWrapper::new(800, 600, 0.0, -1.0);
        assert_eq!(wrapper.scale_factor(), 1.0);
        assert_eq!(wrapper.pixel_ratio(), 1.0);
        assert_eq!(wrapper.render_size().width, 800);
    }
}
