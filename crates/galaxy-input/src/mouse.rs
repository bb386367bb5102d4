//! Frame-coherent mouse state.
//!
//! [`MouseState`] accumulates winit pointer events between frames. The orbit
//! controller reads the accumulated drag delta and wheel motion once per
//! frame, after which [`clear_transients`](MouseState::clear_transients)
//! resets them.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of a touchpad scroll that count as one wheel notch.
const PIXELS_PER_LINE: f64 = 40.0;

/// What a held button does to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Left button: orbit around the target.
    Rotate,
    /// Right or middle button: move the target.
    Pan,
}

fn button_index(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        _ => None,
    }
}

/// Pointer position, drag delta, buttons and wheel for the current frame.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Option<Vec2>,
    delta: Vec2,
    /// Held state of left, right and middle.
    buttons: [bool; 3],
    scroll: f32,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a `CursorMoved` event (physical pixels).
    ///
    /// The first event after the cursor enters produces no delta, so the
    /// camera does not jump when the pointer re-enters the window.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if let Some(previous) = self.position {
            self.delta += new_pos - previous;
        }
        self.position = Some(new_pos);
    }

    /// Process a `CursorLeft` event.
    pub fn on_cursor_left(&mut self) {
        self.position = None;
    }

    /// Process a `MouseInput` event. Back/forward buttons are ignored.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let Some(idx) = button_index(button) else {
            return;
        };
        self.buttons[idx] = state == ElementState::Pressed;
    }

    /// Process a `MouseWheel` event. Positive values mean scrolling up.
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
        };
    }

    /// Forgets held buttons, e.g. when the window loses focus mid-drag.
    pub fn release_all(&mut self) {
        self.buttons = [false; 3];
    }

    /// Clears per-frame transients: delta and scroll.
    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
    }

    /// Last known cursor position, `None` while outside the window.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Pointer movement since the last clear.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Wheel notches since the last clear.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        button_index(button).is_some_and(|idx| self.buttons[idx])
    }

    /// The active drag gesture. Left wins when several buttons are held.
    #[must_use]
    pub fn drag_mode(&self) -> Option<DragMode> {
        if self.is_button_pressed(MouseButton::Left) {
            Some(DragMode::Rotate)
        } else if self.is_button_pressed(MouseButton::Right)
            || self.is_button_pressed(MouseButton::Middle)
        {
            Some(DragMode::Pan)
        } else {
            None
        }
    }
}
