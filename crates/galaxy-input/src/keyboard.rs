//! Per-frame keyboard state keyed by physical key code.
//!
//! Hotkeys are matched on physical position, so the digit row and arrows work
//! the same on every layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Minimal description of a key event, constructible in tests.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: KeyCode,
    pub state: ElementState,
    pub repeat: bool,
}

/// Held keys plus the transitions seen since the last clear.
///
/// Auto-repeat presses are surfaced separately through
/// [`repeated`](Self::repeated) so a held arrow key keeps nudging a value
/// without counting as a new press.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
    just_released: HashSet<KeyCode>,
    repeated: HashSet<KeyCode>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a winit [`KeyEvent`]. Keys without a known code are dropped.
    pub fn process_event(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(key) = event.physical_key else {
            tracing::trace!("Ignoring unidentified key {:?}", event.physical_key);
            return;
        };
        self.process_raw(RawKeyEvent {
            key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    pub fn process_raw(&mut self, event: RawKeyEvent) {
        match (event.state, event.repeat) {
            (ElementState::Pressed, true) => {
                self.repeated.insert(event.key);
            }
            (ElementState::Pressed, false) => {
                self.pressed.insert(event.key);
                self.just_pressed.insert(event.key);
            }
            (ElementState::Released, _) => {
                self.pressed.remove(&event.key);
                self.just_released.insert(event.key);
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    #[must_use]
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    #[must_use]
    pub fn just_released(&self, key: KeyCode) -> bool {
        self.just_released.contains(&key)
    }

    /// Whether the OS sent an auto-repeat for `key` since the last clear.
    #[must_use]
    pub fn repeated(&self, key: KeyCode) -> bool {
        self.repeated.contains(&key)
    }

    /// Either shift key is held.
    #[must_use]
    pub fn shift_held(&self) -> bool {
        self.is_pressed(KeyCode::ShiftLeft) || self.is_pressed(KeyCode::ShiftRight)
    }

    /// Drops every held key, e.g. on focus loss. Held keys are reported as
    /// released so pending commits still fire.
    pub fn release_all(&mut self) {
        self.just_released.extend(self.pressed.drain());
    }

    /// Call at the end of each frame.
    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.repeated.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(key: KeyCode, state: ElementState, repeat: bool) -> RawKeyEvent {
        RawKeyEvent { key, state, repeat }
    }

    #[test]
    fn test_initial_state_no_keys_pressed() {
        let kb = KeyboardState::new();
        for key in [KeyCode::Digit1, KeyCode::ArrowUp, KeyCode::KeyC] {
            assert!(!kb.is_pressed(key));
            assert!(!kb.just_pressed(key));
            assert!(!kb.just_released(key));
        }
        assert!(!kb.shift_held());
    }

    #[test]
    fn test_press_then_release() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::ArrowUp, ElementState::Pressed, false));
        assert!(kb.is_pressed(KeyCode::ArrowUp));
        assert!(kb.just_pressed(KeyCode::ArrowUp));

        kb.clear_transients();
        kb.process_raw(raw(KeyCode::ArrowUp, ElementState::Released, false));
        assert!(!kb.is_pressed(KeyCode::ArrowUp));
        assert!(kb.just_released(KeyCode::ArrowUp));
        assert!(!kb.just_pressed(KeyCode::ArrowUp));
    }

    #[test]
    fn test_repeat_reported_separately() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::ArrowDown, ElementState::Pressed, false));
        kb.clear_transients();
        kb.process_raw(raw(KeyCode::ArrowDown, ElementState::Pressed, true));
        assert!(kb.repeated(KeyCode::ArrowDown));
        assert!(!kb.just_pressed(KeyCode::ArrowDown));
        kb.clear_transients();
        assert!(!kb.repeated(KeyCode::ArrowDown));
        assert!(kb.is_pressed(KeyCode::ArrowDown));
    }

    #[test]
    fn test_either_shift_counts() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::ShiftRight, ElementState::Pressed, false));
        assert!(kb.shift_held());
        kb.process_raw(raw(KeyCode::ShiftRight, ElementState::Released, false));
        assert!(!kb.shift_held());
    }

    #[test]
    fn test_release_all_reports_releases() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::ArrowUp, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::ShiftLeft, ElementState::Pressed, false));
        kb.clear_transients();

        kb.release_all();
        assert!(!kb.is_pressed(KeyCode::ArrowUp));
        assert!(kb.just_released(KeyCode::ArrowUp));
        assert!(kb.just_released(KeyCode::ShiftLeft));
    }
}
