//! Keyboard front end for the panel.
//!
//! | Key         | Effect                                          |
//! |-------------|-------------------------------------------------|
//! | `1`..`7`    | select particle count .. randomness power      |
//! | `↑` / `↓`   | nudge the selected field one step (Shift: ×10) |
//! | release `↑`/`↓` | commit                                       |
//! | `C`         | log the control table                           |

use galaxy_input::KeyboardState;
use winit::keyboard::KeyCode;

use crate::controls::ParamField;
use crate::panel::ParameterPanel;

const DIGITS: [KeyCode; 7] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
];

/// What a frame's key presses did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HotkeyOutcome {
    pub selected: Option<ParamField>,
    /// New value of the selected field after nudging.
    pub nudged: Option<f64>,
    pub committed: bool,
    pub printed_table: bool,
}

/// Tracks which field the arrow keys edit.
#[derive(Debug, Clone)]
pub struct Hotkeys {
    selected: ParamField,
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self {
            selected: ParamField::ParticleCount,
        }
    }
}

impl Hotkeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> ParamField {
        self.selected
    }

    /// Applies this frame's keyboard transitions to `panel`.
    pub fn process(&mut self, keyboard: &KeyboardState, panel: &mut ParameterPanel) -> HotkeyOutcome {
        let mut outcome = HotkeyOutcome::default();

        for (key, field) in DIGITS.into_iter().zip(ParamField::NUMERIC) {
            if keyboard.just_pressed(key) {
                self.selected = field;
                outcome.selected = Some(field);
                tracing::info!("Selected {field}");
            }
        }

        let magnitude = if keyboard.shift_held() { 10 } else { 1 };
        let fired = |key| keyboard.just_pressed(key) || keyboard.repeated(key);
        let steps = match (fired(KeyCode::ArrowUp), fired(KeyCode::ArrowDown)) {
            (true, false) => magnitude,
            (false, true) => -magnitude,
            _ => 0,
        };
        if steps != 0 {
            outcome.nudged = panel.nudge(self.selected, steps);
            if let Some(value) = outcome.nudged {
                tracing::debug!("{} -> {value}", self.selected);
            }
        }

        if keyboard.just_released(KeyCode::ArrowUp) || keyboard.just_released(KeyCode::ArrowDown) {
            panel.commit();
            outcome.committed = true;
        }

        if keyboard.just_pressed(KeyCode::KeyC) {
            tracing::info!("Galaxy parameters:\n{}", panel.format_table());
            outcome.printed_table = true;
        }

        outcome
    }
}
