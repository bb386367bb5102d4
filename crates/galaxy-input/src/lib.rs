//! Pointer and keyboard input, plus the damped orbit controller that turns
//! mouse drags into camera motion.

pub mod cursor;
pub mod keyboard;
pub mod mouse;
pub mod orbit;

pub use cursor::NormalizedCursor;
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::{DragMode, MouseState};
pub use orbit::{CameraPose, OrbitControls, OrbitSettings};
