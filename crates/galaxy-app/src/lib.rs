//! Galaxy viewer application: window, event handling and the render loop.

pub mod platform;
pub mod render_loop;
pub mod window;

pub use platform::{PlatformDirs, PlatformError};
pub use render_loop::{LoopState, RenderLoop};
pub use window::{AppState, run_with_config, window_attributes_from_config};
