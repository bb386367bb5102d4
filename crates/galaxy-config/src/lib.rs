//! Runtime configuration for the galaxy viewer.
//!
//! Settings live in an optional `config.ron` that is read once at startup.
//! Every section is `#[serde(default)]`, so partial or older files still load,
//! and command-line flags override whatever the file says.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, CameraConfig, Config, DebugConfig, PanelConfig, RenderConfig, WindowConfig,
};
pub use error::ConfigError;
