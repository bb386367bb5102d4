//! Configuration sections, their defaults, and RON persistence.

use std::path::{Path, PathBuf};

use galaxy_generator::GalaxyParameters;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name looked up inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub camera: CameraConfig,
    /// Parameters used for the first generated galaxy.
    pub galaxy: GalaxyParameters,
    pub panel: PanelConfig,
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Present with `PresentMode::Fifo` when set. Otherwise the first of
    /// `Mailbox` and `Immediate` the surface supports, else `Fifo`.
    pub vsync: bool,
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Upper bound on the device pixel ratio used for the render size.
    pub max_pixel_ratio: f64,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Clear color as linear RGB.
    pub clear_color: [f64; 3],
}

/// Orbit camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting eye position; the camera looks at the origin.
    pub position: [f32; 3],
    /// Fraction of the pending motion applied per frame. Zero disables damping.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

/// Parameter panel configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    /// Serve the HTTP control API.
    pub enabled: bool,
    /// Port on 127.0.0.1; 0 lets the OS pick one.
    pub port: u16,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Default log filter (e.g. "debug", "info,wgpu=warn").
    pub log_level: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Galaxy".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [3.0, 3.0, 3.0],
            damping_factor: 0.05,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.1,
            max_distance: 50.0,
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9797,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Path of the config file inside `config_dir`.
    pub fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE_NAME)
    }

    /// Loads `config.ron` from `config_dir`, or returns defaults when the
    /// file does not exist. Nothing is written.
    pub fn load_or_default(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(config_dir);
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_ron(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses a config from RON text.
    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(ConfigError::ParseError)
    }

    /// Pretty-printed RON for this config.
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)
    }

    /// Writes `config.ron` into `config_dir`, creating the directory if
    /// needed. Returns the written path.
    pub fn save(&self, config_dir: &Path) -> Result<PathBuf, ConfigError> {
        let path = Self::path_in(config_dir);
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::WriteError {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let serialized = self.to_ron()?;
        std::fs::write(&path, serialized).map_err(|source| ConfigError::WriteError {
            path: path.clone(),
            source,
        })?;
        log::info!("Wrote config to {}", path.display());
        Ok(path)
    }
}
