//! Parameter panel for the galaxy viewer.
//!
//! The panel owns the live parameter set. It is edited from two front ends:
//! keyboard hotkeys handled on the event-loop thread, and a small HTTP API
//! served from a background thread. Both talk to the render loop through a
//! shared [`PanelState`] that the loop polls once per frame.

pub mod controls;
pub mod hotkeys;
pub mod panel;
pub mod server;

pub use controls::{Control, ControlRow, ParamField, ParamValue, Slider};
pub use hotkeys::{HotkeyOutcome, Hotkeys};
pub use panel::{PanelError, ParameterPanel, ParameterPatch};
pub use server::{PanelServer, PanelServerError};

#[cfg(test)]
mod tests;

/// Environment variable overriding the configured panel port.
pub const PANEL_PORT_ENV: &str = "GALAXY_PANEL_PORT";

/// Frame statistics published by the render loop.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FrameMetrics {
    pub frame_count: u64,
    pub frame_time_ms: f64,
    pub fps: f64,
    /// Swapchain size in physical pixels.
    pub surface_width: u32,
    pub surface_height: u32,
    /// Offscreen target size after the pixel-ratio cap.
    pub render_width: u32,
    pub render_height: u32,
    pub particle_count: usize,
    pub regeneration_count: u64,
    pub uptime_seconds: f64,
}

/// State shared between the render loop and the panel server.
#[derive(Debug, Default)]
pub struct PanelState {
    pub panel: ParameterPanel,
    pub metrics: FrameMetrics,
    pub quit_requested: bool,
}

impl PanelState {
    pub fn new(panel: ParameterPanel) -> Self {
        Self {
            panel,
            metrics: FrameMetrics::default(),
            quit_requested: false,
        }
    }
}

/// Creates an unstarted panel server bound to `port` once started.
pub fn create_panel_server(port: u16) -> PanelServer {
    PanelServer::new(port)
}

/// Reads the port from `GALAXY_PANEL_PORT`, falling back to `default`.
pub fn get_panel_port(default: u16) -> u16 {
    parse_port(std::env::var(PANEL_PORT_ENV).ok().as_deref()).unwrap_or(default)
}

fn parse_port(value: Option<&str>) -> Option<u16> {
    value.and_then(|s| s.trim().parse().ok())
}
