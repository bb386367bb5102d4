//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Galaxy viewer command-line arguments.
///
/// Values given here win over `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "galaxy", about = "Interactive spiral galaxy generator")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Number of particles in the first galaxy.
    #[arg(long)]
    pub particle_count: Option<u32>,

    /// Number of spiral arms in the first galaxy.
    #[arg(long)]
    pub branches: Option<u32>,

    /// Port for the parameter panel HTTP API (0 = any free port).
    #[arg(long)]
    pub panel_port: Option<u16>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to the config directory and exit.
    #[arg(long)]
    pub write_config: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(count) = args.particle_count {
            self.galaxy.particle_count = count;
        }
        if let Some(branches) = args.branches {
            self.galaxy.branches = branches;
        }
        if let Some(port) = args.panel_port {
            self.panel.port = port;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            particle_count: Some(5_000),
            branches: Some(7),
            panel_port: Some(0),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.galaxy.particle_count, 5_000);
        assert_eq!(config.galaxy.branches, 7);
        assert_eq!(config.panel.port, 0);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.galaxy.radius, 5.0);
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from([
            "galaxy",
            "--particle-count",
            "2500",
            "--fullscreen",
            "true",
            "--log-level",
            "debug",
            "--write-config",
        ]);
        assert_eq!(args.particle_count, Some(2500));
        assert_eq!(args.fullscreen, Some(true));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.write_config);
        assert!(args.config.is_none());
    }
}
