//! `galaxy`: an interactive spiral galaxy viewer.
//!
//! Configuration is read from `config.ron` in the platform config directory
//! and can be overridden on the command line:
//!
//! ```text
//! galaxy --particle-count 200000 --branches 5 --panel-port 0
//! galaxy --write-config
//! ```

use clap::Parser;
use galaxy_app::{PlatformDirs, run_with_config};
use galaxy_config::{CliArgs, Config};
use tracing::{error, info, warn};

fn main() {
    let args = CliArgs::parse();

    let dirs = match args.config.clone() {
        Some(dir) => PlatformDirs::from_config_dir(dir),
        None => match PlatformDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("Failed to resolve platform directories: {e}");
                std::process::exit(1);
            }
        },
    };

    // Logging needs the config, so these failures are reported after init.
    let dirs_error = dirs.create_dirs().err();
    let (mut config, load_error) = match Config::load_or_default(&dirs.config_dir) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    config.apply_cli_overrides(&args);

    galaxy_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    if let Some(e) = dirs_error {
        warn!("Failed to create {}: {e}", dirs.config_dir().display());
    }
    if let Some(e) = load_error {
        warn!("Failed to load config: {e}, using defaults");
    }

    if args.write_config {
        match config.save(&dirs.config_dir) {
            Ok(path) => info!("Configuration written to {}", path.display()),
            Err(e) => {
                error!("Failed to write config: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    info!(
        "Starting galaxy viewer: {}x{}, {} particles, {} branches",
        config.window.width,
        config.window.height,
        config.galaxy.particle_count,
        config.galaxy.branches
    );

    if let Err(e) = run_with_config(config) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
