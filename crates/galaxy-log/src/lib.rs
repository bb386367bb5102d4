//! Logging setup for the galaxy viewer.
//!
//! Console output goes through `tracing-subscriber` with uptime timestamps and
//! module targets. Debug builds additionally write JSON lines to
//! `galaxy.log` so a session can be inspected after the window closes. The
//! `log` records emitted by the library crates are picked up by the same
//! subscriber.

use galaxy_config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "galaxy.log";

/// Where the active filter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    /// `RUST_LOG`.
    Env,
    /// `config.debug.log_level`, or [`DEFAULT_FILTER`] when it is empty.
    Config,
    /// The configured directives did not parse.
    Fallback,
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.debug.log_level`, which wins over
/// [`DEFAULT_FILTER`]. When `debug_build` is set and `log_dir` can be
/// created, a JSON file layer is added next to the console layer.
///
/// ```no_run
/// use galaxy_config::Config;
/// use galaxy_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), cfg!(debug_assertions), Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let directives = filter_directives(config);
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (env_filter, source) = resolve_filter(rust_log.as_deref(), &directives);
    let active_filter = env_filter.to_string();

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let mut log_file_written = None;
    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_file_path(log_dir))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        log_file_written = Some(log_file_path(log_dir));
    } else {
        subscriber.init();
    }

    if source == FilterSource::Fallback {
        tracing::warn!("Invalid log level {directives:?} in config, using {DEFAULT_FILTER:?}");
    }
    tracing::debug!(filter = %active_filter, ?source, "Logging initialized");
    if let Some(path) = log_file_written {
        tracing::info!("Writing JSON log to {}", path.display());
    }
}

/// Picks the filter: a valid `rust_log` first, then `directives`, then
/// [`default_env_filter`].
pub fn resolve_filter(rust_log: Option<&str>, directives: &str) -> (EnvFilter, FilterSource) {
    if let Some(filter) = rust_log.and_then(|value| EnvFilter::try_new(value).ok()) {
        return (filter, FilterSource::Env);
    }
    match EnvFilter::try_new(directives) {
        Ok(filter) => (filter, FilterSource::Config),
        Err(_) => (default_env_filter(), FilterSource::Fallback),
    }
}

/// Filter directives derived from the config.
///
/// A bare level such as `"debug"` keeps the GPU crates at `warn`; anything
/// containing an explicit `target=level` directive is used verbatim.
pub fn filter_directives(config: Option<&Config>) -> String {
    let level = config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty());

    match level {
        None => DEFAULT_FILTER.to_string(),
        Some(level) if level.contains('=') => level.to_string(),
        Some(level) => format!("{level},wgpu=warn,naga=warn"),
    }
}

/// Where the JSON log file goes inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
