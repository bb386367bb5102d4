//! Platform directories for config and logs.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("could not determine OS configuration directory")]
    NoConfigDir,

    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// OS-specific directories used by the viewer.
///
/// Resolves to the platform convention: XDG on Linux, Known Folders on
/// Windows, `Library` on macOS.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Log files written in debug builds.
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "galaxy";

impl PlatformDirs {
    /// Resolves the directories without creating them.
    pub fn resolve() -> Result<Self, PlatformError> {
        let base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        Ok(Self::from_config_dir(base.join(APP_NAME)))
    }

    /// Directories rooted at an explicit config directory, as given by
    /// `--config`.
    pub fn from_config_dir(config_dir: PathBuf) -> Self {
        let log_dir = config_dir.join("logs");
        Self {
            config_dir,
            log_dir,
        }
    }

    /// Creates every directory on disk.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_absolute() {
        let Ok(dirs) = PlatformDirs::resolve() else {
            // Headless CI images may not expose a config dir.
            return;
        };
        assert!(dirs.config_dir.is_absolute());
        assert!(dirs.config_dir.ends_with(APP_NAME));
        assert!(dirs.log_dir.starts_with(&dirs.config_dir));
    }

    #[test]
    fn test_from_config_dir() {
        let dirs = PlatformDirs::from_config_dir(PathBuf::from("custom"));
        assert_eq!(dirs.config_dir(), Path::new("custom"));
        assert_eq!(dirs.log_dir, Path::new("custom").join("logs"));
    }

    #[test]
    fn test_create_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::from_config_dir(tmp.path().join(APP_NAME));
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }
}
