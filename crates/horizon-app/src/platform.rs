//! OS-specific directory resolution.
//!
//! Config and log locations follow platform conventions (XDG on Linux, Known
//! Folders on Windows, Library on macOS) through the `dirs` crate.

use std::path::{Path, PathBuf};

/// Errors that can occur while resolving or creating directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,

    #[error("platform I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Directories used by the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds the JSON log file in debug builds.
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "horizon";

impl PlatformDirs {
    /// Resolve platform-specific directories without creating them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let config_base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        Ok(Self::resolve_with_root(&config_base))
    }

    /// Resolve directories rooted under a custom base path.
    pub fn resolve_with_root(root: &Path) -> Self {
        Self::from_config_dir(root.join(APP_NAME))
    }

    /// Use an explicit config directory (the `--config` flag); logs go in a
    /// `logs` subdirectory.
    pub fn from_config_dir(config_dir: PathBuf) -> Self {
        let log_dir = config_dir.join("logs");
        Self {
            config_dir,
            log_dir,
        }
    }

    /// Create all directories on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] if any directory cannot be created.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_dirs_resolve() {
        let Ok(dirs) = PlatformDirs::resolve() else {
            // Headless CI images sometimes have no HOME.
            return;
        };
        assert!(dirs.config_dir.is_absolute(), "config_dir is not absolute");
        assert!(dirs.config_dir.ends_with(APP_NAME));
        assert!(dirs.log_dir.starts_with(&dirs.config_dir));
    }

    #[test]
    fn test_explicit_config_dir() {
        let dirs = PlatformDirs::from_config_dir(PathBuf::from("custom"));
        assert_eq!(dirs.config_dir, PathBuf::from("custom"));
        assert_eq!(dirs.log_dir, Path::new("custom").join("logs"));
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().expect("create_dirs failed for temp root");

        assert_eq!(dirs.config_dir, tmp.path().join("horizon"));
        assert!(dirs.config_dir.exists(), "config_dir was not created");
        assert!(dirs.log_dir.exists(), "log_dir was not created");
    }

    #[test]
    fn test_create_dirs_reports_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let dirs = PlatformDirs::from_config_dir(blocker);
        assert!(matches!(dirs.create_dirs(), Err(PlatformError::Io(_))));
    }
}
