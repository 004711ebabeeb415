//! Cross-platform application paths

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DaemonError;

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self, DaemonError> {
        let base = dirs::config_dir().ok_or(DaemonError::NoConfigDir)?;
        Self::at(base.join("genesis"))
    }

    /// Rooted at an explicit directory, created if missing.
    pub fn at(config_dir: PathBuf) -> Result<Self, DaemonError> {
        fs::create_dir_all(&config_dir)?;
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("genesisd.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_lives_in_config_dir() {
        let dir = std::env::temp_dir().join(format!("genesisd-paths-{}", std::process::id()));
        let paths = AppPaths::at(dir.clone()).unwrap();
        assert!(dir.is_dir());
        assert_eq!(paths.config_dir(), dir.as_path());
        assert_eq!(paths.config_file(), dir.join("genesisd.json"));
        let _ = fs::remove_dir_all(&dir);
    }
}
