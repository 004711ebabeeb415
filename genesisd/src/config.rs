use std::fs;
use std::path::Path;

use genesis::protocol::DEFAULT_ADDR;
use serde::{Deserialize, Serialize};

use crate::error::DaemonError;

/// Daemon settings. The evolution constants (tick interval, pool fraction,
/// population cap, clamps) are fixed and deliberately absent here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Arm the tick timer as soon as the daemon is up.
    #[serde(default)]
    pub autostart: bool,
    /// Generator seed; `None` seeds from the wall clock.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_listen_addr() -> String {
    DEFAULT_ADDR.to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            autostart: false,
            seed: None,
        }
    }
}

impl DaemonConfig {
    pub fn load(path: &Path) -> Result<Self, DaemonError> {
        let text = fs::read_to_string(path).map_err(|source| DaemonError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| DaemonError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults when the file does not exist; a present but broken file is
    /// still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, DaemonError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
