//! Runtime configuration and data directory resolution

use crate::error::{MushafError, Result};
use crate::sources::ApiEndpoints;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DB_FILE_NAME: &str = "mushaf.db";
pub const CONFIG_FILE_NAME: &str = "mushaf.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides the resolved data directory when set.
    pub data_dir: Option<PathBuf>,
    pub api: ApiEndpoints,
    pub request_timeout_secs: u64,
    /// Pause between chapters during ingestion.
    pub request_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            api: ApiEndpoints::default(),
            request_timeout_secs: 30,
            request_delay_ms: 500,
        }
    }
}

impl Config {
    /// Load from a JSON file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| MushafError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| MushafError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(get_data_dir)
    }
}

/// Default data directory: a dev-tree `data/` holding a database, then the
/// platform data dir, then `./data`.
pub fn get_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        let dev_paths = [PathBuf::from("data"), PathBuf::from("../data")];
        for path in &dev_paths {
            if path.join(DB_FILE_NAME).exists() {
                return path.canonicalize().unwrap_or_else(|_| path.clone());
            }
        }
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("Mushaf");
    }

    PathBuf::from("data")
}
