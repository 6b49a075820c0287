//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the asset origin, the cache version marker, and the last
//! used login email.
//!
//! Configuration is stored at `~/.config/taskcache/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data/cache directory paths
const APP_NAME: &str = "taskcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Origin served by the app when none is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8080";

/// Cache version marker when none is configured. Bumping this starts a new
/// generation pair; the old pair is purged on activation.
pub const DEFAULT_CACHE_VERSION: &str = "v1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub origin: Option<String>,
    pub cache_version: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the user registry, session, and todo lists.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Root directory for cache generations.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn origin(&self) -> &str {
        self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN)
    }

    pub fn cache_version(&self) -> &str {
        self.cache_version.as_deref().unwrap_or(DEFAULT_CACHE_VERSION)
    }
}
