//! Application settings (database location, HTTP timeout, node registry).
//!
//! The settings file is `~/.config/spectra/settings.toml`. Every key is
//! optional:
//!
//! ```toml
//! database = "/data/catalog.db"
//! timeout_secs = 60
//! delete_archived = false
//! resolve_uuid = false
//!
//! [[nodes]]
//! identifier = "ivo://vamdc/cdms/vamdc-tap_12.07"
//! url = "https://cdms.astro.uni-koeln.de/cdms/tap/"
//! name = "CDMS"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spectra_node::{Node, StaticRegistry};

use crate::error::SyncError;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Catalogue database file. Defaults to the platform data directory.
    pub database: Option<PathBuf>,
    pub timeout_secs: u64,
    /// Delete species the node no longer offers instead of marking them
    /// `Outdated`.
    pub delete_archived: bool,
    /// Ask the VAMDC query store for the UUID of each request token.
    pub resolve_uuid: bool,
    /// Nodes in addition to (or replacing) the built-in CDMS and JPL nodes.
    pub nodes: Vec<Node>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delete_archived: false,
            resolve_uuid: false,
            nodes: Vec::new(),
        }
    }
}

/// Canonical path to the settings file: `~/.config/spectra/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("spectra").join("settings.toml")
}

/// Default catalogue location: `~/.local/share/spectra/catalog.db` on Linux.
pub fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("spectra").join("catalog.db")
}

impl Settings {
    /// Load the settings file, falling back to defaults when it is absent.
    pub fn load() -> Result<Self, SyncError> {
        Self::load_from(&settings_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, SyncError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| SyncError::Settings(format!("{}: {e}", path.display())))
    }

    /// Write the settings atomically.
    pub fn save_to(&self, path: &Path) -> Result<(), SyncError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized =
            toml::to_string_pretty(self).map_err(|e| SyncError::Settings(e.to_string()))?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Resolve the database path: CLI override, then the settings file, then
    /// the platform default.
    pub fn database_path(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.database.clone())
            .unwrap_or_else(default_database_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn registry(&self) -> StaticRegistry {
        StaticRegistry::with_defaults(self.nodes.clone())
    }
}
