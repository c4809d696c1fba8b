//! Configuration Management
//!
//! Persistent defaults for gcput, read from `<config dir>/gcput/config.json`.
//! Command-line flags always win over the file.

use crate::command::instance::{DeleteOptions, DiskSelector};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Default `--delete-disks` selector for instance delete commands
    #[serde(default)]
    pub delete_disk_type: Option<DiskSelector>,
    /// Default `--keep-disks` selector for instance delete commands
    #[serde(default)]
    pub keep_disk_type: Option<DiskSelector>,
    /// Emit `--network-interface` flags for instances
    #[serde(default)]
    pub network_interfaces: bool,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gcput").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from a specific file; defaults when missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Get effective delete options (CLI > config)
    pub fn effective_delete_options(
        &self,
        delete_disks: Option<DiskSelector>,
        keep_disks: Option<DiskSelector>,
    ) -> DeleteOptions {
        DeleteOptions {
            delete_disks: delete_disks.or(self.delete_disk_type),
            keep_disks: keep_disks.or(self.keep_disk_type),
        }
    }

    /// Get effective network interface rendering (CLI > config)
    pub fn effective_network_interfaces(&self, cli: bool) -> bool {
        cli || self.network_interfaces
    }
}
