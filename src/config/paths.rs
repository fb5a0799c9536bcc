//! Path management for the pantry backup tools
//!
//! Provides XDG-compliant path resolution for settings, record data, the
//! transient staging area and the fallback error log directory.
//!
//! ## Path Resolution Order
//!
//! 1. `PANTRY_BACKUP_HOME` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/pantry-backup` or `~/.config/pantry-backup`
//! 3. Windows: `%APPDATA%\pantry-backup`

use std::path::PathBuf;

use crate::error::PantryError;
use crate::models::Collection;

/// Environment variable overriding the base directory
pub const HOME_ENV: &str = "PANTRY_BACKUP_HOME";

/// Manages all paths used by the backup tools
#[derive(Debug, Clone)]
pub struct PantryPaths {
    /// Base directory for all pantry backup data
    base_dir: PathBuf,
}

impl PantryPaths {
    /// Create a new PantryPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, PantryError> {
        let base_dir = if let Ok(custom) = std::env::var(HOME_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create PantryPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/pantry-backup/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Get the record data directory (~/.config/pantry-backup/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the record file for a collection
    pub fn records_file(&self, collection: Collection) -> PathBuf {
        self.data_dir().join(collection.records_file_name())
    }

    /// Working directory for dumps that only exist to be uploaded
    pub fn staging_dir(&self) -> PathBuf {
        self.base_dir.join("staging")
    }

    /// Default local backup directory
    pub fn default_backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Fallback directory for diagnostic logs
    pub fn fallback_error_dir(&self) -> PathBuf {
        self.base_dir.join("errors")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), PantryError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| PantryError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| PantryError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if the tools have been initialized (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default base directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, PantryError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME")
                .map_err(|_| PantryError::Config("HOME environment variable not set".into()))?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("pantry-backup"))
}

/// Resolve the default base directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, PantryError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| PantryError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("pantry-backup"))
}
