//! User settings for the pantry backup tools
//!
//! Manages which backup destinations are enabled, where local dumps and error
//! logs go, the remote object-storage endpoint, and key derivation costs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::PantryPaths;
use crate::crypto::KeyDerivationParams;
use crate::error::PantryError;

/// Environment variable overriding the remote access token
pub const REMOTE_TOKEN_ENV: &str = "PANTRY_BACKUP_REMOTE_TOKEN";

/// Local (or network share) backup destination
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalBackupSettings {
    /// Whether dumps are kept on the local filesystem
    #[serde(default)]
    pub enabled: bool,

    /// Directory the dumps are written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Remote object-storage destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteBackupSettings {
    /// Whether dumps are uploaded
    #[serde(default)]
    pub enabled: bool,

    /// Base URL objects are PUT under (`<endpoint>/<file name>`)
    #[serde(default)]
    pub endpoint: String,

    /// Bearer token for the storage service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for RemoteBackupSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            access_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteBackupSettings {
    /// Access token, preferring the environment override
    pub fn resolved_token(&self) -> Option<String> {
        std::env::var(REMOTE_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.access_token.clone())
    }
}

/// User settings for the pantry backup tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Local backup destination
    #[serde(default)]
    pub local_backup: LocalBackupSettings,

    /// Remote backup destination
    #[serde(default)]
    pub remote_backup: RemoteBackupSettings,

    /// Directory for diagnostic logs (falls back to `<base>/errors`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log_directory: Option<PathBuf>,

    /// Argon2 costs shared by backup and restore
    #[serde(default)]
    pub key_derivation: KeyDerivationParams,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            local_backup: LocalBackupSettings::default(),
            remote_backup: RemoteBackupSettings::default(),
            error_log_directory: None,
            key_derivation: KeyDerivationParams::default(),
        }
    }
}

impl Settings {
    /// Settings for a fresh install: local backups under `<base>/backups`
    pub fn initial(paths: &PantryPaths) -> Self {
        Self {
            local_backup: LocalBackupSettings {
                enabled: true,
                directory: Some(paths.default_backup_dir()),
            },
            ..Default::default()
        }
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &PantryPaths) -> Result<Self, PantryError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| PantryError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                PantryError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::initial(paths))
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &PantryPaths) -> Result<(), PantryError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| PantryError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| PantryError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Check that at least one destination is configured coherently
    pub fn validate(&self) -> Result<(), PantryError> {
        if !self.local_backup.enabled && !self.remote_backup.enabled {
            return Err(PantryError::Config(
                "Neither local nor remote backup is enabled".into(),
            ));
        }
        if self.local_backup.enabled && self.local_backup.directory.is_none() {
            return Err(PantryError::Config(
                "Local backup is enabled but no directory is configured".into(),
            ));
        }
        if self.remote_backup.enabled && self.remote_backup.endpoint.trim().is_empty() {
            return Err(PantryError::Config(
                "Remote backup is enabled but no endpoint is configured".into(),
            ));
        }
        Ok(())
    }
}
