//! Configuration module for the pantry backup tools
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Destination and key derivation settings

pub mod paths;
pub mod settings;

pub use paths::PantryPaths;
pub use settings::{LocalBackupSettings, RemoteBackupSettings, Settings};
