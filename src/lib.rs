//! pantry-backup - Encrypted backup and restore for the food pantry dataset
//!
//! This library snapshots the pantry's clients, appointments and household
//! members into password-encrypted dump files, optionally uploads them to a
//! remote object store, and restores a dump back to plaintext given the
//! password it was made with.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Records and their `INSERT` statement form
//! - `storage`: Record source and JSON file helpers
//! - `crypto`: Key derivation and per-line encryption
//! - `backup`: Backup orchestration and dump files
//! - `remote`: Remote object storage
//! - `restore`: Restore sessions
//! - `operator`: Password, progress and cancellation seams
//! - `diagnostics`: Append-only diagnostic log
//! - `cli`: Terminal front ends
//!
//! # Example
//!
//! ```rust,ignore
//! use pantry_backup::config::{paths::PantryPaths, settings::Settings};
//!
//! let paths = PantryPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod operator;
pub mod remote;
pub mod restore;
pub mod storage;

pub use error::PantryError;
