//! Cryptographic functions for pantry backups
//!
//! Provides per-line AES-256-GCM encryption with Argon2id key derivation
//! for password-protected dump files.

pub mod key_derivation;
pub mod line_cipher;
pub mod secure_memory;

pub use key_derivation::{derive_key, DerivedKey, KeyDerivationParams};
pub use line_cipher::{line_params, DecryptionFailure, LineCipher};
pub use secure_memory::SecureString;
