//! AES-256-GCM line encryption
//!
//! Each dump line is encrypted on its own so that restore can detect a wrong
//! password at line granularity. A line is stored as
//! `v1$<memory>$<time>$<parallelism>$base64(nonce || ciphertext || tag)` and
//! never contains a newline. The Argon2 costs travel with every line, so a
//! dump opens with its password regardless of the reader's settings.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use crate::error::{PantryError, PantryResult};

use super::{derive_key, DerivedKey, KeyDerivationParams};

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
const TAG_SIZE: usize = 16;

/// Format tag at the start of every stored line
const LINE_VERSION: &str = "v1";

/// Largest memory cost accepted from a line header (4 GiB)
const MAX_MEMORY_COST: u32 = 1 << 22;

/// A line could not be authenticated or decoded under this cipher
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("line failed authentication")]
pub struct DecryptionFailure;

/// Cipher context derived once from a password and reused for every line
pub struct LineCipher {
    key: DerivedKey,
    params: KeyDerivationParams,
}

impl LineCipher {
    /// Derive a cipher context from a password
    pub fn derive(password: &str, params: &KeyDerivationParams) -> PantryResult<Self> {
        Ok(Self {
            key: derive_key(password, params)?,
            params: *params,
        })
    }

    /// Costs the key was derived with
    pub fn params(&self) -> &KeyDerivationParams {
        &self.params
    }

    fn cipher(&self) -> PantryResult<Aes256Gcm> {
        Aes256Gcm::new_from_slice(self.key.as_bytes())
            .map_err(|e| PantryError::Encryption(format!("Failed to create cipher: {}", e)))
    }

    /// Encrypt one plaintext line
    ///
    /// Generates a random nonce for each line, so equal plaintexts produce
    /// different ciphertexts that decrypt to the same text.
    pub fn encrypt_line(&self, plaintext: &str) -> PantryResult<String> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| PantryError::Encryption(format!("Encryption failed: {}", e)))?;

        let mut packed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        packed.extend_from_slice(&nonce_bytes);
        packed.extend_from_slice(&ciphertext);
        Ok(format!(
            "{}${}${}${}${}",
            LINE_VERSION,
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            STANDARD.encode(packed)
        ))
    }

    /// Decrypt one stored line
    ///
    /// A line written under different costs fails; use [`line_params`] to
    /// pick the matching cipher first.
    pub fn decrypt_line(&self, line: &str) -> Result<String, DecryptionFailure> {
        let (params, body) = split_line(line)?;
        if params != self.params {
            return Err(DecryptionFailure);
        }

        let packed = STANDARD.decode(body).map_err(|_| DecryptionFailure)?;
        if packed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(DecryptionFailure);
        }

        let (nonce_bytes, ciphertext) = packed.split_at(NONCE_SIZE);
        let cipher = self.cipher().map_err(|_| DecryptionFailure)?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| DecryptionFailure)?;

        String::from_utf8(plaintext).map_err(|_| DecryptionFailure)
    }
}

impl std::fmt::Debug for LineCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineCipher")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Key derivation costs recorded in a stored line's header
pub fn line_params(line: &str) -> Result<KeyDerivationParams, DecryptionFailure> {
    split_line(line).map(|(params, _)| params)
}

fn split_line(line: &str) -> Result<(KeyDerivationParams, &str), DecryptionFailure> {
    let mut parts = line.trim().splitn(5, '$');
    if parts.next() != Some(LINE_VERSION) {
        return Err(DecryptionFailure);
    }

    let mut cost = || -> Result<u32, DecryptionFailure> {
        parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or(DecryptionFailure)
    };
    let memory_cost = cost()?;
    let time_cost = cost()?;
    let parallelism = cost()?;
    if memory_cost > MAX_MEMORY_COST {
        return Err(DecryptionFailure);
    }

    let body = parts.next().ok_or(DecryptionFailure)?;
    Ok((
        KeyDerivationParams::with_costs(memory_cost, time_cost, parallelism),
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher(password: &str) -> LineCipher {
        LineCipher::derive(password, &KeyDerivationParams::with_costs(64, 1, 1)).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = test_cipher("Secret1");
        let line = "INSERT INTO `t` (`a`) VALUES (1);\n";

        let encrypted = cipher.encrypt_line(line).unwrap();
        assert!(!encrypted.contains('\n'));
        assert_eq!(cipher.decrypt_line(&encrypted).unwrap(), line);
    }

    #[test]
    fn test_contexts_from_same_password_are_interchangeable() {
        let writer = test_cipher("Secret1");
        let reader = test_cipher("Secret1");

        let encrypted = writer.encrypt_line("hello;\n").unwrap();
        assert_eq!(reader.decrypt_line(&encrypted).unwrap(), "hello;\n");
    }

    #[test]
    fn test_different_nonces() {
        let cipher = test_cipher("Secret1");

        let encrypted1 = cipher.encrypt_line("same").unwrap();
        let encrypted2 = cipher.encrypt_line("same").unwrap();
        assert_ne!(encrypted1, encrypted2);
    }

    #[test]
    fn test_wrong_password_fails() {
        let cipher = test_cipher("Secret1");
        let wrong = test_cipher("wrong");

        for i in 0..25 {
            let encrypted = cipher.encrypt_line(&format!("line {};\n", i)).unwrap();
            assert_eq!(wrong.decrypt_line(&encrypted), Err(DecryptionFailure));
        }
    }

    #[test]
    fn test_tampered_line_fails() {
        let cipher = test_cipher("Secret1");
        let encrypted = cipher.encrypt_line("Hello, World!").unwrap();

        let (header, body) = encrypted.rsplit_once('$').unwrap();
        let mut packed = STANDARD.decode(body).unwrap();
        let last = packed.len() - 1;
        packed[last] ^= 0xFF;
        let tampered = format!("{}${}", header, STANDARD.encode(packed));

        assert!(cipher.decrypt_line(&tampered).is_err());
    }

    #[test]
    fn test_garbage_input_fails() {
        let cipher = test_cipher("Secret1");
        assert!(cipher.decrypt_line("not base64 at all!").is_err());
        assert!(cipher.decrypt_line("").is_err());
        assert!(cipher.decrypt_line(&STANDARD.encode([0u8; 8])).is_err());
        assert!(cipher
            .decrypt_line(&format!("v1$64$1$1${}", STANDARD.encode([0u8; 8])))
            .is_err());
    }

    #[test]
    fn test_line_carries_costs() {
        let cipher = test_cipher("Secret1");
        let encrypted = cipher.encrypt_line("x;\n").unwrap();

        assert!(encrypted.starts_with("v1$64$1$1$"));
        assert_eq!(
            line_params(&encrypted).unwrap(),
            KeyDerivationParams::with_costs(64, 1, 1)
        );
    }

    #[test]
    fn test_cipher_with_other_costs_rejects_line() {
        let writer = test_cipher("Secret1");
        let reader =
            LineCipher::derive("Secret1", &KeyDerivationParams::with_costs(128, 1, 1)).unwrap();

        let encrypted = writer.encrypt_line("x;\n").unwrap();
        assert_eq!(reader.decrypt_line(&encrypted), Err(DecryptionFailure));
    }

    #[test]
    fn test_malformed_headers() {
        assert!(line_params("v2$64$1$1$AAAA").is_err());
        assert!(line_params("v1$64$x$1$AAAA").is_err());
        assert!(line_params("v1$64$1$1").is_err());
        assert!(line_params(&format!("v1${}$1$1$AAAA", u32::MAX)).is_err());
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = test_cipher("Secret1");
        let encrypted = cipher.encrypt_line("").unwrap();
        assert_eq!(cipher.decrypt_line(&encrypted).unwrap(), "");
    }
}
