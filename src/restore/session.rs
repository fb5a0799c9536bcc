//! One restore of one dump file

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::crypto::{line_params, LineCipher, SecureString};
use crate::error::{PantryError, PantryResult};

/// An open dump file and the password attempts made against it
///
/// The input is read once on open; every attempt decrypts the same lines.
/// Key derivation costs come from each line, never from local settings.
#[derive(Debug)]
pub struct RestoreSession {
    id: Uuid,
    input_path: PathBuf,
    /// Non-blank lines with their 1-based line numbers in the file
    lines: Vec<(usize, String)>,
    attempts: u32,
}

impl RestoreSession {
    /// Open an encrypted dump file
    pub fn open(path: impl AsRef<Path>) -> PantryResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| PantryError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

        let lines = bytes
            .split(|b| *b == b'\n')
            .enumerate()
            .map(|(idx, raw)| (idx + 1, String::from_utf8_lossy(raw).trim().to_string()))
            .filter(|(_, line)| !line.is_empty())
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            input_path: path.to_path_buf(),
            lines,
            attempts: 0,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Number of encrypted lines in the input
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Password attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Decrypt every line with the given password
    ///
    /// Fails on the first line that does not authenticate; nothing decrypted
    /// by a failed attempt is kept.
    pub fn attempt(&mut self, password: &SecureString) -> PantryResult<Vec<String>> {
        self.attempts += 1;

        // one cipher per distinct set of costs found in the file
        let mut ciphers: Vec<LineCipher> = Vec::new();
        let mut plaintext = Vec::with_capacity(self.lines.len());

        for (number, line) in &self.lines {
            let failure = || PantryError::Decryption { line: *number };
            let params = line_params(line).map_err(|_| failure())?;

            let index = match ciphers.iter().position(|c| *c.params() == params) {
                Some(index) => index,
                None => {
                    let cipher =
                        LineCipher::derive(password.as_str(), &params).map_err(|_| failure())?;
                    ciphers.push(cipher);
                    ciphers.len() - 1
                }
            };

            plaintext.push(ciphers[index].decrypt_line(line).map_err(|_| failure())?);
        }

        Ok(plaintext)
    }
}
