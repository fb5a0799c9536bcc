//! Password acquisition
//!
//! Backup asks twice and requires both entries to match; restore asks once
//! per attempt. Both loop until they get an acceptable entry or the operator
//! cancels.

use crate::crypto::SecureString;
use crate::error::{PantryError, PantryResult};

/// Source of operator-typed passwords
pub trait PasswordProvider {
    /// Ask for one password entry; `None` means the operator cancelled
    fn prompt(&mut self, prompt: &str) -> PantryResult<Option<SecureString>>;

    /// Tell the operator why the last entry was rejected
    fn reject(&mut self, reason: &str);
}

impl<P: PasswordProvider + ?Sized> PasswordProvider for Box<P> {
    fn prompt(&mut self, prompt: &str) -> PantryResult<Option<SecureString>> {
        (**self).prompt(prompt)
    }

    fn reject(&mut self, reason: &str) {
        (**self).reject(reason)
    }
}

/// Ask for a single non-empty password
pub fn acquire_password(
    provider: &mut dyn PasswordProvider,
    prompt: &str,
) -> PantryResult<SecureString> {
    loop {
        let Some(password) = provider.prompt(prompt)? else {
            return Err(PantryError::PasswordCancelled);
        };
        if password.is_empty() {
            provider.reject("Password cannot be empty.");
            continue;
        }
        return Ok(password);
    }
}

/// Ask for a password and its confirmation until both entries match
pub fn acquire_confirmed_password(provider: &mut dyn PasswordProvider) -> PantryResult<SecureString> {
    loop {
        let first = acquire_password(provider, "Enter encryption password: ")?;
        let Some(second) = provider.prompt("Re-enter encryption password: ")? else {
            return Err(PantryError::PasswordCancelled);
        };

        if first.matches(&second) {
            return Ok(first);
        }
        provider.reject(&PantryError::PasswordMismatch.to_string());
    }
}
