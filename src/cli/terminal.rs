//! Terminal implementations of the operator capabilities
//!
//! Passwords are read without echo, progress is drawn as a bar on stderr, and
//! the restore output path is read from stdin when it was not given as an
//! argument.

use std::io::{self, BufRead, ErrorKind, Write};
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use crate::backup::PROGRESS_MAX;
use crate::crypto::SecureString;
use crate::diagnostics::Severity;
use crate::error::{PantryError, PantryResult};
use crate::operator::{PasswordProvider, ProgressSink};
use crate::restore::OutputChooser;

/// Reads passwords from the terminal with echo disabled
///
/// An empty entry or end of input counts as cancellation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPasswordProvider;

impl TerminalPasswordProvider {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordProvider for TerminalPasswordProvider {
    fn prompt(&mut self, prompt: &str) -> PantryResult<Option<SecureString>> {
        match rpassword::prompt_password(prompt) {
            Ok(entry) if entry.is_empty() => Ok(None),
            Ok(entry) => Ok(Some(SecureString::new(entry))),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(PantryError::Io(format!("Failed to read password: {}", e))),
        }
    }

    fn reject(&mut self, reason: &str) {
        eprintln!("{}", reason);
    }
}

/// Progress bar over the 0..=170 backup scale
pub struct TerminalProgress {
    bar: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self { bar: None }
    }

    fn bar(&mut self) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(u64::from(PROGRESS_MAX));
            bar.set_style(progress_style());
            bar
        })
    }

    /// Remove the bar from the terminal
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        self.finish();
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{bar:32.cyan/blue}] {percent:>3}% {msg}")
        .map(|style| style.progress_chars("█▉▊▋▌▍▎▏ "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

impl ProgressSink for TerminalProgress {
    fn phase(&mut self, label: &str) {
        self.bar().set_message(label.to_string());
    }

    fn progress(&mut self, value: u32) {
        self.bar().set_position(u64::from(value));
    }

    fn notify(&mut self, severity: Severity, message: &str) {
        let line = match severity {
            Severity::Info => message.to_string(),
            Severity::Warning => format!("Warning: {}", message),
            Severity::Error => format!("Error: {}", message),
        };
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{}", line),
        }
    }
}

/// Asks for the output file name on stdin; an empty answer chooses nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptOutput;

impl OutputChooser for PromptOutput {
    fn choose_output(&mut self) -> PantryResult<Option<PathBuf>> {
        print!("Save restored data as: ");
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        let answer = answer.trim();

        if answer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(answer)))
        }
    }
}
