//! Choosing and writing the restored plaintext

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::backup::DUMP_EXTENSION;
use crate::error::{PantryError, PantryResult};

/// Asks the operator where restored data should go
pub trait OutputChooser {
    /// `None` means no file was chosen
    fn choose_output(&mut self) -> PantryResult<Option<PathBuf>>;
}

impl<C: OutputChooser + ?Sized> OutputChooser for Box<C> {
    fn choose_output(&mut self) -> PantryResult<Option<PathBuf>> {
        (**self).choose_output()
    }
}

/// A chooser that always answers with the same path
#[derive(Debug, Clone, Default)]
pub struct FixedOutput(pub Option<PathBuf>);

impl OutputChooser for FixedOutput {
    fn choose_output(&mut self) -> PantryResult<Option<PathBuf>> {
        Ok(self.0.clone())
    }
}

/// Append `.sql` unless the file name already ends with it
pub fn with_sql_extension(path: PathBuf) -> PathBuf {
    let suffix = format!(".{}", DUMP_EXTENSION);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if name.len() > suffix.len() && name.ends_with(&suffix) {
        return path;
    }

    let mut raw = path.into_os_string();
    raw.push(&suffix);
    PathBuf::from(raw)
}

/// Write the decrypted lines, concatenated as-is, to `path`
///
/// Refuses to create an empty file.
pub fn save_output(path: &Path, lines: &[String]) -> PantryResult<()> {
    if lines.iter().all(|line| line.is_empty()) {
        return Err(PantryError::EmptyOutput);
    }

    let temp_path = match path.file_name() {
        Some(name) => path.with_file_name(format!("{}.tmp", name.to_string_lossy())),
        None => return Err(PantryError::NoOutput),
    };

    let written = write_lines(&temp_path, lines).and_then(|_| fs::rename(&temp_path, path));
    written.map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        PantryError::Io(format!("Failed to write {}: {}", path.display(), e))
    })
}

fn write_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writer.write_all(line.as_bytes())?;
    }
    writer.flush()?;
    writer.get_ref().sync_all()
}
