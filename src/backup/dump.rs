//! Dump file naming and writing
//!
//! A dump holds one encrypted line per record. Files are written under a
//! temporary name and renamed once complete, so a dump is never visible under
//! its final name unless every line reached the disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::{PantryError, PantryResult};
use crate::models::Collection;

/// Extension of dump files
pub const DUMP_EXTENSION: &str = "sql";

/// A written dump for one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpFile {
    pub collection: Collection,
    /// `<timestamp>_<Tag>.sql`
    pub file_name: String,
    pub path: PathBuf,
    pub line_count: usize,
}

/// Build the file name for a dump taken at `timestamp`
///
/// The timestamp is rendered as `YYYY-MM-DD HH:MM:SS.mmm` with `:` replaced
/// by `.` and the space by `_`, so names sort chronologically.
pub fn dump_file_name(collection: Collection, timestamp: NaiveDateTime) -> String {
    let stamp = timestamp
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
        .replace(':', ".")
        .replace(' ', "_");
    format!("{}_{}.{}", stamp, collection.file_tag(), DUMP_EXTENSION)
}

/// Write encrypted lines to a new dump file in `dir`
///
/// Each line is followed by `\n`. The file is flushed, synced and closed
/// before this returns.
pub fn write_dump(
    dir: &Path,
    collection: Collection,
    timestamp: NaiveDateTime,
    lines: &[String],
) -> PantryResult<DumpFile> {
    let file_name = dump_file_name(collection, timestamp);
    let path = dir.join(&file_name);
    let temp_path = dir.join(format!("{}.tmp", file_name));

    if let Err(e) = write_lines(&temp_path, lines) {
        let _ = fs::remove_file(&temp_path);
        return Err(PantryError::dump_write(&path, e));
    }

    fs::rename(&temp_path, &path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        PantryError::dump_write(&path, e)
    })?;

    Ok(DumpFile {
        collection,
        file_name,
        path,
        line_count: lines.len(),
    })
}

fn write_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}
