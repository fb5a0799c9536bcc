//! Upload by copying into a (cloud-synced) directory

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PantryError, PantryResult};

use super::{object_name, RemoteStore};

/// Store that copies dumps into a target directory
#[derive(Debug)]
pub struct DirectoryStore {
    target: PathBuf,
    ready: bool,
}

impl DirectoryStore {
    /// Create a store for the given directory; nothing is touched until the first upload
    pub fn new(target: PathBuf) -> Self {
        Self {
            target,
            ready: false,
        }
    }

    /// Whether the target directory has been prepared
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    fn prepare(&mut self, name: &str) -> PantryResult<()> {
        if self.ready {
            return Ok(());
        }
        fs::create_dir_all(&self.target).map_err(|e| {
            PantryError::upload(
                name,
                format!("cannot reach {}: {}", self.target.display(), e),
            )
        })?;
        self.ready = true;
        Ok(())
    }
}

impl RemoteStore for DirectoryStore {
    fn upload(&mut self, path: &Path) -> PantryResult<()> {
        let name = object_name(path)?;
        self.prepare(&name)?;

        let destination = self.target.join(&name);
        let temp = self.target.join(format!("{}.part", name));
        fs::copy(path, &temp).map_err(|e| PantryError::upload(&name, e.to_string()))?;
        fs::rename(&temp, &destination).map_err(|e| {
            let _ = fs::remove_file(&temp);
            PantryError::upload(&name, e.to_string())
        })?;

        Ok(())
    }
}
