//! Remote object storage for finished dump files
//!
//! A dump is pushed under its own file name. Two stores are provided:
//!
//! - `HttpObjectStore`: `PUT <endpoint>/<file name>` against an HTTP object
//!   store, with an optional bearer token
//! - `DirectoryStore`: copies into a directory, typically a folder kept in
//!   sync by a cloud storage client (`file://` endpoints)
//!
//! Both set themselves up lazily on the first upload and reuse that setup for
//! the rest of the run. Failed uploads are not retried.

mod directory;
mod http;

pub use directory::DirectoryStore;
pub use http::HttpObjectStore;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::settings::RemoteBackupSettings;
use crate::error::{PantryError, PantryResult};

/// Destination a completed dump file is uploaded to
pub trait RemoteStore: Send {
    /// Upload the file under its own name
    fn upload(&mut self, path: &Path) -> PantryResult<()>;
}

impl<R: RemoteStore + ?Sized> RemoteStore for Box<R> {
    fn upload(&mut self, path: &Path) -> PantryResult<()> {
        (**self).upload(path)
    }
}

/// Build the store described by the remote settings
pub fn from_settings(settings: &RemoteBackupSettings) -> PantryResult<Box<dyn RemoteStore>> {
    let endpoint = settings.endpoint.trim();
    if endpoint.is_empty() {
        return Err(PantryError::Config(
            "Remote backup is enabled but no endpoint is configured".into(),
        ));
    }

    if let Some(dir) = endpoint.strip_prefix("file://") {
        return Ok(Box::new(DirectoryStore::new(PathBuf::from(dir))));
    }

    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return Ok(Box::new(HttpObjectStore::new(
            endpoint,
            settings.resolved_token(),
            Duration::from_secs(settings.timeout_secs),
        )));
    }

    Err(PantryError::Config(format!(
        "Unsupported remote endpoint '{}': expected http://, https:// or file://",
        endpoint
    )))
}

/// File name component of an upload, as a string
pub(crate) fn object_name(path: &Path) -> PantryResult<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| PantryError::upload(path.display().to_string(), "path has no file name"))
}
