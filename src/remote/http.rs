//! Upload to an HTTP object store

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{PantryError, PantryResult};

use super::{object_name, RemoteStore};

/// Store that PUTs each dump to `<endpoint>/<file name>`
pub struct HttpObjectStore {
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
    /// Built on the first upload and reused afterwards
    client: Option<Client>,
}

impl HttpObjectStore {
    /// Create a store; no connection is made until the first upload
    pub fn new(endpoint: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            timeout,
            client: None,
        }
    }

    /// Whether the HTTP client has been set up
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// URL an object with this name is stored at
    pub fn object_url(&self, name: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), name)
    }

    fn client(&mut self, name: &str) -> PantryResult<&Client> {
        if self.client.is_none() {
            let client = Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| PantryError::upload(name, format!("failed to build HTTP client: {e}")))?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| PantryError::upload(name, "HTTP client unavailable"))
    }
}

impl std::fmt::Debug for HttpObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpObjectStore")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl RemoteStore for HttpObjectStore {
    fn upload(&mut self, path: &Path) -> PantryResult<()> {
        let name = object_name(path)?;
        let body = fs::read(path)
            .map_err(|e| PantryError::upload(&name, format!("failed to read {}: {e}", path.display())))?;
        let url = self.object_url(&name);
        let token = self.token.clone();

        let mut req = self.client(&name)?.put(url).body(body);
        if let Some(t) = token.as_deref() {
            req = req.bearer_auth(t);
        }

        let res = req
            .send()
            .map_err(|e| PantryError::upload(&name, format!("HTTP upload failed: {e}")))?;
        if res.status().is_success() {
            return Ok(());
        }
        Err(PantryError::upload(
            &name,
            format!("HTTP upload failed with status {}", res.status()),
        ))
    }
}
