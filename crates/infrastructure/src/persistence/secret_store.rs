//! File-based secret store.
//!
//! Secrets live in a JSON file outside any collection, by default
//! `secrets.json` under the platform data directory:
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "secrets": {
//!     "httpiness": {
//!       "TOKEN_0b6f2c6e-4d3b-4a4e-9a55-2f1d3c4b5a69": "s3cr3t"
//!     }
//!   }
//! }
//! ```
//! The file should be readable by its owner only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use httpiness_application::ports::{FileSystem, FileSystemError, SecretStore, SecretsError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::serialization::{from_json, to_json_stable_bytes};

const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretsFile {
    schema_version: u32,
    #[serde(default)]
    secrets: BTreeMap<String, BTreeMap<String, String>>,
}

fn to_io_error(e: FileSystemError) -> std::io::Error {
    match e {
        FileSystemError::Io(io_err) => io_err,
        FileSystemError::NotFound(path) => {
            std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string())
        }
        FileSystemError::PermissionDenied(path) => std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            path.display().to_string(),
        ),
    }
}

/// Secret store backed by one JSON file.
///
/// Writes are serialized through an internal lock so concurrent updates
/// from one process do not lose entries.
#[derive(Debug)]
pub struct FileSecretStore<F> {
    fs: F,
    path: PathBuf,
    lock: Mutex<()>,
}

impl<F: FileSystem> FileSecretStore<F> {
    /// Creates a store over the file at `path`.
    pub fn new(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `secrets.json` in the httpiness data directory, if the platform has
    /// one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("httpiness").join("secrets.json"))
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<SecretsFile, SecretsError> {
        if !self.fs.exists(&self.path).await {
            return Ok(SecretsFile {
                schema_version: SCHEMA_VERSION,
                secrets: BTreeMap::new(),
            });
        }
        let content = self
            .fs
            .read_file_string(&self.path)
            .await
            .map_err(|e| SecretsError::Io(to_io_error(e)))?;
        from_json(&content).map_err(|e| SecretsError::Serialization(e.to_string()))
    }

    async fn store(&self, file: &SecretsFile) -> Result<(), SecretsError> {
        let content =
            to_json_stable_bytes(file).map_err(|e| SecretsError::Serialization(e.to_string()))?;
        self.fs
            .write_file(&self.path, &content)
            .await
            .map_err(|e| SecretsError::Io(to_io_error(e)))
    }
}

#[async_trait]
impl<F: FileSystem> SecretStore for FileSecretStore<F> {
    async fn set_secret(&self, service: &str, account: &str, value: &str) -> Result<(), SecretsError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        file.secrets
            .entry(service.to_string())
            .or_default()
            .insert(account.to_string(), value.to_string());
        self.store(&file).await?;
        debug!(service, account, "secret stored");
        Ok(())
    }

    async fn get_secret(&self, service: &str, account: &str) -> Result<Option<String>, SecretsError> {
        let _guard = self.lock.lock().await;
        let file = self.load().await?;
        Ok(file
            .secrets
            .get(service)
            .and_then(|accounts| accounts.get(account))
            .cloned())
    }

    async fn delete_secret(&self, service: &str, account: &str) -> Result<(), SecretsError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let Some(accounts) = file.secrets.get_mut(service) else {
            return Ok(());
        };
        if accounts.remove(account).is_none() {
            return Ok(());
        }
        if accounts.is_empty() {
            file.secrets.remove(service);
        }
        self.store(&file).await?;
        debug!(service, account, "secret deleted");
        Ok(())
    }
}
