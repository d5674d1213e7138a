//! File-backed collection document repository.
//!
//! Documents are written next to their target as a hidden temporary file
//! and renamed over it, so a failed write never truncates the previous
//! version.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use httpiness_application::ports::{DocumentRepository, FileSystem, RepositoryError};
use httpiness_domain::document::CollectionDocument;
use tracing::{debug, warn};

use crate::serialization::to_json_stable_bytes;

/// Stores collection documents as JSON files.
#[derive(Debug, Clone, Default)]
pub struct FileDocumentRepository<F> {
    fs: F,
}

impl<F: FileSystem> FileDocumentRepository<F> {
    /// Creates a repository over `fs`.
    pub const fn new(fs: F) -> Self {
        Self { fs }
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(path.file_name().unwrap_or_default());
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl<F: FileSystem> DocumentRepository for FileDocumentRepository<F> {
    async fn load_text(&self, path: &Path) -> Result<String, RepositoryError> {
        Ok(self.fs.read_file_string(path).await?)
    }

    async fn save(&self, path: &Path, document: &CollectionDocument) -> Result<(), RepositoryError> {
        let content = to_json_stable_bytes(document)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let temp = Self::temp_path(path);
        self.fs.write_file(&temp, &content).await?;
        if let Err(e) = self.fs.rename(&temp, path).await {
            if let Err(cleanup) = self.fs.remove_file(&temp).await {
                warn!(path = %temp.display(), error = %cleanup, "could not remove temporary file");
            }
            return Err(e.into());
        }

        debug!(path = %path.display(), bytes = content.len(), "document written");
        Ok(())
    }
}
