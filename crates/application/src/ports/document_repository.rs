//! Document repository port

use std::future::Future;
use std::path::Path;

use httpiness_domain::document::CollectionDocument;

use super::FileSystemError;

/// Errors raised while reading or writing collection documents.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The file could not be read or written.
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    /// The document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Loads raw document text and persists documents.
pub trait DocumentRepository: Send + Sync {
    /// Reads the raw text of a document.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    fn load_text(&self, path: &Path) -> impl Future<Output = Result<String, RepositoryError>> + Send;

    /// Writes a document. A failed write leaves any previous file intact.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    fn save(
        &self,
        path: &Path,
        document: &CollectionDocument,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
