//! Save collection use case.

use std::path::Path;
use std::sync::Arc;

use httpiness_domain::collection::Collection;
use thiserror::Error;
use tracing::{info, warn};

use crate::ports::{Clock, DocumentRepository, RepositoryError};

/// Failure to save a collection.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The collection has never been given a file.
    #[error("collection {0} has no file path")]
    NoFilePath(String),

    /// The write failed; the previous file is intact.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Use case for writing a collection to its backing file.
pub struct SaveCollection<R: DocumentRepository> {
    repository: R,
    clock: Arc<dyn Clock>,
}

impl<R: DocumentRepository> SaveCollection<R> {
    /// Creates a new `SaveCollection` use case.
    #[must_use]
    pub fn new(repository: R, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Serializes the collection at the current version and writes it.
    ///
    /// With `target` set the document is written there ("save as") and the
    /// collection is re-pointed at it. The file path, name, dirty flag and
    /// save time change only when the write succeeds.
    ///
    /// # Errors
    /// - Returns error if the collection has no file path
    /// - Returns error if the write fails
    pub async fn execute(
        &self,
        collection: &mut Collection,
        target: Option<&Path>,
    ) -> Result<(), SaveError> {
        let path = target
            .or_else(|| collection.file_path())
            .map(Path::to_path_buf)
            .ok_or_else(|| SaveError::NoFilePath(collection.uuid().to_string()))?;

        let document = collection.to_document();
        if let Err(e) = self.repository.save(&path, &document).await {
            warn!(path = %path.display(), error = %e, "collection save failed");
            return Err(e.into());
        }

        if target.is_some() {
            collection.set_file_path(&path);
        }
        collection.mark_saved(self.clock.now());
        info!(path = %path.display(), uuid = collection.uuid(), "collection saved");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testing::{FixedClock, MemoryRepository};
    use httpiness_domain::document::parse_document;
    use pretty_assertions::assert_eq;

    fn save(repository: &MemoryRepository) -> SaveCollection<MemoryRepository> {
        SaveCollection::new(repository.clone(), Arc::new(FixedClock::default()))
    }

    #[tokio::test]
    async fn test_save_clears_dirty_and_records_time() {
        let repository = MemoryRepository::default();
        let mut collection = Collection::new("api");
        collection.set_public_value("HOST", "example.com");
        assert!(collection.is_dirty());

        save(&repository)
            .execute(&mut collection, Some(Path::new("/out/renamed.json")))
            .await
            .unwrap();

        assert!(!collection.is_dirty());
        assert_eq!(collection.name(), "renamed");
        assert_eq!(collection.last_saved(), Some(FixedClock::default().0));
        let written = repository.get("/out/renamed.json").await.unwrap();
        let document = parse_document(&written).unwrap();
        assert_eq!(document.uuid, collection.uuid());
        assert_eq!(document.parameters["HOST"], "example.com");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_dirty() {
        let repository = MemoryRepository::default();
        repository.fail_writes(true).await;
        let mut collection = Collection::new("api");
        collection.set_file_path("/out/api.json");
        collection.mark_dirty();

        let err = save(&repository)
            .execute(&mut collection, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::Repository(_)));
        assert!(collection.is_dirty());
        assert_eq!(collection.last_saved(), None);
    }

    #[tokio::test]
    async fn test_failed_save_as_keeps_previous_file() {
        let repository = MemoryRepository::default();
        repository.fail_writes(true).await;
        let mut collection = Collection::new("api");
        collection.set_file_path("/out/api.json");
        collection.mark_dirty();

        let err = save(&repository)
            .execute(&mut collection, Some(Path::new("/out/other.json")))
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::Repository(_)));
        assert_eq!(collection.file_path(), Some(Path::new("/out/api.json")));
        assert_eq!(collection.name(), "api");
        assert!(collection.is_dirty());
        assert!(repository.get("/out/other.json").await.is_none());
    }

    #[tokio::test]
    async fn test_save_without_path() {
        let mut collection = Collection::new("api");
        let err = save(&MemoryRepository::default())
            .execute(&mut collection, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SaveError::NoFilePath(_)));
    }
}
