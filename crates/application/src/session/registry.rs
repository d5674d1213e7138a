//! Registry of open collections.

use std::path::Path;
use std::sync::Arc;

use httpiness_domain::collection::Collection;
use tracing::{info, warn};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{Clock, DocumentRepository, FormatConverter};
use crate::use_cases::{OpenCollection, SaveCollection, SaveError};

/// The collections currently open in a session, in opening order.
pub struct CollectionRegistry<R: DocumentRepository + Clone, C: FormatConverter> {
    open: OpenCollection<R, C>,
    save: SaveCollection<R>,
    collections: Vec<Collection>,
}

impl<R: DocumentRepository + Clone, C: FormatConverter> CollectionRegistry<R, C> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(repository: R, converter: C, clock: Arc<dyn Clock>) -> Self {
        Self {
            open: OpenCollection::new(repository.clone(), converter),
            save: SaveCollection::new(repository, clock),
            collections: Vec::new(),
        }
    }

    /// Opens the collection stored at `path`. A file that is already open
    /// is not read again.
    ///
    /// # Errors
    /// Returns error if the collection cannot be opened.
    pub async fn open(&mut self, path: &Path) -> ApplicationResult<&mut Collection> {
        let index = match self
            .collections
            .iter()
            .position(|c| c.file_path() == Some(path))
        {
            Some(index) => index,
            None => {
                let collection = self.open.execute(path).await?;
                self.collections.push(collection);
                self.collections.len() - 1
            }
        };
        Ok(&mut self.collections[index])
    }

    /// Registers a collection created in memory.
    pub fn insert(&mut self, collection: Collection) -> &mut Collection {
        let index = self.collections.len();
        self.collections.push(collection);
        &mut self.collections[index]
    }

    /// Looks up an open collection.
    #[must_use]
    pub fn get(&self, uuid: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.uuid() == uuid)
    }

    /// Looks up an open collection for editing.
    pub fn get_mut(&mut self, uuid: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.uuid() == uuid)
    }

    /// Open collections in opening order.
    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.iter()
    }

    /// Number of open collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Returns true if nothing is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Saves one collection, optionally to a new file.
    ///
    /// # Errors
    /// `NotOpen` for an unknown UUID, otherwise see [`SaveCollection`].
    pub async fn save(&mut self, uuid: &str, target: Option<&Path>) -> ApplicationResult<()> {
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.uuid() == uuid)
            .ok_or_else(|| ApplicationError::NotOpen(uuid.to_string()))?;
        self.save.execute(collection, target).await?;
        Ok(())
    }

    /// Persists the collection if it has unsaved changes, then removes it
    /// from the registry. A failed save leaves it open.
    ///
    /// # Errors
    /// `NotOpen` for an unknown UUID, or the save error.
    pub async fn close(&mut self, uuid: &str) -> ApplicationResult<Collection> {
        let index = self
            .collections
            .iter()
            .position(|c| c.uuid() == uuid)
            .ok_or_else(|| ApplicationError::NotOpen(uuid.to_string()))?;
        if self.collections[index].is_dirty() {
            self.save.execute(&mut self.collections[index], None).await?;
        }
        let collection = self.collections.remove(index);
        info!(uuid, name = collection.name(), "collection closed");
        Ok(collection)
    }

    /// Saves every dirty collection that has a file. Failures are logged
    /// and returned; the remaining collections are still saved.
    pub async fn save_all_dirty(&mut self) -> Vec<(String, SaveError)> {
        let mut failures = Vec::new();
        for collection in &mut self.collections {
            if !collection.is_dirty() || collection.file_path().is_none() {
                continue;
            }
            if let Err(e) = self.save.execute(collection, None).await {
                warn!(uuid = collection.uuid(), error = %e, "autosave failed");
                failures.push((collection.uuid().to_string(), e));
            }
        }
        failures
    }
}
