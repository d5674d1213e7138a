//! Open collection use case.

use std::path::Path;

use httpiness_domain::collection::Collection;
use httpiness_domain::document::{CollectionDocument, DocumentError, parse_document};
use thiserror::Error;
use tracing::info;

use crate::ports::{DocumentRepository, FormatConverter, RepositoryError};

/// Failure to open a collection file.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The file could not be read.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The file is not a readable collection document.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Use case for loading a collection from disk.
pub struct OpenCollection<R: DocumentRepository, C: FormatConverter> {
    repository: R,
    converter: C,
}

impl<R: DocumentRepository, C: FormatConverter> OpenCollection<R, C> {
    /// Creates a new `OpenCollection` use case.
    #[must_use]
    pub const fn new(repository: R, converter: C) -> Self {
        Self {
            repository,
            converter,
        }
    }

    /// Reads, migrates and builds the collection stored at `path`.
    ///
    /// The collection is named after the file stem. Documents of an unknown
    /// format are handed to the format converter; a converted collection
    /// comes back dirty since it has never been written in our format.
    ///
    /// # Errors
    /// - Returns error if the file cannot be read
    /// - Returns error if the document is malformed or of an unsupported version
    pub async fn execute(&self, path: &Path) -> Result<Collection, OpenError> {
        let text = self.repository.load_text(path).await?;
        let (document, converted) = self.decode(&text)?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("collection")
            .to_string();
        let mut collection = Collection::from_document(document, name, Some(path.to_path_buf()))?;
        if converted {
            collection.mark_dirty();
        }

        info!(
            path = %path.display(),
            uuid = collection.uuid(),
            converted,
            "collection opened"
        );
        Ok(collection)
    }

    fn decode(&self, text: &str) -> Result<(CollectionDocument, bool), DocumentError> {
        match parse_document(text) {
            Ok(document) => Ok((document, false)),
            Err(DocumentError::UnknownVersion) => self
                .converter
                .convert(text)
                .map(|document| (document, true))
                .ok_or(DocumentError::UnknownVersion),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ports::NoConverter;
    use crate::testing::MemoryRepository;
    use httpiness_domain::document::CURRENT_VERSION;
    use pretty_assertions::assert_eq;

    const UUID: &str = "0b6f2c6e-4d3b-4a4e-9a55-2f1d3c4b5a69";

    fn document(version: &str) -> String {
        format!(
            r#"{{
  "collectionVersion": "{version}",
  "uuid": "{UUID}",
  "authChildren": [],
  "dirChildren": [],
  "reqtChildren": [],
  "parameters": {{ "HOST": "example.com" }},
  "parameterPresets": []
}}"#
        )
    }

    struct OneShotConverter;

    impl FormatConverter for OneShotConverter {
        fn convert(&self, raw: &str) -> Option<CollectionDocument> {
            raw.contains("\"info\"").then(|| CollectionDocument::new(UUID))
        }
    }

    #[tokio::test]
    async fn test_open_names_collection_after_file() {
        let repository = MemoryRepository::default();
        repository
            .put("/work/My API.json", &document(CURRENT_VERSION.as_str()))
            .await;
        let open = OpenCollection::new(repository, NoConverter);

        let collection = open.execute(Path::new("/work/My API.json")).await.unwrap();
        assert_eq!(collection.name(), "My API");
        assert_eq!(collection.uuid(), UUID);
        assert_eq!(collection.public_value("HOST"), "example.com");
        assert_eq!(collection.file_path(), Some(Path::new("/work/My API.json")));
        assert!(!collection.is_dirty());
    }

    #[tokio::test]
    async fn test_open_unsupported_version() {
        let repository = MemoryRepository::default();
        repository
            .put("/a.json", &document("httpiness/JSON/7.0"))
            .await;
        let open = OpenCollection::new(repository, NoConverter);

        let err = open.execute(Path::new("/a.json")).await.unwrap_err();
        assert!(matches!(
            err,
            OpenError::Document(DocumentError::UnsupportedVersion(_))
        ));
    }

    #[tokio::test]
    async fn test_open_unknown_format_uses_converter() {
        let repository = MemoryRepository::default();
        repository.put("/p.json", r#"{"info": {}}"#).await;

        let err = OpenCollection::new(repository.clone(), NoConverter)
            .execute(Path::new("/p.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, OpenError::Document(DocumentError::UnknownVersion)));

        let collection = OpenCollection::new(repository, OneShotConverter)
            .execute(Path::new("/p.json"))
            .await
            .unwrap();
        assert!(collection.is_dirty());
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let open = OpenCollection::new(MemoryRepository::default(), NoConverter);
        let err = open.execute(Path::new("/missing.json")).await.unwrap_err();
        assert!(matches!(err, OpenError::Repository(_)));
    }

    #[tokio::test]
    async fn test_open_malformed_json() {
        let repository = MemoryRepository::default();
        repository.put("/bad.json", "{ not json").await;
        let open = OpenCollection::new(repository, NoConverter);
        let err = open.execute(Path::new("/bad.json")).await.unwrap_err();
        assert!(matches!(err, OpenError::Document(DocumentError::Malformed(_))));
    }
}
