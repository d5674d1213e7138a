//! Versioned JSON collection document.

mod codec;
mod error;
mod migration;
mod model;
mod version;

pub use codec::{document_from_value, parse_document};
pub use error::DocumentError;
pub use migration::{detect_version, migrate};
pub use model::{
    AuthDocument, AuthReference, CollectionDocument, DirectoryDocument, NodeDocument,
    RequestDocument,
};
pub use version::{CURRENT_VERSION, DocumentVersion, VERSION_PREFIX, VersionClass};
