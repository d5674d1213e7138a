//! Document errors.

use thiserror::Error;

/// Failure to read a collection document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Not valid JSON, or JSON that does not fit the document model.
    #[error("malformed collection document: {0}")]
    Malformed(String),

    /// Carries our version prefix but a version this build cannot read.
    #[error("unsupported collection version: {0}")]
    UnsupportedVersion(String),

    /// Not a document of this format.
    #[error("unknown document format")]
    UnknownVersion,
}
