//! Application error types

use httpiness_domain::DomainError;
use thiserror::Error;

use crate::use_cases::{OpenError, SaveError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A collection could not be opened.
    #[error(transparent)]
    Open(#[from] OpenError),

    /// A collection could not be saved.
    #[error(transparent)]
    Save(#[from] SaveError),

    /// No open collection has this UUID.
    #[error("collection not open: {0}")]
    NotOpen(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
