//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod auth_window;
mod clock;
mod document_repository;
mod executor;
mod file_system;
mod format_converter;
mod secret_store;

pub use auth_window::AuthWindow;
pub use clock::Clock;
pub use document_repository::{DocumentRepository, RepositoryError};
pub use executor::{ExecutionMetadata, ExecutionResult, HttpResponse, RequestExecutor};
pub use file_system::{FileSystem, FileSystemError};
pub use format_converter::{FormatConverter, NoConverter};
pub use secret_store::{SecretStore, SecretsError};
