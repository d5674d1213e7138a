//! File-backed persistence adapters.

mod document_repository;
mod file_system;
mod secret_store;
mod settings_repository;

pub use document_repository::FileDocumentRepository;
pub use file_system::TokioFileSystem;
pub use secret_store::FileSecretStore;
pub use settings_repository::{SettingsError, SettingsRepository};
