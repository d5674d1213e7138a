//! httpiness Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod persistence;
pub mod serialization;

pub use adapters::{LoopbackAuthWindow, ReqwestExecutor, SystemClock};
pub use persistence::{
    FileDocumentRepository, FileSecretStore, SettingsError, SettingsRepository, TokioFileSystem,
};
pub use serialization::{SerializationError, from_json, to_json_stable, to_json_stable_bytes};
