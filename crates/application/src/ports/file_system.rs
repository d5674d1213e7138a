//! File system port

use std::future::Future;
use std::path::{Path, PathBuf};

/// Errors that can occur during file system operations.
#[derive(Debug, thiserror::Error)]
pub enum FileSystemError {
    /// The path does not exist.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Access was denied.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Any other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for file access.
pub trait FileSystem: Send + Sync {
    /// Reads a whole file as UTF-8.
    ///
    /// # Errors
    /// `NotFound`, `PermissionDenied` or `Io`.
    fn read_file_string(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<String, FileSystemError>> + Send;

    /// Writes a file, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    fn write_file(
        &self,
        path: &Path,
        contents: &[u8],
    ) -> impl Future<Output = Result<(), FileSystemError>> + Send;

    /// Returns true if the path exists.
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;

    /// Removes a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be removed.
    fn remove_file(&self, path: &Path) -> impl Future<Output = Result<(), FileSystemError>> + Send;

    /// Renames a file, replacing the target.
    ///
    /// # Errors
    /// Returns an error if the rename fails.
    fn rename(
        &self,
        from: &Path,
        to: &Path,
    ) -> impl Future<Output = Result<(), FileSystemError>> + Send;
}
