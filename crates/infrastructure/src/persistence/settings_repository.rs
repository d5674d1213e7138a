//! Application settings persistence.
//!
//! By default settings live in the platform config directory:
//! - Linux: ~/.config/httpiness/settings.json
//! - macOS: ~/Library/Application Support/httpiness/settings.json
//! - Windows: %APPDATA%/httpiness/settings.json

use std::path::{Path, PathBuf};

use httpiness_domain::AppSettings;
use tokio::fs;

use crate::serialization::{SerializationError, from_json, to_json_stable_bytes};

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Reads and writes [`AppSettings`].
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    path: PathBuf,
}

impl SettingsRepository {
    /// A repository over an explicit file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A repository over the platform default location.
    ///
    /// # Errors
    /// `NoConfigDir` if the platform has no config directory.
    pub fn at_default_location() -> Result<Self, SettingsError> {
        Self::default_path()
            .map(Self::new)
            .ok_or(SettingsError::NoConfigDir)
    }

    /// `settings.json` in the httpiness config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("httpiness").join("settings.json"))
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings. A missing file yields the defaults; missing fields
    /// take their default values.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<AppSettings, SettingsError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(AppSettings::default());
        }
        let content = fs::read_to_string(&self.path).await?;
        Ok(from_json(&content)?)
    }

    /// Saves settings, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, settings: &AppSettings) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let content = to_json_stable_bytes(settings)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}
