//! Application settings.
//!
//! Persisted as JSON in the platform config directory. Every field has a
//! default so older or partial files keep loading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Tunables of the authoring core and its adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Seconds between autosave passes over dirty collections; 0 disables.
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,

    /// Seconds to wait for the user to finish an authorization redirect.
    #[serde(default = "default_auth_window_timeout_secs")]
    pub auth_window_timeout_secs: u64,

    /// Loopback port used when the callback URL names none.
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Location of the secret file; platform data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_file: Option<PathBuf>,
}

const fn default_autosave_interval_secs() -> u64 {
    60
}

const fn default_auth_window_timeout_secs() -> u64 {
    300
}

const fn default_callback_port() -> u16 {
    8910
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            autosave_interval_secs: default_autosave_interval_secs(),
            auth_window_timeout_secs: default_auth_window_timeout_secs(),
            callback_port: default_callback_port(),
            log_filter: default_log_filter(),
            secret_file: None,
        }
    }
}
