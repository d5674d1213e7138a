//! Variable store service.
//!
//! Reads and writes collection variables, keeping the real value of
//! sensitive variables in the secret store and only the sentinel in the
//! document.

use std::sync::Arc;

use httpiness_domain::collection::{
    Collection, Preset, PresetEntry, SECRET_SERVICE, SENSITIVE_SENTINEL,
};
use tracing::debug;

use super::substitution::{MacroResolver, read_variable};
use crate::ports::{SecretStore, SecretsError};

/// Errors raised by variable operations.
#[derive(Debug, thiserror::Error)]
pub enum VariableError {
    /// The secret store failed.
    #[error(transparent)]
    Secrets(#[from] SecretsError),

    /// No preset has the given name.
    #[error("preset not found: {0}")]
    PresetNotFound(String),
}

/// Variable operations over a collection, backed by a secret store.
#[derive(Clone)]
pub struct VariableStore {
    secrets: Arc<dyn SecretStore>,
}

impl VariableStore {
    /// Creates a store writing secrets to `secrets`.
    #[must_use]
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self { secrets }
    }

    /// The backing secret store.
    #[must_use]
    pub fn secrets(&self) -> &dyn SecretStore {
        self.secrets.as_ref()
    }

    /// Starts a substitution session over `collection`.
    #[must_use]
    pub fn resolver<'a>(&'a self, collection: &'a Collection) -> MacroResolver<'a> {
        MacroResolver::new(collection, self.secrets.as_ref())
    }

    /// The value a variable resolves to: the public value, or the secret when
    /// the public value is the sentinel. Missing variables and missing
    /// secrets read as `""`.
    ///
    /// # Errors
    /// Returns an error if the secret store cannot be read.
    pub async fn get_variable_value(
        &self,
        collection: &Collection,
        name: &str,
    ) -> Result<String, SecretsError> {
        Ok(read_variable(collection, self.secrets.as_ref(), name)
            .await?
            .unwrap_or_default())
    }

    /// Sets a variable and its sensitivity.
    ///
    /// `value == None` keeps the current resolved value, which is how a
    /// variable is locked or unlocked without editing it; no notification is
    /// sent in that case. Otherwise `VariableChanged` fires when the value
    /// differs from the previous one. The collection is always marked dirty.
    ///
    /// # Errors
    /// Returns an error if the secret store fails; the document map is left
    /// untouched in that case.
    pub async fn set_variable(
        &self,
        collection: &mut Collection,
        name: &str,
        value: Option<&str>,
        sensitive: bool,
    ) -> Result<(), SecretsError> {
        let previous = self.get_variable_value(collection, name).await?;
        let value = value.map_or_else(|| previous.clone(), str::to_string);
        let account = collection.secret_account(name);

        if sensitive {
            self.secrets
                .set_secret(SECRET_SERVICE, &account, &value)
                .await?;
            collection.set_public_value(name, SENSITIVE_SENTINEL);
        } else {
            if collection.is_sensitive(name) {
                self.secrets.delete_secret(SECRET_SERVICE, &account).await?;
            }
            collection.set_public_value(name, value.clone());
        }
        collection.mark_dirty();

        let changed = value != previous;
        debug!(variable = name, sensitive, changed, "variable set");
        if changed {
            collection.notify_variable_changed(name);
        }
        Ok(())
    }

    /// Removes a variable, deleting its secret when it is sensitive.
    ///
    /// # Errors
    /// Returns an error if the secret store fails.
    pub async fn remove_variable(
        &self,
        collection: &mut Collection,
        name: &str,
    ) -> Result<bool, SecretsError> {
        if collection.is_sensitive(name) {
            let account = collection.secret_account(name);
            self.secrets.delete_secret(SECRET_SERVICE, &account).await?;
        }
        Ok(collection.remove_public_value(name).is_some())
    }

    /// Applies every non-empty entry of a preset, keeping each variable's
    /// current sensitivity.
    ///
    /// # Errors
    /// `PresetNotFound`, or the secret store failed.
    pub async fn apply_preset(
        &self,
        collection: &mut Collection,
        preset_name: &str,
    ) -> Result<(), VariableError> {
        let preset = collection
            .preset(preset_name)
            .cloned()
            .ok_or_else(|| VariableError::PresetNotFound(preset_name.to_string()))?;
        for entry in preset.applicable() {
            let sensitive = collection.is_sensitive(&entry.name);
            self.set_variable(collection, &entry.name, Some(&entry.value), sensitive)
                .await?;
        }
        debug!(preset = preset_name, "preset applied");
        Ok(())
    }

    /// Stores the current resolved values of `names` as a preset, replacing
    /// any preset with the same name.
    ///
    /// # Errors
    /// Returns an error if the secret store cannot be read.
    pub async fn capture_preset(
        &self,
        collection: &mut Collection,
        preset_name: &str,
        names: &[String],
    ) -> Result<Preset, SecretsError> {
        let mut preset = Preset::new(preset_name);
        for name in names {
            let value = self.get_variable_value(collection, name).await?;
            preset.macros.push(PresetEntry::new(name.clone(), value));
        }
        collection.upsert_preset(preset.clone());
        Ok(preset)
    }
}

impl std::fmt::Debug for VariableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableStore").finish_non_exhaustive()
    }
}
