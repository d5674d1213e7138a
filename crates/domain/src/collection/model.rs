//! A loaded collection: tree, identity and variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::events::CollectionEvent;
use super::tree::CollectionTree;
use super::variables::{Preset, SENSITIVE_SENTINEL};
use crate::id::generate_collection_uuid;

/// Secret-store service name used for every sensitive variable.
pub const SECRET_SERVICE: &str = "httpiness";

/// An open collection.
///
/// The UUID is assigned once at creation and persisted; it keys the secret
/// store entries of sensitive variables.
#[derive(Debug)]
pub struct Collection {
    uuid: String,
    name: String,
    file_path: Option<PathBuf>,
    last_saved: Option<DateTime<Utc>>,
    /// The node tree.
    pub tree: CollectionTree,
    variables: BTreeMap<String, String>,
    presets: Vec<Preset>,
}

impl Collection {
    /// Creates an empty collection with a fresh UUID.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_uuid(name, generate_collection_uuid())
    }

    /// Creates an empty collection with a known UUID.
    #[must_use]
    pub fn with_uuid(name: impl Into<String>, uuid: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uuid: uuid.into(),
            tree: CollectionTree::new(name.clone()),
            name,
            file_path: None,
            last_saved: None,
            variables: BTreeMap::new(),
            presets: Vec::new(),
        }
    }

    /// Permanent identity.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Display name, usually the file stem.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing file, if the collection was loaded or saved.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Points the collection at a new backing file, renaming it after the
    /// file stem.
    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            self.name = stem.to_string();
        }
        self.file_path = Some(path);
    }

    /// Time of the last successful save.
    #[must_use]
    pub const fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// Records a successful save and clears the dirty flag.
    pub fn mark_saved(&mut self, at: DateTime<Utc>) {
        self.last_saved = Some(at);
        self.tree.mark_clean();
    }

    /// Returns true if there are unsaved changes.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.tree.is_dirty()
    }

    /// Flags unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.tree.mark_dirty();
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    /// Stored value of a variable: the real value or the sentinel. Unknown
    /// variables read as `""`.
    #[must_use]
    pub fn public_value(&self, name: &str) -> &str {
        self.variables.get(name).map_or("", String::as_str)
    }

    /// Returns true if the variable is backed by the secret store.
    #[must_use]
    pub fn is_sensitive(&self, name: &str) -> bool {
        self.public_value(name) == SENSITIVE_SENTINEL
    }

    /// Returns true if the variable has no stored value.
    #[must_use]
    pub fn is_empty(&self, name: &str) -> bool {
        self.public_value(name).is_empty()
    }

    /// Returns true if the variable is defined at all.
    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Variable names in sorted order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// The whole variable map as stored.
    #[must_use]
    pub const fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Stores a public value and marks the collection dirty. No event is
    /// emitted; see [`Self::notify_variable_changed`].
    pub fn set_public_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
        self.mark_dirty();
    }

    /// Removes a variable, returning its public value.
    pub fn remove_public_value(&mut self, name: &str) -> Option<String> {
        let removed = self.variables.remove(name);
        if removed.is_some() {
            self.mark_dirty();
        }
        removed
    }

    /// Secret-store account holding the real value of a sensitive variable.
    #[must_use]
    pub fn secret_account(&self, name: &str) -> String {
        format!("{name}_{}", self.uuid)
    }

    /// Emits `VariableChanged` with the current public value.
    pub fn notify_variable_changed(&self, name: &str) {
        self.tree.emit(&CollectionEvent::VariableChanged {
            name: name.to_string(),
            public_value: self.public_value(name).to_string(),
        });
    }

    // ------------------------------------------------------------------
    // Presets
    // ------------------------------------------------------------------

    /// Presets in order.
    #[must_use]
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// Looks up a preset by name.
    #[must_use]
    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Inserts a preset or replaces the one with the same name.
    pub fn upsert_preset(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
        self.mark_dirty();
    }

    /// Removes a preset by name.
    pub fn remove_preset(&mut self, name: &str) -> Option<Preset> {
        let index = self.presets.iter().position(|p| p.name == name)?;
        self.mark_dirty();
        Some(self.presets.remove(index))
    }

    pub(crate) fn restore(
        &mut self,
        variables: BTreeMap<String, String>,
        presets: Vec<Preset>,
        file_path: Option<PathBuf>,
    ) {
        self.variables = variables;
        self.presets = presets;
        self.file_path = file_path;
    }
}
