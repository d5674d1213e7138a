//! Collection variables and presets.

use serde::{Deserialize, Serialize};

/// Public value stored in place of a sensitive variable.
pub const SENSITIVE_SENTINEL: &str = "******sensitive******";

/// One variable assignment inside a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetEntry {
    /// Variable name.
    pub name: String,
    /// Value to apply; empty values are skipped.
    pub value: String,
}

impl PresetEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A named set of variable values applied in one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Preset name.
    pub name: String,
    /// Assignments in application order.
    #[serde(default)]
    pub macros: Vec<PresetEntry>,
}

impl Preset {
    /// Creates an empty preset.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            macros: Vec::new(),
        }
    }

    /// Adds an assignment.
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.macros.push(PresetEntry::new(name, value));
        self
    }

    /// Entries whose value is non-empty.
    pub fn applicable(&self) -> impl Iterator<Item = &PresetEntry> {
        self.macros.iter().filter(|e| !e.value.is_empty())
    }
}
