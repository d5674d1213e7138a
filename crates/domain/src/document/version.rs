//! Document version strings.

use std::fmt;

/// Prefix shared by every version string this format has used.
pub const VERSION_PREFIX: &str = "httpiness/JSON/";

/// A document version this build can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentVersion {
    /// No `authChildren`, no request auth.
    V0_9,
    /// Form bodies stored as regular text.
    V0_10,
    /// Current format.
    V0_11,
}

/// The version written by this build.
pub const CURRENT_VERSION: DocumentVersion = DocumentVersion::V0_11;

impl DocumentVersion {
    /// The full version string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V0_9 => "httpiness/JSON/0.9",
            Self::V0_10 => "httpiness/JSON/0.10",
            Self::V0_11 => "httpiness/JSON/0.11",
        }
    }

    /// The version a single migration step leads to.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::V0_9 => Some(Self::V0_10),
            Self::V0_10 => Some(Self::V0_11),
            Self::V0_11 => None,
        }
    }

    /// Classifies a raw version string.
    #[must_use]
    pub fn classify(raw: &str) -> VersionClass {
        [Self::V0_9, Self::V0_10, Self::V0_11]
            .into_iter()
            .find(|v| v.as_str() == raw)
            .map_or_else(
                || {
                    if raw.starts_with(VERSION_PREFIX) {
                        VersionClass::Unsupported
                    } else {
                        VersionClass::Unknown
                    }
                },
                VersionClass::Known,
            )
    }
}

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of looking at a version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionClass {
    /// Readable, possibly after migration.
    Known(DocumentVersion),
    /// Ours, but from a build we cannot read (usually newer).
    Unsupported,
    /// Not a document of this format.
    Unknown,
}
