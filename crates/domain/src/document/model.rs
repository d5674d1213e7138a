//! Serde model of the on-disk collection document.
//!
//! Field names follow the document format (`camelCase`, `*Children` lists).
//! Everything here is plain data; building the arena happens in the codec.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::version::CURRENT_VERSION;
use crate::auth::{AuthDefinition, AuthLocation};
use crate::collection::Preset;
use crate::request::{RawRequest, RequestBody};

/// Root of a collection document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDocument {
    /// Format version string, `httpiness/JSON/<major.minor>`.
    pub collection_version: String,
    /// Permanent collection identity.
    #[serde(default)]
    pub uuid: String,
    /// Auths of the root directory.
    #[serde(default)]
    pub auth_children: Vec<AuthDocument>,
    /// Subdirectories of the root directory.
    #[serde(default)]
    pub dir_children: Vec<DirectoryDocument>,
    /// Requests of the root directory.
    #[serde(default)]
    pub reqt_children: Vec<RequestDocument>,
    /// Variable name to public value.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Named variable presets.
    #[serde(default)]
    pub parameter_presets: Vec<Preset>,
}

impl CollectionDocument {
    /// An empty document at the current version.
    #[must_use]
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            collection_version: CURRENT_VERSION.as_str().to_string(),
            uuid: uuid.into(),
            auth_children: Vec::new(),
            dir_children: Vec::new(),
            reqt_children: Vec::new(),
            parameters: BTreeMap::new(),
            parameter_presets: Vec::new(),
        }
    }
}

/// A directory node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryDocument {
    /// Directory name.
    pub name: String,
    /// Child auths.
    #[serde(default)]
    pub auth_children: Vec<AuthDocument>,
    /// Child directories.
    #[serde(default)]
    pub dir_children: Vec<DirectoryDocument>,
    /// Child requests.
    #[serde(default)]
    pub reqt_children: Vec<RequestDocument>,
}

impl DirectoryDocument {
    /// An empty directory.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auth_children: Vec::new(),
            dir_children: Vec::new(),
            reqt_children: Vec::new(),
        }
    }
}

/// A request template node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDocument {
    /// Request name.
    pub name: String,
    /// The templated request.
    pub request: RawRequest,
    /// Body cached while the method carries none.
    #[serde(default)]
    pub default_body: Option<RequestBody>,
    /// Own auth: `null`, a link path or an embedded auth.
    #[serde(default)]
    pub auth: Option<AuthReference>,
}

/// How a request document refers to its own auth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthReference {
    /// Absolute path of a shared auth node.
    Link(String),
    /// An auth owned by the request.
    Embedded(AuthDocument),
}

/// An auth template node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDocument {
    /// Auth name.
    pub name: String,
    /// Explicit insertion location; `null` means the default placement.
    #[serde(default)]
    pub location: Option<AuthLocation>,
    /// What the auth does.
    pub definition: AuthDefinition,
}

/// A single subtree, as carried by the clipboard between collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NodeDocument {
    /// A directory and everything under it.
    Directory(DirectoryDocument),
    /// A request template.
    Request(RequestDocument),
    /// An auth template.
    Auth(AuthDocument),
}

impl NodeDocument {
    /// Name of the top node.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Directory(d) => &d.name,
            Self::Request(r) => &r.name,
            Self::Auth(a) => &a.name,
        }
    }

    /// Renames the top node.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Self::Directory(d) => d.name = name,
            Self::Request(r) => r.name = name,
            Self::Auth(a) => a.name = name,
        }
    }
}
