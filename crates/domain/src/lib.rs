//! httpiness domain - core types of the request authoring model
//!
//! Macro tokenizing, request and auth definitions, the arena collection
//! tree with its variables, and the versioned document format.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod collection;
pub mod document;
pub mod error;
pub mod id;
pub mod macro_text;
pub mod request;
pub mod settings;

pub use auth::{AuthDefinition, AuthLocation, AuthTemplate, OAuth2Config, OAuth2Token, OAuth2Type};
pub use collection::{Collection, CollectionEvent, CollectionTree, NodeId, RequestTemplate};
pub use document::{CollectionDocument, DocumentError};
pub use error::{DomainError, DomainResult};
pub use id::generate_collection_uuid;
pub use macro_text::{MacroSegment, MacroText, SegmentKind};
pub use settings::AppSettings;
