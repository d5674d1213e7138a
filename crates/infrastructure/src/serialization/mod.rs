//! Deterministic JSON serialization for collection, secret and settings
//! files.
//!
//! Output uses 2-space indentation and a trailing newline, so saving an
//! unchanged collection rewrites the same bytes.

mod json;

pub use json::*;
