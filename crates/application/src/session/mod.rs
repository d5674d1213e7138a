//! Session state shared across operations: open collections and the
//! node clipboard.

mod clipboard;
mod registry;

pub use clipboard::Clipboard;
pub use registry::CollectionRegistry;
