//! Format converter port

use httpiness_domain::document::CollectionDocument;

/// Converts documents of foreign formats into the collection model.
pub trait FormatConverter: Send + Sync {
    /// Returns `None` if `raw` is not a format this converter understands.
    fn convert(&self, raw: &str) -> Option<CollectionDocument>;
}

/// A converter that understands nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConverter;

impl FormatConverter for NoConverter {
    fn convert(&self, _raw: &str) -> Option<CollectionDocument> {
        None
    }
}
