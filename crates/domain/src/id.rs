//! ID generation utilities.

use uuid::Uuid;

/// Generates the stable identity of a new collection.
///
/// The identity keys every secret of the collection, so it is random
/// (v4) and never regenerated once persisted.
#[must_use]
pub fn generate_collection_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Returns true if `value` parses as a UUID.
#[must_use]
pub fn is_valid_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}
