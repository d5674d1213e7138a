//! JSON serialization helpers for deterministic output.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to pretty JSON with 2-space indentation and a
/// trailing newline. Map key order is whatever the source type yields, so
/// callers use `BTreeMap` for stable output.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// [`to_json_stable`] as bytes, for direct file writing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    to_json_stable(value).map(String::into_bytes)
}

/// Deserializes JSON from a string.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SerializationError> {
    serde_json::from_str(json).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use httpiness_domain::document::CollectionDocument;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_layout() {
        let mut document = CollectionDocument::new("u-1");
        document.parameters.insert("ZETA".to_string(), "z".to_string());
        document.parameters.insert("ALPHA".to_string(), "a".to_string());

        let json = to_json_stable(&document).unwrap();
        assert!(json.starts_with("{\n  \"collectionVersion\": \"httpiness/JSON/0.11\""));
        assert!(json.ends_with("}\n"));
        assert!(json.find("ALPHA").unwrap() < json.find("ZETA").unwrap());
    }

    #[test]
    fn test_stable_across_round_trip() {
        let mut document = CollectionDocument::new("u-1");
        document.parameters.insert("HOST".to_string(), "x".to_string());
        let first = to_json_stable(&document).unwrap();
        let restored: CollectionDocument = from_json(&first).unwrap();
        assert_eq!(to_json_stable(&restored).unwrap(), first);
    }

    #[test]
    fn test_invalid_json() {
        let result: Result<CollectionDocument, _> = from_json(r#"{"uuid": }"#);
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
