//! Schema migrations between document versions.
//!
//! Migrations operate on the raw JSON value so older shapes never need a
//! typed model of their own. Each step upgrades exactly one version.

use serde_json::{Map, Value};

use super::error::DocumentError;
use super::version::{CURRENT_VERSION, DocumentVersion, VersionClass};
use crate::request::{FORM_URLENCODED_CONTENT_TYPE, RequestBody};

/// Reads the `collectionVersion` field and classifies it.
///
/// # Errors
/// `UnsupportedVersion` for an unreadable version of this format,
/// `UnknownVersion` for anything else.
pub fn detect_version(document: &Value) -> Result<DocumentVersion, DocumentError> {
    let raw = document
        .get("collectionVersion")
        .and_then(Value::as_str)
        .ok_or(DocumentError::UnknownVersion)?;
    match DocumentVersion::classify(raw) {
        VersionClass::Known(version) => Ok(version),
        VersionClass::Unsupported => Err(DocumentError::UnsupportedVersion(raw.to_string())),
        VersionClass::Unknown => Err(DocumentError::UnknownVersion),
    }
}

/// Upgrades a document to the current version in place. Returns the version
/// it was read at.
///
/// # Errors
/// See [`detect_version`].
pub fn migrate(document: &mut Value) -> Result<DocumentVersion, DocumentError> {
    let found = detect_version(document)?;
    let mut version = found;
    while let Some(next) = version.next() {
        match version {
            DocumentVersion::V0_9 => add_auth_fields(document),
            DocumentVersion::V0_10 => convert_form_bodies(document),
            DocumentVersion::V0_11 => {}
        }
        version = next;
    }
    if let Some(root) = document.as_object_mut() {
        root.insert(
            "collectionVersion".to_string(),
            Value::String(CURRENT_VERSION.as_str().to_string()),
        );
    }
    Ok(found)
}

fn for_each_directory(directory: &mut Value, visit: &mut impl FnMut(&mut Map<String, Value>)) {
    let Some(object) = directory.as_object_mut() else {
        return;
    };
    visit(object);
    if let Some(Value::Array(children)) = object.get_mut("dirChildren") {
        for child in children {
            for_each_directory(child, visit);
        }
    }
}

fn requests_of(directory: &mut Map<String, Value>) -> impl Iterator<Item = &mut Map<String, Value>> {
    directory
        .get_mut("reqtChildren")
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}

/// 0.9 → 0.10: every directory gains `authChildren`, every request `auth`.
fn add_auth_fields(document: &mut Value) {
    for_each_directory(document, &mut |directory| {
        directory
            .entry("authChildren")
            .or_insert_with(|| Value::Array(Vec::new()));
        for request in requests_of(directory) {
            request.entry("auth").or_insert(Value::Null);
        }
    });
}

/// 0.10 → 0.11: regular bodies of url-encoded requests become form bodies.
fn convert_form_bodies(document: &mut Value) {
    for_each_directory(document, &mut |directory| {
        for request in requests_of(directory) {
            if let Some(raw) = request.get_mut("request") {
                convert_form_body(raw);
            }
        }
    });
}

fn convert_form_body(raw: &mut Value) {
    if !declares_form_urlencoded(raw) {
        return;
    }
    let Some(body) = raw.get_mut("body") else {
        return;
    };
    if body.get("type").and_then(Value::as_str) != Some("Regular") {
        return;
    }
    let text = body.get("text").and_then(Value::as_str).unwrap_or_default();
    let form = RequestBody::url_encoded(RequestBody::records_from_raw(text));
    if let Ok(value) = serde_json::to_value(form) {
        *body = value;
    }
}

fn declares_form_urlencoded(raw: &Value) -> bool {
    raw.get("headers")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|h| {
            h.get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.eq_ignore_ascii_case("Content-Type"))
        })
        .filter_map(|h| h.get("value").and_then(Value::as_str))
        .any(|v| {
            v.trim()
                .to_ascii_lowercase()
                .starts_with(FORM_URLENCODED_CONTENT_TYPE)
        })
}
