//! HTTP Request body types

use serde::{Deserialize, Serialize};

/// Encoding of a form body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FormEncoding {
    /// `application/x-www-form-urlencoded`
    #[default]
    UrlEncoded,
    /// `multipart/form-data`
    Multipart,
}

/// A single name/value record of a form body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    /// Field name. May contain `${macros}`.
    pub name: String,
    /// Field value. May contain `${macros}`.
    pub value: String,
}

impl FormRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Templated request body.
///
/// The `type` field is the discriminator in the document format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestBody {
    /// Raw text body.
    Regular {
        /// The body text. May contain `${macros}`.
        text: String,
    },
    /// Structured form body.
    Form {
        /// How the records are encoded on the wire.
        encoding: FormEncoding,
        /// Form fields in order.
        records: Vec<FormRecord>,
    },
}

impl RequestBody {
    /// Creates a raw text body.
    #[must_use]
    pub fn regular(text: impl Into<String>) -> Self {
        Self::Regular { text: text.into() }
    }

    /// Creates a url-encoded form body.
    #[must_use]
    pub const fn url_encoded(records: Vec<FormRecord>) -> Self {
        Self::Form {
            encoding: FormEncoding::UrlEncoded,
            records,
        }
    }

    /// Creates a multipart form body.
    #[must_use]
    pub const fn multipart(records: Vec<FormRecord>) -> Self {
        Self::Form {
            encoding: FormEncoding::Multipart,
            records,
        }
    }

    /// Splits a raw `a=1&b=2` string into form records.
    ///
    /// Pairs are split on `&`, then on the first `=`; empty pairs are
    /// skipped and a pair without `=` gets an empty value. Values are kept
    /// verbatim so embedded macros survive.
    #[must_use]
    pub fn records_from_raw(raw: &str) -> Vec<FormRecord> {
        raw.split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((name, value)) => FormRecord::new(name, value),
                None => FormRecord::new(pair, ""),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_records_from_raw() {
        assert_eq!(
            RequestBody::records_from_raw("a=1&b=2"),
            vec![FormRecord::new("a", "1"), FormRecord::new("b", "2")]
        );
    }

    #[test]
    fn test_records_from_raw_edge_cases() {
        assert_eq!(
            RequestBody::records_from_raw("flag&&k=v=w&"),
            vec![FormRecord::new("flag", ""), FormRecord::new("k", "v=w")]
        );
        assert!(RequestBody::records_from_raw("").is_empty());
    }

    #[test]
    fn test_body_serialization_tag() {
        let json = serde_json::to_value(RequestBody::url_encoded(vec![FormRecord::new(
            "a", "1",
        )]))
        .unwrap_or_default();
        assert_eq!(json["type"], "Form");
        assert_eq!(json["encoding"], "UrlEncoded");
        assert_eq!(json["records"][0]["name"], "a");

        let json = serde_json::to_value(RequestBody::regular("x")).unwrap_or_default();
        assert_eq!(json, serde_json::json!({"type": "Regular", "text": "x"}));
    }
}
