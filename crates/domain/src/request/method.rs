//! Request methods a template can use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Method of a request template. Serialized upper-case, as in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

const NAMES: [(HttpMethod, &str); 7] = [
    (HttpMethod::Get, "GET"),
    (HttpMethod::Post, "POST"),
    (HttpMethod::Put, "PUT"),
    (HttpMethod::Patch, "PATCH"),
    (HttpMethod::Delete, "DELETE"),
    (HttpMethod::Head, "HEAD"),
    (HttpMethod::Options, "OPTIONS"),
];

impl HttpMethod {
    /// Returns true if a template with this method keeps its body.
    ///
    /// Only POST and PUT do; any other method parks the body in the
    /// default-body cache.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    /// Wire name of the method.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        NAMES
            .iter()
            .find(|(method, _)| *method == self)
            .map_or("GET", |(_, name)| name)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|(method, _)| *method)
            .ok_or_else(|| DomainError::UnsupportedMethod(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert_eq!("Options".parse::<HttpMethod>().unwrap(), HttpMethod::Options);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_display_matches_serde() {
        for (method, name) in NAMES {
            assert_eq!(method.to_string(), name);
            assert_eq!(serde_json::to_string(&method).unwrap(), format!("\"{name}\""));
        }
    }

    #[test]
    fn test_only_post_and_put_keep_a_body() {
        let keeping: Vec<_> = NAMES
            .iter()
            .map(|(m, _)| *m)
            .filter(|m| m.has_body())
            .collect();
        assert_eq!(keeping, vec![HttpMethod::Post, HttpMethod::Put]);
    }
}
