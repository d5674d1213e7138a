//! Authentication definition types

use serde::{Deserialize, Serialize};

use super::oauth2::OAuth2Config;
use crate::macro_text::MacroText;

/// Name of the header Bearer, Basic and `OAuth2` values go into by default.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Authentication definition.
///
/// The `type` field is the discriminator in the document format.
/// All string values may contain `${macros}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
pub enum AuthDefinition {
    /// No authentication
    #[default]
    None,
    /// API key sent under a custom name
    ApiKey {
        /// Header, query or form parameter name
        key: String,
        /// The API key value
        value: String,
    },
    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },
    /// Bearer token authentication
    Bearer {
        /// The token
        token: String,
    },
    /// `OAuth2` flow producing a bearer token
    #[serde(rename = "OAuth2")]
    OAuth2(OAuth2Config),
}

impl AuthDefinition {
    /// Creates a bearer token definition.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Creates a basic authentication definition.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates an API key definition.
    #[must_use]
    pub fn api_key(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ApiKey {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns true if authentication is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns true if resolution may involve an `OAuth2` flow.
    #[must_use]
    pub const fn is_oauth2(&self) -> bool {
        matches!(self, Self::OAuth2(_))
    }

    /// Returns every templated string field, in declaration order.
    #[must_use]
    pub fn template_fields(&self) -> Vec<&str> {
        match self {
            Self::None => Vec::new(),
            Self::ApiKey { key, value } => vec![key.as_str(), value.as_str()],
            Self::Basic { username, password } => vec![username.as_str(), password.as_str()],
            Self::Bearer { token } => vec![token.as_str()],
            Self::OAuth2(config) => config.template_fields(),
        }
    }
}

/// Where a resolved auth value is inserted into the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLocation {
    /// As an HTTP header
    Header,
    /// As a URL query parameter
    Query,
    /// As a record of a url-encoded form body
    Body,
}

/// An auth node's payload: the definition and an optional explicit location.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthTemplate {
    /// What kind of authentication to perform.
    pub definition: AuthDefinition,
    /// Explicit insertion point; `None` means header.
    pub location: Option<AuthLocation>,
}

impl AuthTemplate {
    /// Creates a template placed at the default location.
    #[must_use]
    pub const fn new(definition: AuthDefinition) -> Self {
        Self {
            definition,
            location: None,
        }
    }

    /// Sets an explicit insertion location.
    #[must_use]
    pub const fn with_location(mut self, location: AuthLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Returns the effective insertion location.
    #[must_use]
    pub fn effective_location(&self) -> AuthLocation {
        self.location.unwrap_or(AuthLocation::Header)
    }

    /// Returns the macro names referenced by the definition's fields,
    /// in order of first appearance.
    #[must_use]
    pub fn macro_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for field in self.definition.template_fields() {
            for name in MacroText::macro_names_in(field) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// A concrete auth value ready to be placed into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuth {
    /// Header, query or form parameter name.
    pub name: String,
    /// Final value (e.g. `Bearer abc`).
    pub value: String,
    /// Where to put it.
    pub location: AuthLocation,
}
