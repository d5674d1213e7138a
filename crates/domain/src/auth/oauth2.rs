//! `OAuth2` configuration and token types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which `OAuth2` grant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OAuth2Type {
    /// Browser authorization followed by a code exchange.
    #[default]
    AuthorizationCode,
    /// Browser authorization returning the token directly.
    Implicit,
    /// Direct token request with client credentials.
    ClientCredentials,
}

/// PKCE challenge method for the authorization code flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PkceMethod {
    /// No PKCE.
    #[default]
    None,
    /// Challenge equals the verifier.
    #[serde(rename = "plain")]
    Plain,
    /// Challenge is the base64url SHA-256 digest of the verifier.
    #[serde(rename = "S256")]
    S256,
}

impl PkceMethod {
    /// Returns the `code_challenge_method` parameter value.
    #[must_use]
    pub const fn as_param(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Plain => Some("plain"),
            Self::S256 => Some("S256"),
        }
    }
}

/// How the client authenticates against the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClientAuthentication {
    /// `client_secret` is sent in the form body.
    #[default]
    InBody,
    /// `client_id:client_secret` is sent as a Basic `Authorization` header.
    BasicHeader,
}

/// `OAuth2` flow parameters. Every string may contain `${macros}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OAuth2Config {
    /// The grant to run.
    pub oauth2_type: OAuth2Type,
    /// Redirect URI registered with the provider.
    pub callback_url: String,
    /// Authorization endpoint.
    pub auth_url: String,
    /// Token endpoint.
    pub token_url: String,
    /// Client identifier.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Space-separated scopes.
    pub scope: String,
    /// Opaque state echoed by the provider.
    pub state: String,
    /// PKCE challenge method.
    pub pkce: PkceMethod,
    /// Token endpoint client authentication mode.
    pub client_authentication: ClientAuthentication,
}

impl OAuth2Config {
    /// Returns every templated string field, in declaration order.
    #[must_use]
    pub fn template_fields(&self) -> Vec<&str> {
        vec![
            self.callback_url.as_str(),
            self.auth_url.as_str(),
            self.token_url.as_str(),
            self.client_id.as_str(),
            self.client_secret.as_str(),
            self.scope.as_str(),
            self.state.as_str(),
        ]
    }
}

/// An access token with expiry metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Token {
    /// The access token string
    pub access_token: String,
    /// When the token expires (if known)
    pub expires_at: Option<DateTime<Utc>>,
    /// When this token was obtained
    pub obtained_at: DateTime<Utc>,
}

impl OAuth2Token {
    /// Creates a token obtained at `now`.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        expires_in_secs: Option<u64>,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = expires_in_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| now + chrono::Duration::seconds(secs));
        Self {
            access_token: access_token.into(),
            expires_at,
            obtained_at: now,
        }
    }

    /// Check if the token is expired at `now` or will expire within the buffer.
    #[must_use]
    pub fn is_expired_or_expiring(&self, now: DateTime<Utc>, buffer_seconds: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now + chrono::Duration::seconds(buffer_seconds) >= expires_at)
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}
