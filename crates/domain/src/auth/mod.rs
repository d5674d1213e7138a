//! Authentication domain types

mod oauth2;
mod types;

pub use oauth2::{ClientAuthentication, OAuth2Config, OAuth2Token, OAuth2Type, PkceMethod};
pub use types::{AUTHORIZATION_HEADER, AuthDefinition, AuthLocation, AuthTemplate, ResolvedAuth};
