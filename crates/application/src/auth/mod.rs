//! Authentication: auth resolution, `OAuth2` flows and the token cache.

mod error;
mod oauth2;
mod pkce;
mod resolver;
mod token_store;

pub use error::AuthError;
pub use oauth2::{OAuth2Flow, authorization_url, basic_credentials, parse_token_response, validate};
pub use pkce::{challenge, generate_verifier};
pub use resolver::{AuthMode, AuthResolver};
pub use token_store::TokenStore;
