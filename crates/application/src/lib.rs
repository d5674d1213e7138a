//! # httpiness Application
//!
//! Use cases and ports for the httpiness request authoring core.
//!
//! This crate contains:
//! - **Ports**: traits for secrets, HTTP execution, the authorization
//!   window, document storage, files and time
//! - **Variable resolution**: the variable store and `${NAME}` substitution
//! - **Auth**: static schemes, `OAuth2` flows with PKCE and a token cache
//! - **Request resolution**: turning templates into sendable requests
//! - **Use cases**: open, save, send and preview
//! - **Session**: the open-collection registry and the node clipboard

pub mod auth;
pub mod error;
pub mod ports;
pub mod request_resolver;
pub mod session;
pub mod use_cases;
pub mod variable_resolver;

#[cfg(test)]
mod testing;

pub use error::{ApplicationError, ApplicationResult};
pub use request_resolver::{Resolution, ResolveError, RequestResolver, ResolvedRequest};
