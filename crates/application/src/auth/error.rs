//! Auth resolution errors.

use thiserror::Error;

use crate::ports::SecretsError;

/// Failure to produce an auth value.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field is missing or invalid. Raised before any side effect.
    #[error("invalid auth configuration: {0}")]
    Validation(String),

    /// The token endpoint did not yield a token.
    #[error("token request failed: {0}")]
    TokenRequest(String),

    /// The authorization window was closed or timed out.
    #[error("browser error")]
    Browser,

    /// Reading a variable from the secret store failed.
    #[error(transparent)]
    Secrets(#[from] SecretsError),
}
