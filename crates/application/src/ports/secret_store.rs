//! Secret store port
//!
//! An opaque key/value credential service addressed by service and account.

use async_trait::async_trait;

/// Errors that can occur during secret operations.
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backing service refused or is not reachable.
    #[error("secret service unavailable: {0}")]
    Unavailable(String),
}

/// Credential storage keyed by `(service, account)`.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Stores or replaces a secret.
    ///
    /// # Errors
    /// Returns an error if the secret cannot be persisted.
    async fn set_secret(&self, service: &str, account: &str, value: &str)
    -> Result<(), SecretsError>;

    /// Reads a secret. A missing entry is `Ok(None)`.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    async fn get_secret(&self, service: &str, account: &str)
    -> Result<Option<String>, SecretsError>;

    /// Deletes a secret. Deleting a missing entry succeeds.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    async fn delete_secret(&self, service: &str, account: &str) -> Result<(), SecretsError>;
}
