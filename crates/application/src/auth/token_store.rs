//! In-memory `OAuth2` token cache with expiry tracking.
//!
//! Tokens are keyed by the substituted flow parameters, so two requests
//! sharing an auth reuse one token until it expires.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use httpiness_domain::OAuth2Token;
use tokio::sync::RwLock;

/// Seconds before expiry at which a token stops being handed out.
const EXPIRY_BUFFER_SECONDS: i64 = 30;

/// Thread-safe in-memory token store.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Arc<RwLock<HashMap<String, OAuth2Token>>>,
}

impl TokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a token with the given key.
    pub async fn store(&self, key: String, token: OAuth2Token) {
        self.tokens.write().await.insert(key, token);
    }

    /// Get a token that is still usable at `now`.
    pub async fn get_valid(&self, key: &str, now: DateTime<Utc>) -> Option<OAuth2Token> {
        let tokens = self.tokens.read().await;
        tokens
            .get(key)
            .filter(|t| !t.is_expired_or_expiring(now, EXPIRY_BUFFER_SECONDS))
            .cloned()
    }

    /// Clear all tokens.
    pub async fn clear(&self) {
        self.tokens.write().await.clear();
    }

    /// Get count of stored tokens.
    pub async fn count(&self) -> usize {
        self.tokens.read().await.len()
    }
}
