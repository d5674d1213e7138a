//! Turns auth templates into concrete values.

use std::sync::Arc;

use httpiness_domain::auth::{
    AUTHORIZATION_HEADER, AuthDefinition, AuthTemplate, OAuth2Config, ResolvedAuth,
};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::error::AuthError;
use super::oauth2::{OAuth2Flow, basic_credentials};
use super::token_store::TokenStore;
use crate::ports::{AuthWindow, Clock, RequestExecutor, SecretsError};
use crate::variable_resolver::MacroResolver;

/// Whether resolution may run interactive or networked `OAuth2` steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Run the full flow when no cached token is usable.
    Interactive,
    /// Use a cached token or leave the auth out.
    CachedOnly,
}

/// Resolves auth templates, caching `OAuth2` tokens between sends.
pub struct AuthResolver {
    flow: OAuth2Flow,
    tokens: TokenStore,
    clock: Arc<dyn Clock>,
}

impl AuthResolver {
    /// Creates a resolver with an empty token cache.
    #[must_use]
    pub fn new(
        executor: Arc<dyn RequestExecutor>,
        window: Arc<dyn AuthWindow>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            flow: OAuth2Flow::new(executor, window),
            tokens: TokenStore::new(),
            clock,
        }
    }

    /// The token cache.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Drops every cached token.
    pub async fn clear_tokens(&self) {
        self.tokens.clear().await;
    }

    /// Resolves `template` into a name/value pair and its location.
    ///
    /// `None` definitions and, in [`AuthMode::CachedOnly`], `OAuth2` auths
    /// without a usable cached token yield `Ok(None)`. Undefined variables
    /// substitute as empty strings.
    ///
    /// # Errors
    /// See [`AuthError`].
    pub async fn resolve(
        &self,
        macros: &MacroResolver<'_>,
        template: &AuthTemplate,
        mode: AuthMode,
    ) -> Result<Option<ResolvedAuth>, AuthError> {
        let (name, value) = match &template.definition {
            AuthDefinition::None => return Ok(None),
            AuthDefinition::ApiKey { key, value } => {
                let (key, value) = tokio::join!(macros.resolve(key), macros.resolve(value));
                (key?, value?)
            }
            AuthDefinition::Basic { username, password } => {
                let (username, password) =
                    tokio::join!(macros.resolve(username), macros.resolve(password));
                (
                    AUTHORIZATION_HEADER.to_string(),
                    basic_credentials(&username?, &password?),
                )
            }
            AuthDefinition::Bearer { token } => (
                AUTHORIZATION_HEADER.to_string(),
                format!("Bearer {}", macros.resolve(token).await?),
            ),
            AuthDefinition::OAuth2(config) => {
                let config = substitute_config(macros, config).await?;
                let Some(header) = self.oauth2_header(&config, mode).await? else {
                    return Ok(None);
                };
                (AUTHORIZATION_HEADER.to_string(), header)
            }
        };

        Ok(Some(ResolvedAuth {
            name,
            value,
            location: template.effective_location(),
        }))
    }

    async fn oauth2_header(
        &self,
        config: &OAuth2Config,
        mode: AuthMode,
    ) -> Result<Option<String>, AuthError> {
        let key = cache_key(config);
        let now = self.clock.now();
        if let Some(token) = self.tokens.get_valid(&key, now).await {
            debug!(cache_key = %key, "reusing cached token");
            return Ok(Some(token.authorization_header()));
        }
        if mode == AuthMode::CachedOnly {
            debug!(cache_key = %key, "no cached token, leaving auth out");
            return Ok(None);
        }
        let token = self.flow.obtain_token(config, now).await?;
        let header = token.authorization_header();
        self.tokens.store(key, token).await;
        Ok(Some(header))
    }
}

/// Key identifying a token obtained with a substituted configuration.
///
/// Every parameter feeds the digest, so auths differing in any field never
/// share a token and the client secret never appears in logs.
fn cache_key(config: &OAuth2Config) -> String {
    let mut hasher = Sha256::new();
    hasher.update(
        format!(
            "{:?}|{:?}|{:?}",
            config.oauth2_type, config.pkce, config.client_authentication
        )
        .as_bytes(),
    );
    for field in config.template_fields() {
        hasher.update([0x1f]);
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Substitutes every string field of an `OAuth2` configuration concurrently.
async fn substitute_config(
    macros: &MacroResolver<'_>,
    config: &OAuth2Config,
) -> Result<OAuth2Config, SecretsError> {
    let (callback_url, auth_url, token_url, client_id, client_secret, scope, state) = tokio::join!(
        macros.resolve(&config.callback_url),
        macros.resolve(&config.auth_url),
        macros.resolve(&config.token_url),
        macros.resolve(&config.client_id),
        macros.resolve(&config.client_secret),
        macros.resolve(&config.scope),
        macros.resolve(&config.state),
    );
    Ok(OAuth2Config {
        oauth2_type: config.oauth2_type,
        callback_url: callback_url?,
        auth_url: auth_url?,
        token_url: token_url?,
        client_id: client_id?,
        client_secret: client_secret?,
        scope: scope?,
        state: state?,
        pkce: config.pkce,
        client_authentication: config.client_authentication,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testing::{FixedClock, FixedWindow, MemorySecrets, ScriptedExecutor};
    use httpiness_domain::auth::{AuthLocation, OAuth2Type, PkceMethod};
    use httpiness_domain::collection::Collection;
    use pretty_assertions::assert_eq;

    fn resolver(executor: Arc<ScriptedExecutor>) -> AuthResolver {
        AuthResolver::new(
            executor,
            FixedWindow::answering(None),
            Arc::new(FixedClock::default()),
        )
    }

    fn collection() -> Collection {
        let mut collection = Collection::with_uuid("api", "u-1");
        collection.set_public_value("USER", "alice");
        collection.set_public_value("PASS", "pw");
        collection.set_public_value("TOKEN", "t0k");
        collection.set_public_value("IDP", "https://idp.example.com");
        collection
    }

    #[tokio::test]
    async fn test_simple_definitions() {
        let collection = collection();
        let secrets = MemorySecrets::default();
        let macros = MacroResolver::new(&collection, &secrets);
        let auth = resolver(Arc::new(ScriptedExecutor::default()));

        let basic = AuthTemplate::new(AuthDefinition::basic("${USER}", "${PASS}"));
        let resolved = auth
            .resolve(&macros, &basic, AuthMode::Interactive)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.name, "Authorization");
        assert_eq!(resolved.value, "Basic YWxpY2U6cHc=");
        assert_eq!(resolved.location, AuthLocation::Header);

        let bearer = AuthTemplate::new(AuthDefinition::bearer("${TOKEN}"));
        let resolved = auth
            .resolve(&macros, &bearer, AuthMode::Interactive)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.value, "Bearer t0k");

        let key = AuthTemplate::new(AuthDefinition::api_key("X-Api-Key", "${MISSING}"))
            .with_location(AuthLocation::Query);
        let resolved = auth
            .resolve(&macros, &key, AuthMode::Interactive)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.name, "X-Api-Key");
        assert_eq!(resolved.value, "");
        assert_eq!(resolved.location, AuthLocation::Query);

        let none = AuthTemplate::new(AuthDefinition::None);
        assert!(
            auth.resolve(&macros, &none, AuthMode::Interactive)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_oauth2_token_cached_between_sends() {
        let collection = collection();
        let secrets = MemorySecrets::default();
        let macros = MacroResolver::new(&collection, &secrets);
        let executor = Arc::new(ScriptedExecutor::replying(vec![ScriptedExecutor::json(
            200,
            r#"{"access_token":"cc-token","expires_in":3600}"#,
        )]));
        let auth = resolver(executor.clone());
        let template = AuthTemplate::new(AuthDefinition::OAuth2(OAuth2Config {
            oauth2_type: OAuth2Type::ClientCredentials,
            token_url: "${IDP}/token".to_string(),
            client_id: "app".to_string(),
            ..OAuth2Config::default()
        }));

        assert!(
            auth.resolve(&macros, &template, AuthMode::CachedOnly)
                .await
                .unwrap()
                .is_none()
        );

        for _ in 0..2 {
            let resolved = auth
                .resolve(&macros, &template, AuthMode::Interactive)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(resolved.value, "Bearer cc-token");
        }
        let sent = executor.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://idp.example.com/token");
        drop(sent);

        let cached = auth
            .resolve(&macros, &template, AuthMode::CachedOnly)
            .await
            .unwrap();
        assert!(cached.is_some());

        auth.clear_tokens().await;
        assert_eq!(auth.tokens().count().await, 0);
    }

    #[test]
    fn test_cache_key_covers_every_parameter() {
        let base = OAuth2Config {
            oauth2_type: OAuth2Type::AuthorizationCode,
            callback_url: "http://localhost:8080/cb".to_string(),
            auth_url: "https://idp/auth".to_string(),
            token_url: "https://idp/token".to_string(),
            client_id: "app".to_string(),
            client_secret: "s1".to_string(),
            ..OAuth2Config::default()
        };
        assert_eq!(cache_key(&base), cache_key(&base));

        let variants = [
            OAuth2Config {
                token_url: "https://other/token".to_string(),
                ..base.clone()
            },
            OAuth2Config {
                client_secret: "s2".to_string(),
                ..base.clone()
            },
            OAuth2Config {
                callback_url: "http://localhost:9090/cb".to_string(),
                ..base.clone()
            },
            OAuth2Config {
                pkce: PkceMethod::S256,
                ..base.clone()
            },
            OAuth2Config {
                oauth2_type: OAuth2Type::Implicit,
                ..base.clone()
            },
        ];
        for variant in &variants {
            assert_ne!(cache_key(variant), cache_key(&base), "{variant:?}");
        }
        assert!(!cache_key(&base).contains("s1"));
    }

    #[tokio::test]
    async fn test_oauth2_validation_error() {
        let collection = collection();
        let secrets = MemorySecrets::default();
        let macros = MacroResolver::new(&collection, &secrets);
        let executor = Arc::new(ScriptedExecutor::default());
        let auth = resolver(executor.clone());
        let template = AuthTemplate::new(AuthDefinition::OAuth2(OAuth2Config {
            oauth2_type: OAuth2Type::ClientCredentials,
            token_url: "${UNDEFINED}".to_string(),
            client_id: "app".to_string(),
            ..OAuth2Config::default()
        }));

        let err = auth
            .resolve(&macros, &template, AuthMode::Interactive)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(executor.sent.lock().await.is_empty());
    }
}
