//! Send and preview request use cases.

use std::sync::Arc;

use httpiness_domain::collection::{Collection, NodeId};
use tracing::{info, warn};

use crate::ports::{ExecutionResult, RequestExecutor};
use crate::request_resolver::{RequestResolver, Resolution, ResolveError};

/// Use case for resolving a request template and sending it.
pub struct SendRequest {
    resolver: Arc<RequestResolver>,
    executor: Arc<dyn RequestExecutor>,
}

impl SendRequest {
    /// Creates a new `SendRequest` use case.
    #[must_use]
    pub fn new(resolver: Arc<RequestResolver>, executor: Arc<dyn RequestExecutor>) -> Self {
        Self { resolver, executor }
    }

    /// Resolves the request, running `OAuth2` flows if needed, and sends it.
    ///
    /// Transport failures are reported inside the returned result.
    ///
    /// # Errors
    /// Returns error if the request cannot be resolved.
    pub async fn execute(
        &self,
        collection: &Collection,
        request: NodeId,
    ) -> Result<ExecutionResult, ResolveError> {
        let resolved = self.resolver.resolve(collection, request).await?;
        let result = self.executor.execute(&resolved).await;
        match (&result.response, &result.metadata.error_message) {
            (Some(response), _) => info!(
                method = %resolved.method,
                url = %resolved.url,
                status = response.status,
                elapsed_ms = result.metadata.duration.as_millis(),
                "request sent"
            ),
            (None, message) => warn!(
                method = %resolved.method,
                url = %resolved.url,
                error = message.as_deref().unwrap_or("no response"),
                "request failed"
            ),
        }
        Ok(result)
    }
}

/// Use case for showing what a request would send, without side effects.
pub struct PreviewRequest {
    resolver: Arc<RequestResolver>,
}

impl PreviewRequest {
    /// Creates a new `PreviewRequest` use case.
    #[must_use]
    pub const fn new(resolver: Arc<RequestResolver>) -> Self {
        Self { resolver }
    }

    /// Resolves the request. `OAuth2` auth appears only if a token is cached.
    ///
    /// # Errors
    /// Returns error if the request cannot be resolved.
    pub async fn execute(
        &self,
        collection: &Collection,
        request: NodeId,
    ) -> Result<Resolution, ResolveError> {
        self.resolver.preview(collection, request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::auth::AuthResolver;
    use crate::testing::{FixedClock, FixedWindow, MemorySecrets, ScriptedExecutor};
    use crate::variable_resolver::VariableStore;
    use httpiness_domain::auth::{AuthDefinition, AuthTemplate, OAuth2Config, OAuth2Type};
    use httpiness_domain::collection::RequestTemplate;
    use httpiness_domain::request::{Header, HttpMethod, RawRequest};
    use pretty_assertions::assert_eq;

    fn collection() -> (Collection, NodeId) {
        let mut collection = Collection::new("api");
        collection.set_public_value("HOST", "example.com");
        let root = collection.tree.root();
        let id = collection
            .tree
            .insert_request(
                root,
                "Ping",
                RequestTemplate::new(RawRequest::new(HttpMethod::Get, "https://${HOST}/ping")),
            )
            .unwrap();
        collection
            .tree
            .set_embedded_auth(
                id,
                "OAuth",
                AuthTemplate::new(AuthDefinition::OAuth2(OAuth2Config {
                    oauth2_type: OAuth2Type::ClientCredentials,
                    token_url: "https://idp/token".to_string(),
                    client_id: "app".to_string(),
                    ..OAuth2Config::default()
                })),
            )
            .unwrap();
        (collection, id)
    }

    fn resolver(executor: Arc<ScriptedExecutor>) -> Arc<RequestResolver> {
        Arc::new(RequestResolver::new(
            VariableStore::new(Arc::new(MemorySecrets::default())),
            AuthResolver::new(
                executor,
                FixedWindow::answering(None),
                Arc::new(FixedClock::default()),
            ),
        ))
    }

    #[tokio::test]
    async fn test_send_fetches_token_then_reuses_it() {
        let (collection, id) = collection();
        let auth_executor = Arc::new(ScriptedExecutor::replying(vec![ScriptedExecutor::json(
            200,
            r#"{"access_token":"tok","expires_in":3600}"#,
        )]));
        let http = Arc::new(ScriptedExecutor::replying(vec![
            ScriptedExecutor::json(204, ""),
            ScriptedExecutor::json(204, ""),
        ]));
        let resolver = resolver(auth_executor.clone());
        let send = SendRequest::new(resolver.clone(), http.clone());

        let first = send.execute(&collection, id).await.unwrap();
        assert_eq!(first.response.map(|r| r.status), Some(204));
        send.execute(&collection, id).await.unwrap();

        assert_eq!(auth_executor.sent.lock().await.len(), 1);
        let sent = http.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].url, "https://example.com/ping");
        assert_eq!(
            sent[1].headers,
            vec![Header::new("Authorization", "Bearer tok")]
        );

        let preview = PreviewRequest::new(resolver).execute(&collection, id).await.unwrap();
        assert_eq!(preview.request, sent[1]);
    }

    #[tokio::test]
    async fn test_transport_failure_is_a_value() {
        let (mut collection, id) = collection();
        collection.tree.clear_auth(id).unwrap();
        let http = Arc::new(ScriptedExecutor::default());
        let send = SendRequest::new(resolver(Arc::new(ScriptedExecutor::default())), http);

        let result = send.execute(&collection, id).await.unwrap();
        assert!(result.response.is_none());
        assert_eq!(
            result.metadata.error_message.as_deref(),
            Some("no scripted response")
        );
    }
}
