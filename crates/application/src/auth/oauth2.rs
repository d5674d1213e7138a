//! `OAuth2` flows: validation, authorization URL, token exchange.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use httpiness_domain::auth::{ClientAuthentication, OAuth2Config, OAuth2Token, OAuth2Type};
use httpiness_domain::request::{
    FORM_URLENCODED_CONTENT_TYPE, FormRecord, Header, HttpMethod, RequestBody,
};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::error::AuthError;
use super::pkce;
use crate::ports::{AuthWindow, ExecutionResult, RequestExecutor};
use crate::request_resolver::ResolvedRequest;

/// Runs `OAuth2` flows through the executor and the authorization window.
pub struct OAuth2Flow {
    executor: Arc<dyn RequestExecutor>,
    window: Arc<dyn AuthWindow>,
}

impl OAuth2Flow {
    /// Creates a flow runner.
    #[must_use]
    pub fn new(executor: Arc<dyn RequestExecutor>, window: Arc<dyn AuthWindow>) -> Self {
        Self { executor, window }
    }

    /// Obtains a token for an already substituted configuration.
    ///
    /// # Errors
    /// `Validation` before any side effect, `Browser` when the window was
    /// cancelled, `TokenRequest` when the token endpoint failed.
    pub async fn obtain_token(
        &self,
        config: &OAuth2Config,
        now: DateTime<Utc>,
    ) -> Result<OAuth2Token, AuthError> {
        validate(config)?;
        match config.oauth2_type {
            OAuth2Type::AuthorizationCode => self.authorization_code(config, now).await,
            OAuth2Type::Implicit => self.implicit(config, now).await,
            OAuth2Type::ClientCredentials => self.client_credentials(config, now).await,
        }
    }

    async fn authorization_code(
        &self,
        config: &OAuth2Config,
        now: DateTime<Utc>,
    ) -> Result<OAuth2Token, AuthError> {
        let verifier = pkce::generate_verifier();
        let challenge = pkce::challenge(&verifier, config.pkce);
        let url = authorization_url(config, "code", challenge.as_deref())?;

        let code = self.open_window(config, &url, "code").await?;

        let mut records = vec![
            FormRecord::new("grant_type", "authorization_code"),
            FormRecord::new("code", code),
            FormRecord::new("redirect_uri", &config.callback_url),
        ];
        if challenge.is_some() {
            records.push(FormRecord::new("code_verifier", verifier));
        }
        self.exchange(config, records, now).await
    }

    async fn implicit(
        &self,
        config: &OAuth2Config,
        now: DateTime<Utc>,
    ) -> Result<OAuth2Token, AuthError> {
        let url = authorization_url(config, "token", None)?;
        let token = self.open_window(config, &url, "access_token").await?;
        Ok(OAuth2Token::new(token, None, now))
    }

    async fn client_credentials(
        &self,
        config: &OAuth2Config,
        now: DateTime<Utc>,
    ) -> Result<OAuth2Token, AuthError> {
        let mut records = vec![FormRecord::new("grant_type", "client_credentials")];
        if !config.scope.is_empty() {
            records.push(FormRecord::new("scope", &config.scope));
        }
        self.exchange(config, records, now).await
    }

    async fn open_window(
        &self,
        config: &OAuth2Config,
        url: &str,
        expected_key: &str,
    ) -> Result<String, AuthError> {
        let redirect_host = redirect_host(&config.callback_url)?;
        info!(redirect_host, "opening authorization window");
        self.window
            .show_auth_window(url, &redirect_host, expected_key)
            .await
            .ok_or(AuthError::Browser)
    }

    async fn exchange(
        &self,
        config: &OAuth2Config,
        mut records: Vec<FormRecord>,
        now: DateTime<Utc>,
    ) -> Result<OAuth2Token, AuthError> {
        let mut headers = vec![
            Header::new("Content-Type", FORM_URLENCODED_CONTENT_TYPE),
            Header::new("Accept", "application/json"),
        ];
        match config.client_authentication {
            ClientAuthentication::InBody => {
                records.push(FormRecord::new("client_id", &config.client_id));
                records.push(FormRecord::new("client_secret", &config.client_secret));
            }
            ClientAuthentication::BasicHeader => {
                headers.push(Header::new(
                    "Authorization",
                    basic_credentials(&config.client_id, &config.client_secret),
                ));
            }
        }

        let request = ResolvedRequest {
            method: HttpMethod::Post,
            url: config.token_url.clone(),
            headers,
            body: Some(RequestBody::url_encoded(records)),
        };
        debug!(token_url = %config.token_url, "requesting token");
        let result = self.executor.execute(&request).await;
        let (access_token, expires_in) = parse_token_response(&result).inspect_err(|e| {
            warn!(error = %e, "token request failed");
        })?;
        Ok(OAuth2Token::new(access_token, expires_in, now))
    }
}

/// Checks the fields each flow needs.
///
/// # Errors
/// `Validation` naming the first missing field.
pub fn validate(config: &OAuth2Config) -> Result<(), AuthError> {
    let required: Vec<(&str, &str)> = match config.oauth2_type {
        OAuth2Type::AuthorizationCode => vec![
            (config.auth_url.as_str(), "authorization URL"),
            (config.token_url.as_str(), "token URL"),
            (config.client_id.as_str(), "client ID"),
            (config.callback_url.as_str(), "callback URL"),
        ],
        OAuth2Type::Implicit => vec![
            (config.auth_url.as_str(), "authorization URL"),
            (config.client_id.as_str(), "client ID"),
            (config.callback_url.as_str(), "callback URL"),
        ],
        OAuth2Type::ClientCredentials => vec![
            (config.token_url.as_str(), "token URL"),
            (config.client_id.as_str(), "client ID"),
        ],
    };
    if let Some((_, field)) = required.iter().find(|(value, _)| value.trim().is_empty()) {
        return Err(AuthError::Validation(format!("{field} is required")));
    }
    if config.oauth2_type != OAuth2Type::ClientCredentials {
        Url::parse(&config.auth_url)
            .map_err(|e| AuthError::Validation(format!("authorization URL is invalid: {e}")))?;
        redirect_host(&config.callback_url)?;
    }
    Ok(())
}

/// Builds the URL the authorization window opens.
///
/// # Errors
/// `Validation` if the authorization URL does not parse.
pub fn authorization_url(
    config: &OAuth2Config,
    response_type: &str,
    challenge: Option<&str>,
) -> Result<String, AuthError> {
    let mut url = Url::parse(&config.auth_url)
        .map_err(|e| AuthError::Validation(format!("authorization URL is invalid: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", response_type)
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &config.callback_url);
        if !config.scope.is_empty() {
            query.append_pair("scope", &config.scope);
        }
        if !config.state.is_empty() {
            query.append_pair("state", &config.state);
        }
        if let (Some(challenge), Some(method)) = (challenge, config.pkce.as_param()) {
            query
                .append_pair("code_challenge", challenge)
                .append_pair("code_challenge_method", method);
        }
    }
    Ok(url.into())
}

/// Host and optional port of the callback URL.
fn redirect_host(callback_url: &str) -> Result<String, AuthError> {
    let url = Url::parse(callback_url)
        .map_err(|e| AuthError::Validation(format!("callback URL is invalid: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| AuthError::Validation("callback URL has no host".to_string()))?;
    Ok(url
        .port()
        .map_or_else(|| host.to_string(), |port| format!("{host}:{port}")))
}

/// `Basic base64(user:password)`.
#[must_use]
pub fn basic_credentials(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Extracts `access_token` (and `expires_in` when present) from a token
/// endpoint reply: JSON first, then a url-encoded form.
///
/// # Errors
/// `TokenRequest` with `status: body`, or the transport message when no
/// response arrived.
pub fn parse_token_response(result: &ExecutionResult) -> Result<(String, Option<u64>), AuthError> {
    let Some(response) = &result.response else {
        let message = result
            .metadata
            .error_message
            .clone()
            .unwrap_or_else(|| "no response from token endpoint".to_string());
        return Err(AuthError::TokenRequest(message));
    };

    if let Ok(json) = serde_json::from_str::<Value>(&response.body)
        && let Some(token) = json.get("access_token").and_then(Value::as_str)
    {
        let expires_in = json.get("expires_in").and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        });
        return Ok((token.to_string(), expires_in));
    }

    if let Ok(pairs) = serde_urlencoded::from_str::<Vec<(String, String)>>(&response.body)
        && let Some((_, token)) = pairs.iter().find(|(k, _)| k == "access_token")
    {
        let expires_in = pairs
            .iter()
            .find(|(k, _)| k == "expires_in")
            .and_then(|(_, v)| v.parse().ok());
        return Ok((token.clone(), expires_in));
    }

    Err(AuthError::TokenRequest(format!(
        "{}: {}",
        response.status, response.body
    )))
}
