//! Resolution of request templates into ready-to-send requests.

use httpiness_domain::DomainError;
use httpiness_domain::auth::{AuthLocation, ResolvedAuth};
use httpiness_domain::collection::{Collection, NodeId};
use httpiness_domain::request::{FormEncoding, FormRecord, Header, HttpMethod, RequestBody};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::auth::{AuthError, AuthMode, AuthResolver};
use crate::ports::SecretsError;
use crate::variable_resolver::{MacroResolver, SubstitutionResult, VariableStore};

/// A concrete request with every macro substituted and auth applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Final URL.
    pub url: String,
    /// Headers in order, auth header last.
    pub headers: Vec<Header>,
    /// Body, if any.
    pub body: Option<RequestBody>,
}

/// Failure to resolve a request template.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The node is missing or not a request.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The effective auth could not be resolved.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A sensitive variable could not be read.
    #[error(transparent)]
    Secrets(#[from] SecretsError),

    /// Query placement needs a URL that can carry parameters.
    #[error("cannot add query parameter to {url}: {reason}")]
    InvalidUrl {
        /// The substituted URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Body placement needs a url-encoded form body.
    #[error("auth can only be added to a url-encoded form body")]
    UnsupportedBody,
}

/// A resolved request plus the variable names that were not defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The request.
    pub request: ResolvedRequest,
    /// Undefined variables, substituted as empty strings.
    pub unresolved: Vec<String>,
}

/// Resolves request templates against a collection.
pub struct RequestResolver {
    variables: VariableStore,
    auth: AuthResolver,
}

impl RequestResolver {
    /// Creates a resolver.
    #[must_use]
    pub const fn new(variables: VariableStore, auth: AuthResolver) -> Self {
        Self { variables, auth }
    }

    /// The variable store used for substitution.
    #[must_use]
    pub const fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// The auth resolver, holding the token cache.
    #[must_use]
    pub const fn auth(&self) -> &AuthResolver {
        &self.auth
    }

    /// Resolves for sending, running `OAuth2` flows when needed.
    ///
    /// # Errors
    /// See [`ResolveError`].
    pub async fn resolve(
        &self,
        collection: &Collection,
        request: NodeId,
    ) -> Result<ResolvedRequest, ResolveError> {
        Ok(self
            .resolve_with(collection, request, AuthMode::Interactive)
            .await?
            .request)
    }

    /// Resolves for display. `OAuth2` auth uses only a cached token.
    ///
    /// # Errors
    /// See [`ResolveError`].
    pub async fn preview(
        &self,
        collection: &Collection,
        request: NodeId,
    ) -> Result<Resolution, ResolveError> {
        self.resolve_with(collection, request, AuthMode::CachedOnly)
            .await
    }

    /// Resolves with an explicit auth mode.
    ///
    /// # Errors
    /// See [`ResolveError`].
    pub async fn resolve_with(
        &self,
        collection: &Collection,
        request: NodeId,
        mode: AuthMode,
    ) -> Result<Resolution, ResolveError> {
        let template = collection.tree.request(request)?;
        let raw = template.request();
        let macros = self.variables.resolver(collection);
        let mut unresolved = Vec::new();

        let url = collect(&mut unresolved, macros.substitute(&raw.url).await?);
        let mut headers = Vec::with_capacity(raw.headers.len() + 1);
        for header in &raw.headers {
            let name = collect(&mut unresolved, macros.substitute(&header.name).await?);
            let value = collect(&mut unresolved, macros.substitute(&header.value).await?);
            headers.push(Header::new(name, value));
        }
        let body = match &raw.body {
            Some(body) => Some(substitute_body(&macros, body, &mut unresolved).await?),
            None => None,
        };

        let mut resolved = ResolvedRequest {
            method: raw.method,
            url,
            headers,
            body,
        };

        if let Some(auth_id) = collection.tree.effective_auth(request) {
            let auth = collection.tree.auth(auth_id)?;
            for name in auth.macro_names() {
                if !collection.has_variable(&name) && !unresolved.contains(&name) {
                    unresolved.push(name);
                }
            }
            if let Some(value) = self.auth.resolve(&macros, auth, mode).await? {
                apply_auth(&mut resolved, value)?;
            }
        }

        debug!(
            method = %resolved.method,
            url = %resolved.url,
            unresolved = unresolved.len(),
            "request resolved"
        );
        Ok(Resolution {
            request: resolved,
            unresolved,
        })
    }
}

fn collect(unresolved: &mut Vec<String>, result: SubstitutionResult) -> String {
    for name in result.unresolved {
        if !unresolved.contains(&name) {
            unresolved.push(name);
        }
    }
    result.resolved
}

async fn substitute_body(
    macros: &MacroResolver<'_>,
    body: &RequestBody,
    unresolved: &mut Vec<String>,
) -> Result<RequestBody, SecretsError> {
    Ok(match body {
        RequestBody::Regular { text } => RequestBody::Regular {
            text: collect(unresolved, macros.substitute(text).await?),
        },
        RequestBody::Form { encoding, records } => {
            let mut substituted = Vec::with_capacity(records.len());
            for record in records {
                substituted.push(FormRecord::new(
                    collect(unresolved, macros.substitute(&record.name).await?),
                    collect(unresolved, macros.substitute(&record.value).await?),
                ));
            }
            RequestBody::Form {
                encoding: *encoding,
                records: substituted,
            }
        }
    })
}

/// Inserts a resolved auth value at its location.
///
/// # Errors
/// `InvalidUrl` for query placement on a URL that cannot carry a query,
/// `UnsupportedBody` for body placement on a non url-encoded body.
pub fn apply_auth(request: &mut ResolvedRequest, auth: ResolvedAuth) -> Result<(), ResolveError> {
    match auth.location {
        AuthLocation::Header => request.headers.push(Header::new(auth.name, auth.value)),
        AuthLocation::Query => {
            request.url = add_query_param(&request.url, &auth.name, &auth.value)?;
        }
        AuthLocation::Body => {
            let record = FormRecord::new(auth.name, auth.value);
            match &mut request.body {
                None => request.body = Some(RequestBody::url_encoded(vec![record])),
                Some(RequestBody::Form {
                    encoding: FormEncoding::UrlEncoded,
                    records,
                }) => records.push(record),
                Some(_) => return Err(ResolveError::UnsupportedBody),
            }
        }
    }
    Ok(())
}

fn add_query_param(url: &str, name: &str, value: &str) -> Result<String, ResolveError> {
    let invalid = |reason: String| ResolveError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let mut parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if parsed.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a query".to_string()));
    }
    parsed.query_pairs_mut().append_pair(name, value);
    Ok(parsed.into())
}
