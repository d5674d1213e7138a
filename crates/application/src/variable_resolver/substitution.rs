//! `${NAME}` substitution against a collection's variables.

use std::collections::HashMap;

use httpiness_domain::collection::{Collection, SECRET_SERVICE, SENSITIVE_SENTINEL};
use httpiness_domain::macro_text::MacroText;
use tokio::sync::Mutex;
use tracing::debug;

use crate::ports::{SecretStore, SecretsError};

/// Result of substituting the macros of one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionResult {
    /// The string with every closed `${NAME}` replaced.
    pub resolved: String,

    /// Names that had a defined variable.
    pub substituted: Vec<String>,

    /// Names with no variable; they were replaced by the empty string.
    pub unresolved: Vec<String>,
}

impl SubstitutionResult {
    /// Creates a result for input with no macros.
    #[must_use]
    pub fn no_variables(input: &str) -> Self {
        Self {
            resolved: input.to_string(),
            substituted: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    /// Whether every referenced variable was defined.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Reads the resolved value of a variable: the public value, or the secret
/// behind the sentinel (empty when the secret is missing). `None` when the
/// variable is not defined at all.
///
/// # Errors
/// Returns an error if the secret store cannot be read.
pub async fn read_variable(
    collection: &Collection,
    secrets: &dyn SecretStore,
    name: &str,
) -> Result<Option<String>, SecretsError> {
    if !collection.has_variable(name) {
        return Ok(None);
    }
    let public = collection.public_value(name);
    if public != SENSITIVE_SENTINEL {
        return Ok(Some(public.to_string()));
    }
    let secret = secrets
        .get_secret(SECRET_SERVICE, &collection.secret_account(name))
        .await?;
    Ok(Some(secret.unwrap_or_default()))
}

/// Substitutes macros for one resolution session.
///
/// Values are read at most once per session, so a request whose URL,
/// headers and auth share a sensitive variable hits the secret store once.
/// Substitution is lenient: an undefined name becomes the empty string and
/// is reported in [`SubstitutionResult::unresolved`].
pub struct MacroResolver<'a> {
    collection: &'a Collection,
    secrets: &'a dyn SecretStore,
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl<'a> MacroResolver<'a> {
    /// Creates a resolver with an empty cache.
    #[must_use]
    pub fn new(collection: &'a Collection, secrets: &'a dyn SecretStore) -> Self {
        Self {
            collection,
            secrets,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The collection variables are read from.
    #[must_use]
    pub const fn collection(&self) -> &'a Collection {
        self.collection
    }

    /// Resolved value of one variable, cached for the session.
    ///
    /// # Errors
    /// Returns an error if the secret store cannot be read.
    pub async fn value_of(&self, name: &str) -> Result<Option<String>, SecretsError> {
        if let Some(cached) = self.cache.lock().await.get(name) {
            return Ok(cached.clone());
        }
        let value = read_variable(self.collection, self.secrets, name).await?;
        self.cache
            .lock()
            .await
            .insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Substitutes every closed `${NAME}` in `input`.
    ///
    /// Unterminated parameters and `${}` are kept verbatim.
    ///
    /// # Errors
    /// Returns an error if the secret store cannot be read.
    pub async fn substitute(&self, input: &str) -> Result<SubstitutionResult, SecretsError> {
        let text = MacroText::parse(input, false);
        if !text.has_parameters() {
            return Ok(SubstitutionResult::no_variables(input));
        }

        let mut resolved = String::with_capacity(input.len());
        let mut substituted = Vec::new();
        let mut unresolved = Vec::new();

        for segment in text.segments() {
            let name = match segment.parameter_name() {
                Some(name) if segment.is_terminated() && !name.is_empty() => name,
                _ => {
                    resolved.push_str(&segment.text);
                    continue;
                }
            };
            match self.value_of(name).await? {
                Some(value) => {
                    resolved.push_str(&value);
                    push_unique(&mut substituted, name);
                }
                None => push_unique(&mut unresolved, name),
            }
        }

        if !unresolved.is_empty() {
            debug!(?unresolved, "substituted undefined variables with empty strings");
        }

        Ok(SubstitutionResult {
            resolved,
            substituted,
            unresolved,
        })
    }

    /// Shorthand returning only the substituted string.
    ///
    /// # Errors
    /// Returns an error if the secret store cannot be read.
    pub async fn resolve(&self, input: &str) -> Result<String, SecretsError> {
        Ok(self.substitute(input).await?.resolved)
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}
