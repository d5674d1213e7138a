//! Request executor port
//!
//! The network I/O itself lives behind this port. Failures are values in
//! the result, never errors or panics.

use std::time::Duration;

use async_trait::async_trait;
use httpiness_domain::request::Header;

use crate::request_resolver::ResolvedRequest;

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers in order.
    pub headers: Vec<Header>,
    /// Body decoded as text.
    pub body: String,
}

impl HttpResponse {
    /// Returns true for a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Side information about an execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionMetadata {
    /// Transport error message when no response arrived.
    pub error_message: Option<String>,
    /// Wall time spent.
    pub duration: Duration,
}

/// Outcome of sending a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The response, if one arrived.
    pub response: Option<HttpResponse>,
    /// Timing and transport error details.
    pub metadata: ExecutionMetadata,
}

impl ExecutionResult {
    /// A result carrying a response.
    #[must_use]
    pub const fn with_response(response: HttpResponse, duration: Duration) -> Self {
        Self {
            response: Some(response),
            metadata: ExecutionMetadata {
                error_message: None,
                duration,
            },
        }
    }

    /// A transport failure.
    #[must_use]
    pub fn failed(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            response: None,
            metadata: ExecutionMetadata {
                error_message: Some(message.into()),
                duration,
            },
        }
    }
}

/// Sends resolved requests.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Sends `request` and reports what happened.
    async fn execute(&self, request: &ResolvedRequest) -> ExecutionResult;
}
