//! Raw (templated) request definition

use serde::{Deserialize, Serialize};

use super::{Header, HttpMethod, RequestBody, find_header};

/// Content-Type of url-encoded form data.
pub const FORM_URLENCODED_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The stored, parameterized form of an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RawRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Target URL (may contain `${macros}`)
    pub url: String,
    /// HTTP headers in order
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Request body; `None` unless the method is POST or PUT
    #[serde(default)]
    pub body: Option<RequestBody>,
}

impl RawRequest {
    /// Creates a request with no headers and no body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// Sets the body. Ignored for methods that carry no body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        if self.method.has_body() {
            self.body = Some(body);
        }
        self
    }

    /// Returns the Content-Type header value, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        find_header(&self.headers, "Content-Type").map(|h| h.value.as_str())
    }

    /// Returns true if the Content-Type header declares url-encoded form data.
    #[must_use]
    pub fn declares_form_urlencoded(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with(FORM_URLENCODED_CONTENT_TYPE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_body_respects_method() {
        let get = RawRequest::new(HttpMethod::Get, "https://x").with_body(RequestBody::regular("a"));
        assert!(get.body.is_none());

        let post =
            RawRequest::new(HttpMethod::Post, "https://x").with_body(RequestBody::regular("a"));
        assert!(post.body.is_some());
    }

    #[test]
    fn test_declares_form_urlencoded() {
        let request = RawRequest::new(HttpMethod::Post, "https://x")
            .with_header("content-type", "application/x-www-form-urlencoded; charset=utf-8");
        assert!(request.declares_form_urlencoded());

        let request = RawRequest::new(HttpMethod::Post, "https://x")
            .with_header("Content-Type", "application/json");
        assert!(!request.declares_form_urlencoded());
    }
}
