//! Request executor implementation using reqwest.
//!
//! Transport failures are turned into [`ExecutionResult::failed`] values;
//! this adapter never returns an error or panics.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use httpiness_application::ResolvedRequest;
use httpiness_application::ports::{ExecutionResult, HttpResponse, RequestExecutor};
use httpiness_domain::request::{
    FORM_URLENCODED_CONTENT_TYPE, FormEncoding, FormRecord, Header, HttpMethod, RequestBody,
    find_header,
};
use reqwest::{Client, Method, Url};
use tracing::debug;

/// Default overall request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request executor backed by a shared `reqwest::Client`.
pub struct ReqwestExecutor {
    client: Client,
    timeout: Duration,
}

impl ReqwestExecutor {
    /// Creates an executor with the default timeout.
    ///
    /// Default configuration:
    /// - Timeout: 30 seconds
    /// - Follow redirects: up to 10
    /// - User-Agent: "httpiness/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates an executor with a custom overall timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("httpiness/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }

    /// Wraps an already configured client.
    #[must_use]
    pub const fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn attach_body(
        builder: reqwest::RequestBuilder,
        headers: &[Header],
        body: &RequestBody,
    ) -> Result<reqwest::RequestBuilder, String> {
        match body {
            RequestBody::Regular { text } => Ok(builder.body(text.clone())),
            RequestBody::Form {
                encoding: FormEncoding::UrlEncoded,
                records,
            } => {
                let encoded = encode_form(records)?;
                let builder = if find_header(headers, "Content-Type").is_none() {
                    builder.header("Content-Type", FORM_URLENCODED_CONTENT_TYPE)
                } else {
                    builder
                };
                Ok(builder.body(encoded))
            }
            RequestBody::Form {
                encoding: FormEncoding::Multipart,
                records,
            } => {
                let form = records
                    .iter()
                    .fold(reqwest::multipart::Form::new(), |form, record| {
                        form.text(record.name.clone(), record.value.clone())
                    });
                Ok(builder.multipart(form))
            }
        }
    }

    fn describe(&self, error: &reqwest::Error) -> String {
        if error.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs())
        } else if error.is_connect() {
            format!("connection failed: {error}")
        } else if error.is_redirect() {
            "too many redirects".to_string()
        } else {
            error.to_string()
        }
    }
}

/// Encodes form records as `application/x-www-form-urlencoded`.
///
/// # Errors
///
/// Returns the encoder message if a record cannot be encoded.
pub fn encode_form(records: &[FormRecord]) -> Result<String, String> {
    let pairs: Vec<(&str, &str)> = records
        .iter()
        .map(|r| (r.name.as_str(), r.value.as_str()))
        .collect();
    serde_urlencoded::to_string(pairs).map_err(|e| format!("cannot encode form: {e}"))
}

#[async_trait]
impl RequestExecutor for ReqwestExecutor {
    async fn execute(&self, request: &ResolvedRequest) -> ExecutionResult {
        let start = Instant::now();

        let url = match Url::parse(&request.url) {
            Ok(url) => url,
            Err(e) => {
                return ExecutionResult::failed(
                    format!("invalid URL {}: {e}", request.url),
                    start.elapsed(),
                );
            }
        };

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url);
        for header in &request.headers {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some(body) = &request.body {
            builder = match Self::attach_body(builder, &request.headers, body) {
                Ok(builder) => builder,
                Err(message) => return ExecutionResult::failed(message, start.elapsed()),
            };
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return ExecutionResult::failed(self.describe(&e), start.elapsed()),
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                Header::new(
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return ExecutionResult::failed(
                    format!("failed to read body: {e}"),
                    start.elapsed(),
                );
            }
        };

        let duration = start.elapsed();
        debug!(status, elapsed_ms = duration.as_millis(), "response received");
        ExecutionResult::with_response(
            HttpResponse {
                status,
                headers,
                body,
            },
            duration,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers one connection with `response` and hands back the raw request.
    async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buffer = vec![0u8; 8192];
            let mut received = Vec::new();
            loop {
                let n = stream.read(&mut buffer).await.unwrap();
                received.extend_from_slice(&buffer[..n]);
                let text = String::from_utf8_lossy(&received);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if received.len() >= head_end + 4 + length || n == 0 {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&received).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(ReqwestExecutor::to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(ReqwestExecutor::to_reqwest_method(HttpMethod::Post), Method::POST);
        assert_eq!(
            ReqwestExecutor::to_reqwest_method(HttpMethod::Options),
            Method::OPTIONS
        );
    }

    #[test]
    fn test_encode_form() {
        let records = vec![FormRecord::new("a b", "1&2"), FormRecord::new("c", "")];
        assert_eq!(encode_form(&records).unwrap(), "a+b=1%262&c=");
    }

    #[tokio::test]
    async fn test_sends_form_and_reads_response() {
        let (base, server) = serve_once(
            "HTTP/1.1 201 Created\r\nContent-Type: text/plain\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
        )
        .await;
        let request = ResolvedRequest {
            method: HttpMethod::Post,
            url: format!("{base}/login"),
            headers: vec![Header::new("X-Trace", "1")],
            body: Some(RequestBody::url_encoded(vec![FormRecord::new("user", "al ice")])),
        };

        let result = ReqwestExecutor::new().unwrap().execute(&request).await;
        let response = result.response.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body, "ok");
        assert!(
            response
                .headers
                .iter()
                .any(|h| h.name == "content-type" && h.value == "text/plain")
        );

        let raw = server.await.unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("post /login http/1.1"));
        assert!(raw.contains("x-trace: 1"));
        assert!(raw.contains("content-type: application/x-www-form-urlencoded"));
        assert!(raw.ends_with("user=al+ice"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_value() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = ResolvedRequest {
            method: HttpMethod::Get,
            url: format!("http://{addr}/"),
            headers: Vec::new(),
            body: None,
        };
        let result = ReqwestExecutor::new().unwrap().execute(&request).await;
        assert!(result.response.is_none());
        assert!(result.metadata.error_message.is_some());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let request = ResolvedRequest {
            method: HttpMethod::Get,
            url: "not a url".to_string(),
            headers: Vec::new(),
            body: None,
        };
        let result = ReqwestExecutor::new().unwrap().execute(&request).await;
        assert!(
            result
                .metadata
                .error_message
                .unwrap()
                .starts_with("invalid URL not a url")
        );
    }
}
