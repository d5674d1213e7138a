//! Authorization window port

use async_trait::async_trait;

/// Shows an authorization page and captures the redirect.
#[async_trait]
pub trait AuthWindow: Send + Sync {
    /// Opens `url` and waits for a redirect to `redirect_host`.
    ///
    /// Returns the value of the `expected_query_key` parameter of the
    /// redirect (query or fragment), or `None` if the user cancelled or the
    /// wait timed out.
    async fn show_auth_window(
        &self,
        url: &str,
        redirect_host: &str,
        expected_query_key: &str,
    ) -> Option<String>;
}
