//! Authorization window served on a loopback listener.
//!
//! The authorization URL is opened in the system browser and the redirect
//! is captured by a one-shot HTTP listener bound to the callback host.
//! Tokens returned in the URL fragment (implicit flow) never reach the
//! server, so a bare redirect is answered with a page that resubmits the
//! fragment as a query string.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use httpiness_application::ports::AuthWindow;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

const FRAGMENT_PAGE: &str = "<!doctype html><html><body><script>\
if (location.hash.length > 1) { location.replace(location.pathname + '?' + location.hash.substring(1)); }\
else { document.body.textContent = 'Authorization response is missing.'; }\
</script></body></html>";

const DONE_PAGE: &str =
    "<!doctype html><html><body>Authorization complete. You can close this window.</body></html>";

const FAILED_PAGE: &str =
    "<!doctype html><html><body>Authorization failed. You can close this window.</body></html>";

/// [`AuthWindow`] using the system browser and a loopback listener.
#[derive(Debug, Clone)]
pub struct LoopbackAuthWindow {
    timeout: Duration,
    default_port: u16,
    open_browser: bool,
}

impl LoopbackAuthWindow {
    /// Creates a window that gives up after `timeout`. `default_port` is
    /// used when the callback host names no port.
    #[must_use]
    pub const fn new(timeout: Duration, default_port: u16) -> Self {
        Self {
            timeout,
            default_port,
            open_browser: true,
        }
    }

    /// Only logs the authorization URL instead of launching a browser.
    #[must_use]
    pub const fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    fn bind_address(&self, redirect_host: &str) -> String {
        let has_port = redirect_host
            .rsplit_once(':')
            .is_some_and(|(_, port)| port.parse::<u16>().is_ok());
        if has_port {
            redirect_host.to_string()
        } else {
            format!("{redirect_host}:{}", self.default_port)
        }
    }
}

#[async_trait]
impl AuthWindow for LoopbackAuthWindow {
    async fn show_auth_window(
        &self,
        url: &str,
        redirect_host: &str,
        expected_query_key: &str,
    ) -> Option<String> {
        let address = self.bind_address(redirect_host);
        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(e) => {
                warn!(address = %address, error = %e, "cannot listen for the authorization redirect");
                return None;
            }
        };

        info!(url, "open this URL to authorize");
        if self.open_browser
            && let Err(e) = launch_browser(url).await
        {
            warn!(error = %e, "could not launch a browser");
        }

        match tokio::time::timeout(self.timeout, capture(&listener, expected_query_key)).await {
            Ok(value) => value,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "authorization timed out");
                None
            }
        }
    }
}

/// Serves redirects on `listener` until one carries `key` or an `error`.
pub(crate) async fn capture(listener: &TcpListener, key: &str) -> Option<String> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accepting the redirect failed");
                return None;
            }
        };
        debug!(%peer, "redirect connection");
        match handle(stream, key).await {
            Ok(Redirect::Captured(value)) => return Some(value),
            Ok(Redirect::Refused) => return None,
            Ok(Redirect::Pending) => {}
            Err(e) => debug!(error = %e, "redirect connection dropped"),
        }
    }
}

enum Redirect {
    Captured(String),
    Refused,
    Pending,
}

async fn handle(stream: TcpStream, key: &str) -> std::io::Result<Redirect> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 || line.trim().is_empty() {
            break;
        }
    }

    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let query: Vec<(String, String)> = Url::parse("http://loopback")
        .and_then(|base| base.join(target))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default();

    let (page, outcome) = if let Some((_, value)) = query.iter().find(|(k, _)| k == key) {
        (DONE_PAGE, Redirect::Captured(value.clone()))
    } else if let Some((_, error)) = query.iter().find(|(k, _)| k == "error") {
        warn!(error = %error, "authorization server returned an error");
        (FAILED_PAGE, Redirect::Refused)
    } else {
        (FRAGMENT_PAGE, Redirect::Pending)
    };

    let mut stream = reader.into_inner();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{page}",
        page.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(outcome)
}

async fn launch_browser(url: &str) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };
    let status = command
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("browser launcher exited with {status}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::AsyncReadExt;

    async fn get(addr: std::net::SocketAddr, target: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\n\r\n").as_bytes())
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn test_bind_address() {
        let window = LoopbackAuthWindow::new(Duration::from_secs(1), 8910);
        assert_eq!(window.bind_address("localhost"), "localhost:8910");
        assert_eq!(window.bind_address("127.0.0.1:7000"), "127.0.0.1:7000");
    }

    #[tokio::test]
    async fn test_captures_code_from_query() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(async move { get(addr, "/cb?state=s&code=abc%2F1").await });

        assert_eq!(capture(&listener, "code").await, Some("abc/1".to_string()));
        assert!(client.await.unwrap().contains("Authorization complete"));
    }

    #[tokio::test]
    async fn test_fragment_page_then_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(async move {
            let first = get(addr, "/cb").await;
            let second = get(addr, "/cb?access_token=t0k&token_type=bearer").await;
            (first, second)
        });

        assert_eq!(capture(&listener, "access_token").await, Some("t0k".to_string()));
        let (first, _) = client.await.unwrap();
        assert!(first.contains("location.hash"));
    }

    #[tokio::test]
    async fn test_error_redirect_cancels() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(async move { get(addr, "/cb?error=access_denied").await });

        assert_eq!(capture(&listener, "code").await, None);
        assert!(client.await.unwrap().contains("Authorization failed"));
    }

    #[tokio::test]
    async fn test_times_out() {
        let window = LoopbackAuthWindow::new(Duration::from_millis(50), 0).without_browser();
        let value = window
            .show_auth_window("https://idp/authorize", "127.0.0.1:0", "code")
            .await;
        assert_eq!(value, None);
    }
}
