//! Sending requests through the reqwest executor against a local server,
//! including an `OAuth2` authorization-code flow with PKCE.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use httpiness_application::auth::AuthResolver;
use httpiness_application::ports::{AuthWindow, SecretStore};
use httpiness_application::use_cases::SendRequest;
use httpiness_application::variable_resolver::VariableStore;
use httpiness_application::RequestResolver;
use httpiness_domain::auth::{
    AuthDefinition, AuthTemplate, ClientAuthentication, OAuth2Config, OAuth2Type, PkceMethod,
};
use httpiness_domain::collection::{Collection, DEFAULT_AUTH_NAME, RequestTemplate};
use httpiness_domain::request::{HttpMethod, RawRequest};
use httpiness_infrastructure::{FileSecretStore, ReqwestExecutor, SystemClock, TokioFileSystem};

/// Serves `count` connections; `/token` answers with a token, anything else
/// with `pong`. Returns the raw requests in arrival order.
async fn serve(count: usize) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for _ in 0..count {
            let (mut stream, _) = listener.accept().await.unwrap();
            let raw = read_request(&mut stream).await;
            let body = if raw.starts_with("POST /token") {
                r#"{"access_token":"tok-1","token_type":"bearer","expires_in":3600}"#
            } else {
                "pong"
            };
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            requests.push(raw);
        }
        requests
    });
    (addr.to_string(), handle)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut received = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        let n = stream.read(&mut buffer).await.unwrap();
        received.extend_from_slice(&buffer[..n]);
        let text = String::from_utf8_lossy(&received).into_owned();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .map_or(0, |(_, v)| v.trim().parse::<usize>().unwrap());
            if received.len() >= end + 4 + length {
                return text;
            }
        }
        if n == 0 {
            return text;
        }
    }
}

/// Approves every authorization request with a fixed code.
#[derive(Default)]
struct ApprovingWindow {
    urls: Mutex<Vec<String>>,
}

#[async_trait]
impl AuthWindow for ApprovingWindow {
    async fn show_auth_window(
        &self,
        url: &str,
        _redirect_host: &str,
        expected_query_key: &str,
    ) -> Option<String> {
        assert_eq!(expected_query_key, "code");
        self.urls.lock().await.push(url.to_string());
        Some("the-code".to_string())
    }
}

#[tokio::test]
async fn test_authorization_code_token_is_fetched_once() {
    let (host, server) = serve(3).await;
    let dir = tempfile::tempdir().unwrap();
    let secrets = Arc::new(FileSecretStore::new(
        TokioFileSystem::new(),
        dir.path().join("secrets.json"),
    ));

    let mut collection = Collection::new("api");
    collection.set_public_value("HOST", host.clone());
    collection.set_public_value("CLIENT_SECRET", "******sensitive******");
    secrets
        .set_secret(
            "httpiness",
            &collection.secret_account("CLIENT_SECRET"),
            "shh",
        )
        .await
        .unwrap();
    let root = collection.tree.root();
    collection
        .tree
        .insert_auth(
            root,
            DEFAULT_AUTH_NAME,
            AuthTemplate::new(AuthDefinition::OAuth2(OAuth2Config {
                oauth2_type: OAuth2Type::AuthorizationCode,
                callback_url: "http://localhost:8910/callback".to_string(),
                auth_url: "https://idp.example/authorize".to_string(),
                token_url: "http://${HOST}/token".to_string(),
                client_id: "app".to_string(),
                client_secret: "${CLIENT_SECRET}".to_string(),
                pkce: PkceMethod::S256,
                client_authentication: ClientAuthentication::InBody,
                ..OAuth2Config::default()
            })),
        )
        .unwrap();
    let ping = collection
        .tree
        .insert_request(
            root,
            "Ping",
            RequestTemplate::new(RawRequest::new(HttpMethod::Get, "http://${HOST}/ping")),
        )
        .unwrap();

    let executor = Arc::new(ReqwestExecutor::new().unwrap());
    let window = Arc::new(ApprovingWindow::default());
    let resolver = Arc::new(RequestResolver::new(
        VariableStore::new(secrets),
        AuthResolver::new(executor.clone(), window.clone(), Arc::new(SystemClock)),
    ));
    let send = SendRequest::new(resolver, executor);

    for _ in 0..2 {
        let result = send.execute(&collection, ping).await.unwrap();
        let response = result.response.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "pong");
    }

    let urls = window.urls.lock().await;
    assert_eq!(urls.len(), 1);
    assert!(urls[0].starts_with("https://idp.example/authorize?response_type=code&client_id=app"));
    assert!(urls[0].contains("code_challenge_method=S256"));

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /token"));
    assert!(requests[0].contains("grant_type=authorization_code"));
    assert!(requests[0].contains("code=the-code"));
    assert!(requests[0].contains("client_secret=shh"));
    assert!(requests[0].contains("code_verifier="));
    for ping in &requests[1..] {
        assert!(ping.starts_with("GET /ping"));
        assert!(ping.to_ascii_lowercase().contains("authorization: bearer tok-1"));
    }
}
