//! Test doubles for the ports.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

use httpiness_domain::document::CollectionDocument;

use crate::ports::{
    AuthWindow, Clock, DocumentRepository, ExecutionResult, FileSystemError, HttpResponse,
    RepositoryError, RequestExecutor, SecretStore, SecretsError,
};
use crate::request_resolver::ResolvedRequest;

/// In-memory secret store counting reads.
#[derive(Default)]
pub struct MemorySecrets {
    entries: Mutex<HashMap<(String, String), String>>,
    reads: AtomicUsize,
}

impl MemorySecrets {
    pub async fn insert(&self, service: &str, account: &str, value: &str) {
        self.entries
            .lock()
            .await
            .insert((service.to_string(), account.to_string()), value.to_string());
    }

    pub async fn value(&self, service: &str, account: &str) -> Option<String> {
        self.entries
            .lock()
            .await
            .get(&(service.to_string(), account.to_string()))
            .cloned()
    }

    pub async fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for MemorySecrets {
    async fn set_secret(&self, service: &str, account: &str, value: &str) -> Result<(), SecretsError> {
        self.insert(service, account, value).await;
        Ok(())
    }

    async fn get_secret(&self, service: &str, account: &str) -> Result<Option<String>, SecretsError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.value(service, account).await)
    }

    async fn delete_secret(&self, service: &str, account: &str) -> Result<(), SecretsError> {
        self.entries
            .lock()
            .await
            .remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}

/// Executor replaying canned results and recording requests.
#[derive(Default)]
pub struct ScriptedExecutor {
    results: Mutex<Vec<ExecutionResult>>,
    pub sent: Mutex<Vec<ResolvedRequest>>,
}

impl ScriptedExecutor {
    pub fn replying(results: Vec<ExecutionResult>) -> Self {
        Self {
            results: Mutex::new(results),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn json(status: u16, body: &str) -> ExecutionResult {
        ExecutionResult::with_response(
            HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            },
            Duration::from_millis(5),
        )
    }
}

#[async_trait]
impl RequestExecutor for ScriptedExecutor {
    async fn execute(&self, request: &ResolvedRequest) -> ExecutionResult {
        self.sent.lock().await.push(request.clone());
        let mut results = self.results.lock().await;
        if results.is_empty() {
            ExecutionResult::failed("no scripted response", Duration::ZERO)
        } else {
            results.remove(0)
        }
    }
}

/// Authorization window returning a fixed answer and recording the URL.
pub struct FixedWindow {
    answer: Option<String>,
    pub opened: Mutex<Vec<(String, String, String)>>,
}

impl FixedWindow {
    pub fn answering(answer: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.map(str::to_string),
            opened: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AuthWindow for FixedWindow {
    async fn show_auth_window(
        &self,
        url: &str,
        redirect_host: &str,
        expected_query_key: &str,
    ) -> Option<String> {
        self.opened.lock().await.push((
            url.to_string(),
            redirect_host.to_string(),
            expected_query_key.to_string(),
        ));
        self.answer.clone()
    }
}

/// Clock pinned to one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).single().unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Document repository over an in-memory map of paths to text.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryRepository {
    pub async fn put(&self, path: &str, text: &str) {
        self.files
            .lock()
            .await
            .insert(PathBuf::from(path), text.to_string());
    }

    pub async fn get(&self, path: &str) -> Option<String> {
        self.files.lock().await.get(Path::new(path)).cloned()
    }

    pub async fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl DocumentRepository for MemoryRepository {
    async fn load_text(&self, path: &Path) -> Result<String, RepositoryError> {
        self.files
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| FileSystemError::NotFound(path.to_path_buf()).into())
    }

    async fn save(&self, path: &Path, document: &CollectionDocument) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FileSystemError::PermissionDenied(path.to_path_buf()).into());
        }
        let text = serde_json::to_string_pretty(document)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.files.lock().await.insert(path.to_path_buf(), text);
        Ok(())
    }
}
