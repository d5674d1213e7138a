//! End-to-end tests of opening, resolving and saving collection files with
//! the real file-backed adapters.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use httpiness_application::auth::AuthResolver;
use httpiness_application::ports::{NoConverter, SecretStore};
use httpiness_application::session::CollectionRegistry;
use httpiness_application::variable_resolver::VariableStore;
use httpiness_application::RequestResolver;
use httpiness_domain::collection::{SECRET_SERVICE, SENSITIVE_SENTINEL};
use httpiness_domain::document::{CURRENT_VERSION, parse_document};
use httpiness_domain::request::{Header, RequestBody};
use httpiness_infrastructure::{
    FileDocumentRepository, FileSecretStore, LoopbackAuthWindow, ReqwestExecutor, SystemClock,
    TokioFileSystem,
};

const UUID: &str = "6f1c2a9e-3f0b-4c1e-9a57-2b0f0b7d1c11";

const CURRENT_DOC: &str = r#"{
  "collectionVersion": "httpiness/JSON/0.11",
  "uuid": "6f1c2a9e-3f0b-4c1e-9a57-2b0f0b7d1c11",
  "authChildren": [
    { "name": "Default Auth", "location": null, "definition": { "type": "Bearer", "token": "${TOKEN}" } }
  ],
  "dirChildren": [
    {
      "name": "users",
      "authChildren": [],
      "dirChildren": [],
      "reqtChildren": [
        {
          "name": "List",
          "request": { "method": "GET", "url": "https://${HOST}/users", "headers": [], "body": null },
          "defaultBody": null,
          "auth": null
        }
      ]
    }
  ],
  "reqtChildren": [],
  "parameters": { "HOST": "example.com", "TOKEN": "******sensitive******" },
  "parameterPresets": []
}"#;

const LEGACY_DOC: &str = r#"{
  "collectionVersion": "httpiness/JSON/0.9",
  "uuid": "6f1c2a9e-3f0b-4c1e-9a57-2b0f0b7d1c11",
  "dirChildren": [],
  "reqtChildren": [
    {
      "name": "Login",
      "request": {
        "method": "POST",
        "url": "https://${HOST}/login",
        "headers": [{ "name": "Content-Type", "value": "application/x-www-form-urlencoded" }],
        "body": { "type": "Regular", "text": "user=${USER}&pass=x" }
      },
      "defaultBody": null
    }
  ],
  "parameters": { "HOST": "example.com", "USER": "alice" },
  "parameterPresets": []
}"#;

type Registry = CollectionRegistry<FileDocumentRepository<TokioFileSystem>, NoConverter>;

fn registry() -> Registry {
    CollectionRegistry::new(
        FileDocumentRepository::new(TokioFileSystem::new()),
        NoConverter,
        Arc::new(SystemClock),
    )
}

fn resolver(secrets: Arc<FileSecretStore<TokioFileSystem>>) -> RequestResolver {
    RequestResolver::new(
        VariableStore::new(secrets),
        AuthResolver::new(
            Arc::new(ReqwestExecutor::new().unwrap()),
            Arc::new(LoopbackAuthWindow::new(Duration::from_millis(10), 0).without_browser()),
            Arc::new(SystemClock),
        ),
    )
}

fn secret_store(dir: &Path) -> Arc<FileSecretStore<TokioFileSystem>> {
    Arc::new(FileSecretStore::new(
        TokioFileSystem::new(),
        dir.join("secrets.json"),
    ))
}

#[tokio::test]
async fn test_default_auth_with_sensitive_token_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("api.json");
    std::fs::write(&path, CURRENT_DOC).unwrap();
    let secrets = secret_store(dir.path());
    secrets
        .set_secret(SECRET_SERVICE, &format!("TOKEN_{UUID}"), "s3cr3t")
        .await
        .unwrap();

    let mut registry = registry();
    let collection = registry.open(&path).await.unwrap();
    assert_eq!(collection.name(), "api");
    assert!(!collection.is_dirty());

    let root = collection.tree.root();
    let list = collection
        .tree
        .find_from_absolute_path(root, "/users/List")
        .unwrap();
    let resolution = resolver(secrets).preview(collection, list).await.unwrap();

    assert_eq!(resolution.request.url, "https://example.com/users");
    assert_eq!(
        resolution.request.headers,
        vec![Header::new("Authorization", "Bearer s3cr3t")]
    );
    assert!(resolution.unresolved.is_empty());
}

#[tokio::test]
async fn test_sensitive_value_never_reaches_the_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("api.json");
    std::fs::write(&path, CURRENT_DOC).unwrap();
    let secrets = secret_store(dir.path());
    let variables = VariableStore::new(secrets.clone());

    let mut registry = registry();
    let collection = registry.open(&path).await.unwrap();
    variables
        .set_variable(collection, "PASS", Some("hunter2"), true)
        .await
        .unwrap();
    assert!(collection.is_dirty());
    let uuid = collection.uuid().to_string();

    assert!(registry.save_all_dirty().await.is_empty());
    assert!(!registry.get(&uuid).unwrap().is_dirty());

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(!written.contains("hunter2"));
    let document = parse_document(&written).unwrap();
    assert_eq!(document.parameters["PASS"], SENSITIVE_SENTINEL);
    assert_eq!(
        secrets
            .get_secret(SECRET_SERVICE, &format!("PASS_{UUID}"))
            .await
            .unwrap(),
        Some("hunter2".to_string())
    );
}

#[tokio::test]
async fn test_legacy_file_is_migrated_on_save() {
    let dir = tempdir().unwrap();
    let legacy = dir.path().join("old.json");
    let migrated = dir.path().join("new.json");
    std::fs::write(&legacy, LEGACY_DOC).unwrap();

    let mut registry = registry();
    let uuid = registry.open(&legacy).await.unwrap().uuid().to_string();
    assert_eq!(uuid, UUID);
    registry.save(&uuid, Some(&migrated)).await.unwrap();

    assert_eq!(std::fs::read_to_string(&legacy).unwrap(), LEGACY_DOC);
    let document = parse_document(&std::fs::read_to_string(&migrated).unwrap()).unwrap();
    assert_eq!(document.collection_version, CURRENT_VERSION.as_str());
    assert_eq!(document.uuid, UUID);
    let login = &document.reqt_children[0];
    assert_eq!(login.auth, None);
    assert!(matches!(
        &login.request.body,
        Some(RequestBody::Form { records, .. }) if records.len() == 2
    ));
}

#[tokio::test]
async fn test_reopening_after_close_reads_saved_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("api.json");
    std::fs::write(&path, CURRENT_DOC).unwrap();

    let mut registry = registry();
    let collection = registry.open(&path).await.unwrap();
    let root = collection.tree.root();
    collection.tree.insert_directory(root, "orders").unwrap();
    let uuid = collection.uuid().to_string();

    let closed = registry.close(&uuid).await.unwrap();
    assert!(closed.last_saved().is_some());
    assert!(registry.is_empty());

    let reopened = registry.open(&path).await.unwrap();
    let root = reopened.tree.root();
    assert!(reopened.tree.has_child_named(root, "orders"));
    assert!(reopened.tree.has_child_named(root, "users"));
}
