use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use httpiness_application::auth::AuthResolver;
use httpiness_application::ports::NoConverter;
use httpiness_application::session::CollectionRegistry;
use httpiness_application::use_cases::{PreviewRequest, SendRequest};
use httpiness_application::variable_resolver::VariableStore;
use httpiness_application::RequestResolver;
use httpiness_domain::AppSettings;
use httpiness_infrastructure::{
    FileDocumentRepository, FileSecretStore, LoopbackAuthWindow, ReqwestExecutor,
    SettingsRepository, SystemClock, TokioFileSystem,
};
use tracing::debug;

pub type Registry = CollectionRegistry<FileDocumentRepository<TokioFileSystem>, NoConverter>;

/// Adapters wired to the use cases for one run of the binary.
pub struct Services {
    pub variables: VariableStore,
    pub registry: Registry,
    pub send: SendRequest,
    pub preview: PreviewRequest,
}

impl Services {
    pub fn new(settings: &AppSettings) -> Result<Self> {
        let secret_file = match &settings.secret_file {
            Some(path) => path.clone(),
            None => FileSecretStore::<TokioFileSystem>::default_path()
                .context("no data directory for the secret file; set secretFile in settings")?,
        };
        debug!(path = %secret_file.display(), "secret file");

        let secrets = Arc::new(FileSecretStore::new(TokioFileSystem::new(), secret_file));
        let executor = Arc::new(ReqwestExecutor::new().context("cannot build HTTP client")?);
        let window = Arc::new(LoopbackAuthWindow::new(
            Duration::from_secs(settings.auth_window_timeout_secs),
            settings.callback_port,
        ));
        let clock = Arc::new(SystemClock);

        let variables = VariableStore::new(secrets);
        let resolver = Arc::new(RequestResolver::new(
            variables.clone(),
            AuthResolver::new(executor.clone(), window, clock.clone()),
        ));

        Ok(Self {
            variables,
            registry: CollectionRegistry::new(
                FileDocumentRepository::new(TokioFileSystem::new()),
                NoConverter,
                clock,
            ),
            send: SendRequest::new(resolver.clone(), executor),
            preview: PreviewRequest::new(resolver),
        })
    }
}

/// Loads settings from `path`, or from the default location when unset.
pub async fn load_settings(path: Option<&Path>) -> Result<AppSettings> {
    let repository = match path {
        Some(path) => SettingsRepository::new(path),
        None => match SettingsRepository::at_default_location() {
            Ok(repository) => repository,
            Err(_) => return Ok(AppSettings::default()),
        },
    };
    repository
        .load()
        .await
        .with_context(|| format!("cannot read settings {}", repository.path().display()))
}
