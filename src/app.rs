use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};
use tracing::debug;

use crate::{
    adapters::outbound::storage::{GcsAuthenticator, GcsConfig, InMemoryStorageBackend},
    ports::storage::{Authenticator, StaticAuthenticator},
    services::{CloudStorageServiceImpl, DEFAULT_PAGE_SIZE, SessionManager},
};

/// Properties file read when no other location is given
pub const DEFAULT_CONFIG_PATH: &str = "cloudstorage.properties";
/// Environment variable overriding [`DEFAULT_CONFIG_PATH`]
pub const CONFIG_PATH_ENV: &str = "CLOUDSTORAGE_CONFIG";

pub const PROJECT_ID_KEY: &str = "project.id";
pub const CREDENTIAL_PATH_KEY: &str = "credential.json.path";
pub const ENDPOINT_KEY: &str = "storage.endpoint";
pub const BACKEND_KEY: &str = "storage.backend";
pub const PAGE_SIZE_KEY: &str = "storage.page.size";

static GLOBAL_CONFIG: OnceLock<ConfigProvider> = OnceLock::new();

/// Immutable key-value connection settings read from a properties file
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    source: PathBuf,
    values: HashMap<String, String>,
}

impl ConfigProvider {
    /// Parse a Java properties file at `path`
    ///
    /// Values are taken literally; `$NAME` is not expanded.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let config_file_error = |message: String| AppError::ConfigFile {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| config_file_error(e.to_string()))?;
        let values = java_properties::read(BufReader::new(file))
            .map_err(|e| config_file_error(e.to_string()))?;

        debug!(path = %path.display(), keys = values.len(), "loaded configuration");
        Ok(Self {
            source: path.to_path_buf(),
            values,
        })
    }

    /// Build a provider from in-memory pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            source: PathBuf::new(),
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Location the settings were read from, honoring [`CONFIG_PATH_ENV`]
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Process-wide settings, read from [`ConfigProvider::default_path`] on first use
    ///
    /// A failed read is not cached; there is no reload once loaded.
    pub fn global() -> Result<&'static ConfigProvider, AppError> {
        if let Some(config) = GLOBAL_CONFIG.get() {
            return Ok(config);
        }

        let loaded = Self::load(&Self::default_path())?;
        Ok(GLOBAL_CONFIG.get_or_init(|| loaded))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn require(&self, key: &str) -> Result<&str, AppError> {
        self.get(key).ok_or_else(|| AppError::Configuration {
            message: format!("'{}' is missing from {}", key, self.source.display()),
        })
    }
}

/// Which storage service sessions are opened against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// Google Cloud Storage or a compatible emulator
    Gcs,
    /// Process-local store, for tests and development
    InMemory,
}

impl std::str::FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcs" => Ok(BackendKind::Gcs),
            "memory" => Ok(BackendKind::InMemory),
            other => Err(AppError::Configuration {
                message: format!("Unknown storage backend '{}'", other),
            }),
        }
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub project_id: String,
    pub credential_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::InMemory,
            project_id: "local".to_string(),
            credential_path: None,
            endpoint: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Read and check the settings held by `provider`
    pub fn from_provider(provider: &ConfigProvider) -> Result<Self, AppError> {
        let backend = match provider.get(BACKEND_KEY) {
            Some(kind) => kind.parse()?,
            None => BackendKind::Gcs,
        };

        let page_size = match provider.get(PAGE_SIZE_KEY) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(AppError::Configuration {
                        message: format!("'{}' must be a positive integer, got '{}'", PAGE_SIZE_KEY, raw),
                    });
                }
            },
            None => DEFAULT_PAGE_SIZE,
        };

        let endpoint = provider.get(ENDPOINT_KEY).map(str::to_string);
        let credential_path = provider.get(CREDENTIAL_PATH_KEY).map(PathBuf::from);

        let project_id = match backend {
            BackendKind::Gcs => {
                if credential_path.is_none() && endpoint.is_none() {
                    provider.require(CREDENTIAL_PATH_KEY)?;
                }
                provider.require(PROJECT_ID_KEY)?.to_string()
            }
            BackendKind::InMemory => provider.get(PROJECT_ID_KEY).unwrap_or("local").to_string(),
        };

        Ok(Self {
            backend,
            project_id,
            credential_path,
            endpoint,
            page_size,
        })
    }

    pub fn gcs_config(&self) -> GcsConfig {
        GcsConfig {
            project_id: self.project_id.clone(),
            credential_path: self.credential_path.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            authenticator: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Open sessions through `authenticator` instead of the configured backend
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Wire the session manager and the service; no session is opened yet
    pub fn build(self) -> Result<CloudStorageServiceImpl, AppError> {
        if self.config.page_size == 0 {
            return Err(AppError::Configuration {
                message: "Page size must be positive".to_string(),
            });
        }

        let authenticator = match self.authenticator {
            Some(authenticator) => authenticator,
            None => Self::create_authenticator(&self.config),
        };

        let sessions = Arc::new(SessionManager::new(authenticator));
        Ok(CloudStorageServiceImpl::new(sessions).with_page_size(self.config.page_size))
    }

    fn create_authenticator(config: &AppConfig) -> Arc<dyn Authenticator> {
        match config.backend {
            BackendKind::InMemory => Arc::new(StaticAuthenticator::new(Arc::new(
                InMemoryStorageBackend::new(),
            ))),
            BackendKind::Gcs => Arc::new(GcsAuthenticator::new(config.gcs_config())),
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Cannot read configuration file '{}': {message}", .path.display())]
    ConfigFile { path: PathBuf, message: String },
}

/// Create an in-memory application for testing and development
pub fn create_in_memory_app() -> Result<CloudStorageServiceImpl, AppError> {
    AppBuilder::new().with_backend(BackendKind::InMemory).build()
}

/// Create an application from the properties file at `path`
pub fn create_app_from_config(path: &Path) -> Result<CloudStorageServiceImpl, AppError> {
    let provider = ConfigProvider::load(path)?;
    AppBuilder::new()
        .with_config(AppConfig::from_provider(&provider)?)
        .build()
}

/// Create an application from the process-wide configuration
pub fn create_app_from_env() -> Result<CloudStorageServiceImpl, AppError> {
    let provider = ConfigProvider::global()?;
    AppBuilder::new()
        .with_config(AppConfig::from_provider(provider)?)
        .build()
}
