use std::collections::HashMap;

use async_trait::async_trait;

use super::repository::{PortalRepository, RepositoryError};

/// Environment variable naming the storage backend.
pub const BACKEND_ENV: &str = "PORTAL_DB_BACKEND";
/// Environment variable holding the backend's connection string.
pub const DATABASE_URL_ENV: &str = "PORTAL_DATABASE_URL";

/// Which backend to open, and how.
///
/// The connection string is handed to the backend as-is:
///
/// | backend  | connection_string                              |
/// |----------|------------------------------------------------|
/// | `sqlite` | `sqlite:portal.db?mode=rwc`, `sqlite::memory:` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "sqlite:portal.db?mode=rwc".to_string(),
        }
    }
}

impl DbConfig {
    /// Reads [`BACKEND_ENV`] and [`DATABASE_URL_ENV`]; each unset variable
    /// keeps its default. Backend names are case-insensitive.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Replaces the connection string, e.g. from a `--database` flag.
    pub fn with_connection_string(
        mut self,
        connection_string: Option<&str>,
    ) -> Self {
        if let Some(url) = connection_string {
            self.connection_string = url.to_string();
        }
        self
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            backend: lookup(BACKEND_ENV)
                .map(|backend| backend.trim().to_lowercase())
                .unwrap_or(defaults.backend),
            connection_string: lookup(DATABASE_URL_ENV).unwrap_or(defaults.connection_string),
        }
    }
}

/// Opens a [`PortalRepository`] for one backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Connects and prepares the schema.
    async fn create(&self, config: &DbConfig) -> Result<Box<dyn PortalRepository>, RepositoryError>;
}

/// Backends the binary was built with, looked up by name.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    /// Later registrations under the same name win.
    pub fn register(&mut self, factory: Box<dyn RepositoryFactory>) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Sorted backend names.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens the backend named by `config`.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Configuration`] when no such backend is registered;
    /// otherwise whatever the backend's factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PortalRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            )));
        };

        factory.create(config).await
    }
}
