use async_trait::async_trait;

use portal_core::db::repository::{PortalRepository, RepositoryError};
use portal_core::db::{DbConfig, RepositoryFactory};

use crate::repository::SqliteRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`portal_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use portal_core::db::RepositoryRegistry;
/// use portal_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::default();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and apply
    /// pending migrations.
    ///
    /// The connection string is a sqlx URL: `sqlite:portal.db?mode=rwc`
    /// creates the file if needed, `sqlite::memory:` is ephemeral.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PortalRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}
