//! Repository factory for dependency injection.
//!
//! Picks the storage backend from the configuration file and the enabled
//! Cargo features, and hands back the repository trait objects the article
//! service is built from.

use std::str::FromStr;
use std::sync::Arc;

use super::repositories::LocalRepository;
#[cfg(feature = "mysql-repo")]
use super::repositories::{MySqlConfig, MySqlRepository};
use super::repository::{ArticleRepository, AuthorRepository, RepositoryError, RepositoryResult};
use crate::config::DatabaseSettings;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// MySQL + Diesel implementation
    MySql,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string ("mysql", "local").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Resolve the backend for a `database` config section.
    ///
    /// An explicit `driver` wins. Without one, MySQL is used when the
    /// `mysql-repo` feature is compiled in, otherwise the in-memory store.
    pub fn from_settings(settings: &DatabaseSettings) -> RepositoryResult<Self> {
        match settings.driver.as_deref() {
            Some(driver) => driver
                .parse()
                .map_err(|e: String| RepositoryError::configuration(e)),
            None if cfg!(feature = "mysql-repo") => Ok(Self::MySql),
            None => Ok(Self::Local),
        }
    }
}

/// The repositories the article service depends on.
#[derive(Clone)]
pub struct Repositories {
    pub articles: Arc<dyn ArticleRepository>,
    pub authors: Arc<dyn AuthorRepository>,
}

/// Repository factory for creating repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create the repositories described by the `database` config section.
    ///
    /// # Returns
    /// * `Ok(Repositories)` - Article and author repositories sharing one store
    /// * `Err(RepositoryError)` - If the backend is unavailable or fails to open
    pub async fn create(settings: &DatabaseSettings) -> RepositoryResult<Repositories> {
        match RepositoryType::from_settings(settings)? {
            RepositoryType::MySql => {
                #[cfg(feature = "mysql-repo")]
                {
                    let repo = Self::create_mysql(settings).await?;
                    Ok(Repositories {
                        articles: repo.clone(),
                        authors: repo,
                    })
                }
                #[cfg(not(feature = "mysql-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "MySQL repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Ok(Self::from_local(Arc::new(LocalRepository::new()))),
        }
    }

    /// Open the MySQL pool and run migrations.
    ///
    /// Pool construction blocks on establishing the initial connections, so
    /// it runs on the blocking thread pool.
    #[cfg(feature = "mysql-repo")]
    pub async fn create_mysql(settings: &DatabaseSettings) -> RepositoryResult<Arc<MySqlRepository>> {
        let config = MySqlConfig::from_settings(settings);
        let repo = tokio::task::spawn_blocking(move || MySqlRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    /// Wrap an existing in-memory repository, e.g. one pre-seeded with authors.
    pub fn from_local(repo: Arc<LocalRepository>) -> Repositories {
        Repositories {
            articles: repo.clone(),
            authors: repo,
        }
    }
}
