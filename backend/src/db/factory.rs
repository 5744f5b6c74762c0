//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use super::repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
use super::repositories::{SqliteConfig, SqliteRepository};
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::config::AppConfig;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
    /// Single-file SQLite store
    Sqlite,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("local", "memory", "sqlite")
    ///
    /// # Returns
    /// * `Ok(RepositoryType)` if valid
    /// * `Err` if invalid
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to Sqlite if `SQLITE_PATH` is set,
    /// otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("SQLITE_PATH").is_ok() {
            Self::Sqlite
        } else {
            Self::Local
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use rapport::db::{RepositoryFactory, RepositoryType, TemplateRepository};
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let repo = RepositoryFactory::create(RepositoryType::Local, None).unwrap();
/// assert!(repo.health_check().await.unwrap());
/// # });
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `sqlite_path` - Database file (required for Sqlite)
    ///
    /// # Returns
    /// * `Ok(Arc<dyn FullRepository>)` - Boxed repository instance
    /// * `Err(RepositoryError)` - If creation fails
    pub fn create(
        repo_type: RepositoryType,
        sqlite_path: Option<PathBuf>,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            RepositoryType::Sqlite => {
                #[cfg(feature = "sqlite-repo")]
                {
                    let path = sqlite_path.ok_or_else(|| {
                        RepositoryError::configuration(
                            "SQLite repository requires a database path",
                        )
                    })?;
                    let repo = Self::create_sqlite(&SqliteConfig::new(path))?;
                    Ok(repo as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "sqlite-repo"))]
                {
                    let _ = sqlite_path;
                    Err(RepositoryError::configuration(
                        "SQLite repository feature not enabled",
                    ))
                }
            }
        }
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create a SQLite repository, running migrations.
    #[cfg(feature = "sqlite-repo")]
    pub fn create_sqlite(config: &SqliteConfig) -> RepositoryResult<Arc<SqliteRepository>> {
        Ok(Arc::new(SqliteRepository::from_config(config)?))
    }

    /// Create repository from environment configuration.
    ///
    /// Reads `REPOSITORY_TYPE` and `SQLITE_PATH`.
    pub fn from_env() -> RepositoryResult<Arc<dyn FullRepository>> {
        let sqlite_path = std::env::var("SQLITE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("rapport.db"));
        Self::create(RepositoryType::from_env(), Some(sqlite_path))
    }

    /// Create repository from the application configuration.
    ///
    /// `REPOSITORY_TYPE` and `SQLITE_PATH`, when set, take precedence over
    /// the file.
    pub fn from_config(config: &AppConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = match std::env::var("REPOSITORY_TYPE") {
            Ok(val) => val.parse(),
            Err(_) => config.repository_type(),
        }
        .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))?;

        let sqlite_path = std::env::var("SQLITE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| config.sqlite.path.clone());

        Self::create(repo_type, Some(sqlite_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::TemplateRepository;

    #[test]
    fn test_repository_type_from_str() {
        assert_eq!(
            RepositoryType::from_str("local").unwrap(),
            RepositoryType::Local
        );
        assert_eq!(
            RepositoryType::from_str("SQLite").unwrap(),
            RepositoryType::Sqlite
        );
        assert_eq!(
            RepositoryType::from_str(" memory ").unwrap(),
            RepositoryType::Local
        );
        assert!(RepositoryType::from_str("postgres").is_err());
    }

    #[tokio::test]
    async fn test_create_local_repository() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[cfg(not(feature = "sqlite-repo"))]
    #[test]
    fn test_sqlite_requires_feature() {
        let result = RepositoryFactory::create(RepositoryType::Sqlite, Some("x.db".into()));
        assert!(result.is_err());
    }

    #[cfg(feature = "sqlite-repo")]
    #[tokio::test]
    async fn test_create_sqlite_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rapport.db");
        let repo = RepositoryFactory::create(RepositoryType::Sqlite, Some(path.clone())).unwrap();
        assert!(repo.health_check().await.unwrap());
        assert!(path.exists());

        assert!(RepositoryFactory::create(RepositoryType::Sqlite, None).is_err());
    }
}
