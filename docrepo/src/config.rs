//! Repository configuration.

use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::repository::{BlockingRepository, Entity, Repository};
use crate::store::DocumentDatabase;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

/// Settings applied when a [`Repository`] is opened.
///
/// Clones share the same settings. Each setting can be written once.
///
/// ```rust
/// use docrepo::config::RepositoryConfig;
///
/// let config = RepositoryConfig::new();
/// assert_eq!(config.collection_name(), None);
///
/// config.set_collection_name("archived_users").unwrap();
/// assert_eq!(config.collection_name().as_deref(), Some("archived_users"));
/// assert!(config.set_collection_name("other").is_err());
/// ```
#[derive(Clone)]
pub struct RepositoryConfig {
    inner: Arc<RepositoryConfigInner>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryConfig {
    pub fn new() -> Self {
        RepositoryConfig {
            inner: Arc::new(RepositoryConfigInner::new()),
        }
    }

    /// Collection name replacing the entity name, if set.
    pub fn collection_name(&self) -> Option<String> {
        self.inner.collection_name()
    }

    pub fn set_collection_name(&self, name: &str) -> RepoResult<()> {
        self.inner.set_collection_name(name)
    }
}

struct RepositoryConfigInner {
    collection_name: OnceLock<String>,
}

impl RepositoryConfigInner {
    fn new() -> Self {
        RepositoryConfigInner {
            collection_name: OnceLock::new(),
        }
    }

    fn collection_name(&self) -> Option<String> {
        self.collection_name.get().cloned()
    }

    fn set_collection_name(&self, name: &str) -> RepoResult<()> {
        if name.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(RepoError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }

        self.collection_name.set(name.to_string()).map_err(|_| {
            log::error!("Collection name is already set");
            RepoError::new("Collection name is already set", ErrorKind::InvalidOperation)
        })
    }
}

/// Fluent construction of repositories.
///
/// ```rust,ignore
/// let archive = Repository::<User>::builder()
///     .collection_name("archived_users")
///     .open(&db)?;
/// ```
pub struct RepositoryBuilder<T> {
    collection_name: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Default for RepositoryBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> RepositoryBuilder<T> {
    pub fn new() -> Self {
        RepositoryBuilder {
            collection_name: None,
            _marker: PhantomData,
        }
    }

    /// Stores the entities in `name` instead of the collection named after `T`.
    pub fn collection_name(mut self, name: &str) -> Self {
        self.collection_name = Some(name.to_string());
        self
    }

    pub fn open(self, database: &dyn DocumentDatabase) -> RepoResult<Repository<T>> {
        let config = self.config()?;
        Repository::with_config(database, config)
    }

    pub fn open_blocking(self, database: &dyn DocumentDatabase) -> RepoResult<BlockingRepository<T>> {
        BlockingRepository::new(self.open(database)?)
    }

    fn config(&self) -> RepoResult<RepositoryConfig> {
        let config = RepositoryConfig::new();
        if let Some(name) = &self.collection_name {
            config.set_collection_name(name)?;
        }
        Ok(config)
    }
}
