use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::store::{DocumentCollection, DocumentDatabase};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{InMemoryCollection, InMemoryStoreConfig};

/// In-memory [`DocumentDatabase`].
///
/// Cloning yields another handle to the same database. Closing any handle closes the
/// database for all of them; later operations fail with [`ErrorKind::StoreClosed`].
///
/// ```rust
/// use docrepo::store::memory::InMemoryDatabase;
/// use docrepo::store::DocumentDatabase;
///
/// let db = InMemoryDatabase::new();
/// let users = db.collection("User", "id").unwrap();
/// assert_eq!(users.name(), "User");
///
/// db.close().unwrap();
/// assert!(!db.is_open());
/// assert!(db.collection("User", "id").is_err());
/// ```
#[derive(Clone)]
pub struct InMemoryDatabase {
    inner: Arc<InMemoryDatabaseInner>,
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDatabase {
    pub fn new() -> InMemoryDatabase {
        Self::with_config(InMemoryStoreConfig::new())
    }

    pub fn with_config(config: InMemoryStoreConfig) -> InMemoryDatabase {
        InMemoryDatabase {
            inner: Arc::new(InMemoryDatabaseInner {
                config,
                collections: DashMap::new(),
                open: Arc::new(AtomicBool::new(true)),
            }),
        }
    }

    pub fn config(&self) -> InMemoryStoreConfig {
        self.inner.config.clone()
    }

    /// Names of the collections opened so far.
    pub fn collection_names(&self) -> Vec<String> {
        self.inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Drops the collection `name` and its documents.
    pub fn drop_collection(&self, name: &str) -> RepoResult<()> {
        self.inner.check_open()?;
        self.inner.collections.remove(name);
        Ok(())
    }
}

impl DocumentDatabase for InMemoryDatabase {
    fn collection(&self, name: &str, id_field: &str) -> RepoResult<Arc<dyn DocumentCollection>> {
        self.inner.collection(name, id_field)
    }

    fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }

    fn close(&self) -> RepoResult<()> {
        if self.inner.open.swap(false, Ordering::AcqRel) {
            log::debug!("In-memory database closed");
        }
        Ok(())
    }
}

struct InMemoryDatabaseInner {
    config: InMemoryStoreConfig,
    collections: DashMap<String, InMemoryCollection>,
    open: Arc<AtomicBool>,
}

impl InMemoryDatabaseInner {
    fn check_open(&self) -> RepoResult<()> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            log::error!("In-memory database is closed");
            Err(RepoError::new("Database is closed", ErrorKind::StoreClosed))
        }
    }

    fn collection(&self, name: &str, id_field: &str) -> RepoResult<Arc<dyn DocumentCollection>> {
        self.check_open()?;

        if name.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(RepoError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }

        let collection = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("Creating in-memory collection '{}' keyed by '{}'", name, id_field);
                InMemoryCollection::new(name, id_field, self.config.clone(), self.open.clone())
            })
            .clone();

        if collection.key_field() != id_field {
            log::error!(
                "Collection '{}' is keyed by '{}', not '{}'",
                name,
                collection.key_field(),
                id_field
            );
            return Err(RepoError::new(
                &format!(
                    "Collection '{}' is already keyed by '{}'",
                    name,
                    collection.key_field()
                ),
                ErrorKind::InvalidArgument,
            ));
        }

        Ok(Arc::new(collection))
    }
}
