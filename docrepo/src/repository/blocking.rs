use crate::common::{Convertible, Field, FieldAssignment, SortSpec};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::filter::Filter;
use crate::store::DocumentDatabase;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};

use super::{Entity, Page, Repository};

/// Synchronous face of a [`Repository`].
///
/// Each call drives the corresponding asynchronous operation to completion on a
/// private single-threaded runtime, so results are identical to the async API.
/// Calls made from within an async runtime fail with
/// [`ErrorKind::InvalidOperation`]; use the [`Repository`] there. Dropping the
/// last handle is allowed anywhere.
pub struct BlockingRepository<T: Entity> {
    repository: Repository<T>,
    runtime: Arc<BlockingRuntime>,
}

/// Owns the private runtime and shuts it down without blocking when the last
/// handle goes away inside another runtime.
struct BlockingRuntime {
    runtime: Option<Runtime>,
}

impl Drop for BlockingRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            if Handle::try_current().is_ok() {
                runtime.shutdown_background();
            }
        }
    }
}

impl<T: Entity> Clone for BlockingRepository<T> {
    fn clone(&self) -> Self {
        BlockingRepository {
            repository: self.repository.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T: Entity> BlockingRepository<T> {
    pub fn new(repository: Repository<T>) -> RepoResult<Self> {
        let runtime = Builder::new_current_thread().enable_all().build().map_err(|err| {
            log::error!("Failed to start blocking runtime: {}", err);
            RepoError::new(
                &format!("Failed to start blocking runtime: {}", err),
                ErrorKind::InternalError,
            )
        })?;

        Ok(BlockingRepository {
            repository,
            runtime: Arc::new(BlockingRuntime {
                runtime: Some(runtime),
            }),
        })
    }

    /// Opens the collection named after `T`.
    pub fn open(database: &dyn DocumentDatabase) -> RepoResult<Self> {
        Self::new(Repository::new(database)?)
    }

    /// The asynchronous repository behind this one.
    pub fn as_async(&self) -> &Repository<T> {
        &self.repository
    }

    pub fn collection_name(&self) -> String {
        self.repository.collection_name()
    }

    pub fn any(&self) -> RepoResult<bool> {
        self.run(self.repository.any())
    }

    pub fn any_where(&self, filter: Filter) -> RepoResult<bool> {
        self.run(self.repository.any_where(filter))
    }

    pub fn count(&self) -> RepoResult<u64> {
        self.run(self.repository.count())
    }

    pub fn count_where(&self, filter: Filter) -> RepoResult<u64> {
        self.run(self.repository.count_where(filter))
    }

    pub fn insert(&self, entity: T) -> RepoResult<T> {
        self.run(self.repository.insert(entity))
    }

    pub fn insert_many<I>(&self, entities: I) -> RepoResult<bool>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send,
    {
        self.run(self.repository.insert_many(entities))
    }

    pub fn get_all(&self) -> RepoResult<Vec<T>> {
        self.run(self.repository.get_all())
    }

    pub fn get_all_sorted(&self, sorts: &[SortSpec<T>]) -> RepoResult<Vec<T>> {
        self.run(self.repository.get_all_sorted(sorts))
    }

    pub fn get_all_paged(&self, skip: u64, take: u64, sorts: &[SortSpec<T>]) -> RepoResult<Page<T>> {
        self.run(self.repository.get_all_paged(skip, take, sorts))
    }

    pub fn get(&self, filter: Filter) -> RepoResult<Vec<T>> {
        self.run(self.repository.get(filter))
    }

    pub fn get_sorted(&self, filter: Filter, sorts: &[SortSpec<T>]) -> RepoResult<Vec<T>> {
        self.run(self.repository.get_sorted(filter, sorts))
    }

    pub fn get_paged(&self, filter: Filter, skip: u64, take: u64, sorts: &[SortSpec<T>]) -> RepoResult<Page<T>> {
        self.run(self.repository.get_paged(filter, skip, take, sorts))
    }

    pub fn find(&self, id: &T::Id) -> RepoResult<Option<T>> {
        self.run(self.repository.find(id))
    }

    pub fn first_or_default(&self) -> RepoResult<Option<T>> {
        self.run(self.repository.first_or_default())
    }

    pub fn first_where(&self, filter: Filter) -> RepoResult<Option<T>> {
        self.run(self.repository.first_where(filter))
    }

    pub fn upsert(&self, entity: &T) -> RepoResult<bool> {
        self.run(self.repository.upsert(entity))
    }

    pub fn upsert_many<I>(&self, entities: I) -> RepoResult<bool>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send,
    {
        self.run(self.repository.upsert_many(entities))
    }

    pub fn update(&self, entity: &T) -> RepoResult<bool> {
        self.run(self.repository.update(entity))
    }

    pub fn update_many<I>(&self, entities: I) -> RepoResult<bool>
    where
        I: IntoIterator<Item = T>,
    {
        self.run(self.repository.update_many(entities))
    }

    pub fn update_field<V: Convertible>(&self, field: Field<T, V>, value: impl Into<V>) -> RepoResult<bool> {
        self.run(self.repository.update_field(field, value))
    }

    pub fn update_field_where<V: Convertible>(
        &self,
        filter: Filter,
        field: Field<T, V>,
        value: impl Into<V>,
    ) -> RepoResult<bool> {
        self.run(self.repository.update_field_where(filter, field, value))
    }

    pub fn update_fields<I>(&self, assignments: I) -> RepoResult<bool>
    where
        I: IntoIterator<Item = FieldAssignment<T>>,
    {
        self.run(self.repository.update_fields(assignments))
    }

    pub fn update_fields_where<I>(&self, filter: Filter, assignments: I) -> RepoResult<bool>
    where
        I: IntoIterator<Item = FieldAssignment<T>>,
    {
        self.run(self.repository.update_fields_where(filter, assignments))
    }

    pub fn delete_by_id(&self, id: &T::Id) -> RepoResult<bool> {
        self.run(self.repository.delete_by_id(id))
    }

    pub fn delete(&self, entity: &T) -> RepoResult<bool> {
        self.run(self.repository.delete(entity))
    }

    pub fn delete_where(&self, filter: Filter) -> RepoResult<bool> {
        self.run(self.repository.delete_where(filter))
    }

    fn run<R, F>(&self, future: F) -> RepoResult<R>
    where
        F: Future<Output = RepoResult<R>>,
    {
        if Handle::try_current().is_ok() {
            log::error!("Blocking repository used inside an async runtime");
            return Err(RepoError::new(
                "Blocking repository operations cannot run inside an async runtime",
                ErrorKind::InvalidOperation,
            ));
        }
        match &self.runtime.runtime {
            Some(runtime) => runtime.block_on(future),
            None => {
                log::error!("Blocking runtime is already shut down");
                Err(RepoError::new(
                    "Blocking runtime is already shut down",
                    ErrorKind::InternalError,
                ))
            }
        }
    }
}
