use crate::common::{Convertible, Document, Field, FieldAssignment, SortSpec};
use crate::config::{RepositoryBuilder, RepositoryConfig};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::filter::{all, Filter};
use crate::store::{limit_to, DocumentCollection, DocumentDatabase, FindOptions, UpdateResult};
use std::sync::Arc;

use super::{to_replace_models, BatchMode, BulkExecutor, Entity, IdentityResolver, UpdateDefinition};

/// One page of a paginated query together with a document count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Estimated collection size for [`Repository::get_all_paged`], exact number of
    /// matching documents for [`Repository::get_paged`].
    pub count: u64,
}

/// Typed access to the collection holding the entities `T`.
///
/// Every operation suspends only while the store call is in flight. Operations
/// returning `bool` report whether anything changed; failures are always returned
/// as errors, never as `false`.
///
/// Cloning a repository is cheap and yields a handle to the same collection.
pub struct Repository<T: Entity> {
    inner: Arc<RepositoryInner<T>>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Repository {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Entity> Repository<T> {
    /// Opens the repository on the collection named after `T`.
    pub fn new(database: &dyn DocumentDatabase) -> RepoResult<Self> {
        Self::with_config(database, RepositoryConfig::default())
    }

    pub fn with_config(database: &dyn DocumentDatabase, config: RepositoryConfig) -> RepoResult<Self> {
        if !database.is_open() {
            log::error!("Cannot open a repository on a closed database");
            return Err(RepoError::new(
                "Store handle is closed or unavailable",
                ErrorKind::InvalidArgument,
            ));
        }

        let resolver = IdentityResolver::<T>::new();
        let id_field = resolver.field_name()?;
        let name = config
            .collection_name()
            .unwrap_or_else(|| T::entity_name().to_string());
        let collection = database.collection(&name, id_field)?;
        Self::from_collection(collection)
    }

    /// Binds the repository to an already opened collection, which must be keyed
    /// by the identity field of `T`.
    pub fn from_collection(collection: Arc<dyn DocumentCollection>) -> RepoResult<Self> {
        let resolver = IdentityResolver::<T>::new();
        let id_field = resolver.field_name()?;
        let collection_id_field = collection.id_field();
        if collection_id_field != id_field {
            log::error!(
                "Collection '{}' is keyed by '{}' but the entity identity is '{}'",
                collection.name(),
                collection_id_field,
                id_field
            );
            return Err(RepoError::new(
                &format!(
                    "Collection '{}' is keyed by '{}', expected '{}'",
                    collection.name(),
                    collection_id_field,
                    id_field
                ),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(Repository {
            inner: Arc::new(RepositoryInner {
                collection,
                resolver,
            }),
        })
    }

    pub fn builder() -> RepositoryBuilder<T> {
        RepositoryBuilder::new()
    }

    pub fn collection_name(&self) -> String {
        self.inner.collection.name()
    }

    pub async fn any(&self) -> RepoResult<bool> {
        self.inner.any(&all()).await
    }

    pub async fn any_where(&self, filter: Filter) -> RepoResult<bool> {
        self.inner.any(&filter).await
    }

    /// Estimated number of documents in the collection.
    pub async fn count(&self) -> RepoResult<u64> {
        self.inner.collection.estimated_document_count().await
    }

    /// Exact number of documents matching `filter`.
    pub async fn count_where(&self, filter: Filter) -> RepoResult<u64> {
        self.inner.collection.count_documents(&filter).await
    }

    /// Inserts `entity` and hands it back unchanged; an identity generated by the
    /// store is not written back into it.
    pub async fn insert(&self, entity: T) -> RepoResult<T> {
        let document = self.inner.resolver.to_document(&entity)?;
        self.inner.collection.insert_one(document).await?;
        Ok(entity)
    }

    /// Inserts `entities` in batches; `true` if at least one was inserted.
    pub async fn insert_many<I>(&self, entities: I) -> RepoResult<bool>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send,
    {
        let result = BulkExecutor::new(self.inner.collection.as_ref())
            .execute(entities, BatchMode::Insert)
            .await?;
        Ok(result.inserted_count > 0)
    }

    pub async fn get_all(&self) -> RepoResult<Vec<T>> {
        self.inner.find(&all(), FindOptions::new()).await
    }

    pub async fn get_all_sorted(&self, sorts: &[SortSpec<T>]) -> RepoResult<Vec<T>> {
        self.inner.find(&all(), sort_options(sorts)).await
    }

    /// Skips `skip` entities and returns at most `take`, with the estimated
    /// collection size as count. A `take` of 0 returns everything after `skip`.
    pub async fn get_all_paged(&self, skip: u64, take: u64, sorts: &[SortSpec<T>]) -> RepoResult<Page<T>> {
        let count = self.inner.collection.estimated_document_count().await?;
        let items = self
            .inner
            .find(&all(), page_options(sorts, skip, take))
            .await?;
        Ok(Page { items, count })
    }

    pub async fn get(&self, filter: Filter) -> RepoResult<Vec<T>> {
        self.inner.find(&filter, FindOptions::new()).await
    }

    pub async fn get_sorted(&self, filter: Filter, sorts: &[SortSpec<T>]) -> RepoResult<Vec<T>> {
        self.inner.find(&filter, sort_options(sorts)).await
    }

    /// Like [`get_all_paged`](Self::get_all_paged) but filtered, with the exact number
    /// of matching documents as count.
    pub async fn get_paged(
        &self,
        filter: Filter,
        skip: u64,
        take: u64,
        sorts: &[SortSpec<T>],
    ) -> RepoResult<Page<T>> {
        let count = self.inner.collection.count_documents(&filter).await?;
        let items = self
            .inner
            .find(&filter, page_options(sorts, skip, take))
            .await?;
        Ok(Page { items, count })
    }

    /// The entity whose identity equals `id`.
    pub async fn find(&self, id: &T::Id) -> RepoResult<Option<T>> {
        let filter = self.inner.resolver.id_filter(id)?;
        self.inner.first(&filter).await
    }

    pub async fn first_or_default(&self) -> RepoResult<Option<T>> {
        self.inner.first(&all()).await
    }

    pub async fn first_where(&self, filter: Filter) -> RepoResult<Option<T>> {
        self.inner.first(&filter).await
    }

    /// Replaces the stored entity with the same identity or inserts `entity`.
    /// `true` only when an existing document was modified.
    pub async fn upsert(&self, entity: &T) -> RepoResult<bool> {
        let result = self.inner.replace(entity, true).await?;
        Ok(result.modified_count > 0)
    }

    /// Upserts `entities` in batches; `true` if at least one was inserted.
    pub async fn upsert_many<I>(&self, entities: I) -> RepoResult<bool>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send,
    {
        let result = BulkExecutor::new(self.inner.collection.as_ref())
            .execute(entities, BatchMode::Upsert)
            .await?;
        Ok(result.upserted_count() > 0)
    }

    /// Replaces the stored entity with the same identity; nothing is inserted.
    pub async fn update(&self, entity: &T) -> RepoResult<bool> {
        let result = self.inner.replace(entity, false).await?;
        Ok(result.modified_count > 0)
    }

    /// Replaces all `entities` in one ordered bulk write.
    ///
    /// Unlike [`insert_many`](Self::insert_many) the input is not split into batches;
    /// callers are expected to bound its size.
    pub async fn update_many<I>(&self, entities: I) -> RepoResult<bool>
    where
        I: IntoIterator<Item = T>,
    {
        let entities: Vec<T> = entities.into_iter().collect();
        if entities.is_empty() {
            return Ok(false);
        }

        let models = to_replace_models(&entities, false)?;
        log::debug!(
            "Submitting {} replacements to '{}' in one ordered bulk write",
            models.len(),
            self.inner.collection.name()
        );
        let result = self.inner.collection.bulk_write(models, true).await?;
        Ok(result.modified_count > 0)
    }

    /// Sets `field` to `value` on every entity.
    pub async fn update_field<V: Convertible>(&self, field: Field<T, V>, value: impl Into<V>) -> RepoResult<bool> {
        self.update_fields(vec![field.set(value)]).await
    }

    /// Sets `field` to `value` on the entities matching `filter`.
    pub async fn update_field_where<V: Convertible>(
        &self,
        filter: Filter,
        field: Field<T, V>,
        value: impl Into<V>,
    ) -> RepoResult<bool> {
        self.update_fields_where(filter, vec![field.set(value)]).await
    }

    /// Applies all `assignments` to every entity in one update.
    pub async fn update_fields<I>(&self, assignments: I) -> RepoResult<bool>
    where
        I: IntoIterator<Item = FieldAssignment<T>>,
    {
        let (filter, update) = UpdateDefinition::build_unscoped(assignments)?;
        let result = self.inner.collection.update_many(&filter, &update).await?;
        Ok(result.modified_count > 0)
    }

    pub async fn update_fields_where<I>(&self, filter: Filter, assignments: I) -> RepoResult<bool>
    where
        I: IntoIterator<Item = FieldAssignment<T>>,
    {
        let (filter, update) = UpdateDefinition::build_scoped(filter, assignments)?;
        let result = self.inner.collection.update_many(&filter, &update).await?;
        Ok(result.modified_count > 0)
    }

    pub async fn delete_by_id(&self, id: &T::Id) -> RepoResult<bool> {
        let filter = self.inner.resolver.id_filter(id)?;
        let result = self.inner.collection.delete_one(&filter).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn delete(&self, entity: &T) -> RepoResult<bool> {
        let filter = self.inner.resolver.unique_filter(entity)?;
        let result = self.inner.collection.delete_one(&filter).await?;
        Ok(result.deleted_count > 0)
    }

    pub async fn delete_where(&self, filter: Filter) -> RepoResult<bool> {
        let result = self.inner.collection.delete_many(&filter).await?;
        Ok(result.deleted_count > 0)
    }
}

fn sort_options<T>(sorts: &[SortSpec<T>]) -> FindOptions {
    sorts
        .iter()
        .fold(FindOptions::new(), |options, sort| options.sort_by(sort.field_name(), sort.order()))
}

fn page_options<T>(sorts: &[SortSpec<T>], skip: u64, take: u64) -> FindOptions {
    let options = sort_options(sorts).skip(skip);
    // zero means no limit
    if take == 0 {
        options
    } else {
        options.limit(take)
    }
}

struct RepositoryInner<T: Entity> {
    collection: Arc<dyn DocumentCollection>,
    resolver: IdentityResolver<T>,
}

impl<T: Entity> RepositoryInner<T> {
    async fn any(&self, filter: &Filter) -> RepoResult<bool> {
        let found = self.collection.find(filter, &limit_to(1)).await?;
        Ok(!found.is_empty())
    }

    async fn find(&self, filter: &Filter, options: FindOptions) -> RepoResult<Vec<T>> {
        let documents = self.collection.find(filter, &options).await?;
        self.map_documents(documents)
    }

    async fn first(&self, filter: &Filter) -> RepoResult<Option<T>> {
        let documents = self.collection.find(filter, &limit_to(1)).await?;
        match documents.into_iter().next() {
            Some(document) => self.resolver.from_document(document).map(Some),
            None => Ok(None),
        }
    }

    async fn replace(&self, entity: &T, upsert: bool) -> RepoResult<UpdateResult> {
        let filter = self.resolver.unique_filter(entity)?;
        let document = self.resolver.to_document(entity)?;
        self.collection.replace_one(&filter, document, upsert).await
    }

    fn map_documents(&self, documents: Vec<Document>) -> RepoResult<Vec<T>> {
        documents
            .into_iter()
            .map(|document| self.resolver.from_document(document))
            .collect()
    }
}
