use crate::common::{Document, SortOrder, Value};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::filter::Filter;
use crate::repository::UpdateSpec;
use crate::store::{
    BulkWriteResult, DeleteResult, DocumentCollection, FindOptions, UpdateResult, WriteModel,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use itertools::Itertools;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::atomic::{self, AtomicBool};
use std::sync::Arc;

use super::InMemoryStoreConfig;

/// One collection of an [`InMemoryDatabase`](super::InMemoryDatabase).
///
/// Documents are kept in insertion order and keyed by the value of the collection's
/// identity field. A document inserted without an identity gets a generated UUID
/// string, unless the store is configured otherwise.
#[derive(Clone)]
pub struct InMemoryCollection {
    inner: Arc<InMemoryCollectionInner>,
}

impl InMemoryCollection {
    pub(crate) fn new(
        name: &str,
        id_field: &str,
        config: InMemoryStoreConfig,
        open: Arc<AtomicBool>,
    ) -> InMemoryCollection {
        InMemoryCollection {
            inner: Arc::new(InMemoryCollectionInner {
                name: name.to_string(),
                id_field: id_field.to_string(),
                config,
                open,
                documents: RwLock::new(IndexMap::new()),
            }),
        }
    }

    pub fn key_field(&self) -> &str {
        &self.inner.id_field
    }
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn id_field(&self) -> String {
        self.inner.id_field.clone()
    }

    async fn find(&self, filter: &Filter, options: &FindOptions) -> RepoResult<Vec<Document>> {
        self.inner.find(filter, options)
    }

    async fn count_documents(&self, filter: &Filter) -> RepoResult<u64> {
        self.inner.count_documents(filter)
    }

    async fn estimated_document_count(&self) -> RepoResult<u64> {
        self.inner.estimated_document_count()
    }

    async fn insert_one(&self, document: Document) -> RepoResult<Value> {
        self.inner.insert_one(document)
    }

    async fn bulk_write(&self, models: Vec<WriteModel>, ordered: bool) -> RepoResult<BulkWriteResult> {
        self.inner.bulk_write(models, ordered)
    }

    async fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        upsert: bool,
    ) -> RepoResult<UpdateResult> {
        self.inner.replace_one(filter, replacement, upsert)
    }

    async fn update_many(&self, filter: &Filter, update: &UpdateSpec) -> RepoResult<UpdateResult> {
        self.inner.update_many(filter, update)
    }

    async fn delete_one(&self, filter: &Filter) -> RepoResult<DeleteResult> {
        self.inner.delete(filter, true)
    }

    async fn delete_many(&self, filter: &Filter) -> RepoResult<DeleteResult> {
        self.inner.delete(filter, false)
    }
}

type DocumentMap = IndexMap<Value, Document>;

struct InMemoryCollectionInner {
    name: String,
    id_field: String,
    config: InMemoryStoreConfig,
    open: Arc<AtomicBool>,
    documents: RwLock<DocumentMap>,
}

impl InMemoryCollectionInner {
    fn check_open(&self) -> RepoResult<()> {
        if self.open.load(atomic::Ordering::Acquire) {
            Ok(())
        } else {
            log::error!("Collection '{}' belongs to a closed database", self.name);
            Err(RepoError::new(
                &format!("Cannot access collection '{}': database is closed", self.name),
                ErrorKind::StoreClosed,
            ))
        }
    }

    fn find(&self, filter: &Filter, options: &FindOptions) -> RepoResult<Vec<Document>> {
        self.check_open()?;
        log::trace!("find on '{}' with filter {} and {:?}", self.name, filter, options);

        let documents = self.documents.read();
        let mut matched = Vec::new();
        for document in documents.values() {
            if filter.apply(document)? {
                matched.push(document);
            }
        }

        let sort = options.sort_fields();
        let sorted: Vec<&Document> = if sort.is_empty() {
            matched
        } else {
            // sorted_by is stable, so equal keys keep their natural order
            matched
                .into_iter()
                .sorted_by(|a, b| compare_by(a, b, sort))
                .collect()
        };

        let skip = options.skip_count().unwrap_or(0) as usize;
        let limit = options.limit_count().map_or(usize::MAX, |l| l as usize);
        Ok(sorted.into_iter().skip(skip).take(limit).cloned().collect())
    }

    fn count_documents(&self, filter: &Filter) -> RepoResult<u64> {
        self.check_open()?;
        if filter.is_match_all() {
            return Ok(self.documents.read().len() as u64);
        }

        let documents = self.documents.read();
        let mut count = 0;
        for document in documents.values() {
            if filter.apply(document)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn estimated_document_count(&self) -> RepoResult<u64> {
        self.check_open()?;
        Ok(self.documents.read().len() as u64)
    }

    fn insert_one(&self, document: Document) -> RepoResult<Value> {
        self.check_open()?;
        let mut documents = self.documents.write();
        self.insert(&mut documents, document)
    }

    fn replace_one(&self, filter: &Filter, replacement: Document, upsert: bool) -> RepoResult<UpdateResult> {
        self.check_open()?;
        let mut documents = self.documents.write();
        self.replace(&mut documents, filter, replacement, upsert)
    }

    fn bulk_write(&self, models: Vec<WriteModel>, ordered: bool) -> RepoResult<BulkWriteResult> {
        self.check_open()?;
        log::debug!(
            "Bulk write of {} models on '{}' (ordered: {})",
            models.len(),
            self.name,
            ordered
        );

        let total = models.len();
        let mut documents = self.documents.write();
        let mut result = BulkWriteResult::default();
        let mut failures: Vec<(usize, RepoError)> = Vec::new();

        for (index, model) in models.into_iter().enumerate() {
            match self.apply_model(&mut documents, model, &mut result) {
                Ok(()) => {}
                Err(error) if ordered => {
                    log::error!("Ordered bulk write on '{}' stopped at model {}: {}", self.name, index, error);
                    return Err(RepoError::new_with_cause(
                        &format!(
                            "Bulk write failed at model {} of {}: {} inserted, {} modified before the failure",
                            index, total, result.inserted_count, result.modified_count
                        ),
                        ErrorKind::BulkWriteError,
                        error,
                    ));
                }
                Err(error) => failures.push((index, error)),
            }
        }

        let count = failures.len();
        match failures.into_iter().next() {
            None => Ok(result),
            Some((index, first)) => {
                log::error!("Unordered bulk write on '{}' had {} failed models", self.name, count);
                Err(RepoError::new_with_cause(
                    &format!(
                        "Bulk write had {} failed models of {} (first at {}): {} inserted, {} modified",
                        count, total, index, result.inserted_count, result.modified_count
                    ),
                    ErrorKind::BulkWriteError,
                    first,
                ))
            }
        }
    }

    fn update_many(&self, filter: &Filter, update: &UpdateSpec) -> RepoResult<UpdateResult> {
        self.check_open()?;
        log::trace!("update_many on '{}' with filter {} and {}", self.name, filter, update);

        let mut documents = self.documents.write();
        let mut result = UpdateResult::default();
        for (key, document) in documents.iter_mut() {
            if !filter.apply(document)? {
                continue;
            }
            result.matched_count += 1;

            let mut updated = document.clone();
            if update.apply(&mut updated)? {
                if &updated.get(&self.id_field) != key {
                    return Err(self.immutable_identity(key));
                }
                *document = updated;
                result.modified_count += 1;
            }
        }
        Ok(result)
    }

    fn delete(&self, filter: &Filter, just_once: bool) -> RepoResult<DeleteResult> {
        self.check_open()?;
        let mut documents = self.documents.write();

        let mut keys = Vec::new();
        for (key, document) in documents.iter() {
            if filter.apply(document)? {
                keys.push(key.clone());
                if just_once {
                    break;
                }
            }
        }

        for key in &keys {
            documents.shift_remove(key);
        }
        Ok(DeleteResult {
            deleted_count: keys.len() as u64,
        })
    }

    fn apply_model(
        &self,
        documents: &mut DocumentMap,
        model: WriteModel,
        result: &mut BulkWriteResult,
    ) -> RepoResult<()> {
        match model {
            WriteModel::InsertOne(document) => {
                self.insert(documents, document)?;
                result.inserted_count += 1;
            }
            WriteModel::ReplaceOne {
                filter,
                replacement,
                upsert,
            } => {
                let outcome = self.replace(documents, &filter, replacement, upsert)?;
                result.matched_count += outcome.matched_count;
                result.modified_count += outcome.modified_count;
                result.upserted_ids.extend(outcome.upserted_id);
            }
        }
        Ok(())
    }

    fn insert(&self, documents: &mut DocumentMap, mut document: Document) -> RepoResult<Value> {
        let mut id = document.get(&self.id_field);
        if id.is_null() {
            if !self.config.generate_ids() {
                log::error!("Document without '{}' inserted into '{}'", self.id_field, self.name);
                return Err(RepoError::new(
                    &format!("Document has no value for identity field '{}'", self.id_field),
                    ErrorKind::BackendError,
                ));
            }
            id = Value::String(uuid::Uuid::new_v4().to_string());
            document.put(&self.id_field, id.clone())?;
        }

        if documents.contains_key(&id) {
            log::error!("Duplicate key {} in collection '{}'", id, self.name);
            return Err(RepoError::new(
                &format!("Duplicate key error: {} = {} already exists in '{}'", self.id_field, id, self.name),
                ErrorKind::DuplicateKey,
            ));
        }

        documents.insert(id.clone(), document);
        Ok(id)
    }

    fn replace(
        &self,
        documents: &mut DocumentMap,
        filter: &Filter,
        mut replacement: Document,
        upsert: bool,
    ) -> RepoResult<UpdateResult> {
        let mut target = None;
        for (index, document) in documents.values().enumerate() {
            if filter.apply(document)? {
                target = Some(index);
                break;
            }
        }

        let Some(index) = target else {
            if !upsert {
                return Ok(UpdateResult::default());
            }
            let id = self.insert(documents, replacement)?;
            return Ok(UpdateResult {
                matched_count: 0,
                modified_count: 0,
                upserted_id: Some(id),
            });
        };

        let Some((key, current)) = documents.get_index_mut(index) else {
            return Err(RepoError::new("Matched document vanished", ErrorKind::InternalError));
        };

        let new_id = replacement.get(&self.id_field);
        if new_id.is_null() {
            replacement.put(&self.id_field, key.clone())?;
        } else if &new_id != key {
            return Err(self.immutable_identity(key));
        }

        if *current == replacement {
            return Ok(UpdateResult {
                matched_count: 1,
                modified_count: 0,
                upserted_id: None,
            });
        }

        *current = replacement;
        Ok(UpdateResult {
            matched_count: 1,
            modified_count: 1,
            upserted_id: None,
        })
    }

    fn immutable_identity(&self, key: &Value) -> RepoError {
        log::error!("Attempt to change identity {} in '{}'", key, self.name);
        RepoError::new(
            &format!(
                "Performing an update on the path '{}' would modify the immutable identity {}",
                self.id_field, key
            ),
            ErrorKind::ImmutableField,
        )
    }
}

static NULL: Value = Value::Null;

/// Missing fields sort as `null`.
fn compare_by(a: &Document, b: &Document, sort: &[(String, SortOrder)]) -> Ordering {
    sort.iter().fold(Ordering::Equal, |ordering, (field, order)| {
        ordering.then_with(|| {
            let left = a.get_ref(field).unwrap_or(&NULL);
            let right = b.get_ref(field).unwrap_or(&NULL);
            order.apply(left.cmp(right))
        })
    })
}
