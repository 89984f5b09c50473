use crate::common::{Document, Value};
use crate::errors::RepoResult;
use crate::filter::Filter;
use crate::repository::UpdateSpec;
use async_trait::async_trait;
use std::sync::Arc;

use super::{BulkWriteResult, DeleteResult, FindOptions, UpdateResult, WriteModel};

/// A handle bound to one named collection of documents.
///
/// Implementations must be safe to share between repositories and between
/// concurrent calls. Failures are reported with store error kinds
/// (see [`ErrorKind::is_store_error`](crate::errors::ErrorKind::is_store_error)) and
/// reach the caller unchanged.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Name of the collection.
    fn name(&self) -> String;

    /// Name of the field holding each document's identity.
    fn id_field(&self) -> String;

    /// Documents matching `filter` in natural order, then sorted, skipped and
    /// limited as described by `options`.
    async fn find(&self, filter: &Filter, options: &FindOptions) -> RepoResult<Vec<Document>>;

    /// Exact number of documents matching `filter`.
    async fn count_documents(&self, filter: &Filter) -> RepoResult<u64>;

    /// Fast collection size, read from metadata rather than by evaluating a filter.
    async fn estimated_document_count(&self) -> RepoResult<u64>;

    /// Inserts one document and returns the identity it was stored under.
    async fn insert_one(&self, document: Document) -> RepoResult<Value>;

    /// Executes `models` as one request.
    ///
    /// An ordered write stops at the first failing model. An unordered write attempts
    /// every model before reporting failures.
    async fn bulk_write(&self, models: Vec<WriteModel>, ordered: bool) -> RepoResult<BulkWriteResult>;

    /// Replaces the first document matching `filter`, inserting `replacement` when
    /// nothing matches and `upsert` is set.
    async fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        upsert: bool,
    ) -> RepoResult<UpdateResult>;

    /// Applies `update` to every document matching `filter`.
    async fn update_many(&self, filter: &Filter, update: &UpdateSpec) -> RepoResult<UpdateResult>;

    async fn delete_one(&self, filter: &Filter) -> RepoResult<DeleteResult>;

    async fn delete_many(&self, filter: &Filter) -> RepoResult<DeleteResult>;
}

/// Source of [`DocumentCollection`] handles.
pub trait DocumentDatabase: Send + Sync {
    /// Opens (or creates) the collection `name` whose documents are keyed by `id_field`.
    fn collection(&self, name: &str, id_field: &str) -> RepoResult<Arc<dyn DocumentCollection>>;

    fn is_open(&self) -> bool;

    fn close(&self) -> RepoResult<()>;
}
