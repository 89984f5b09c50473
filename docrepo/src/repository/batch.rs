use crate::common::BATCH_SIZE;
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::store::{BulkWriteResult, DocumentCollection, WriteModel};

use super::{Entity, IdentityResolver};

/// Lazy, order-preserving split of an iterator into chunks of at most `size` items.
///
/// The last chunk holds the remainder; an empty input yields no chunk at all.
///
/// ```rust
/// use docrepo::repository::partition;
///
/// let batches: Vec<Vec<u32>> = partition(1..=5, 2).unwrap().collect();
/// assert_eq!(batches, vec![vec![1, 2], vec![3, 4], vec![5]]);
/// ```
pub struct Batches<I> {
    iter: I,
    size: usize,
}

impl<I: Iterator> Batches<I> {
    pub fn new(iter: I, size: usize) -> RepoResult<Self> {
        if size == 0 {
            log::error!("Batch size must be positive");
            return Err(RepoError::new(
                "Batch size must be greater than zero",
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(Batches { iter, size })
    }
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<I::Item> = self.iter.by_ref().take(self.size).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}

pub fn partition<I: IntoIterator>(items: I, size: usize) -> RepoResult<Batches<I::IntoIter>> {
    Batches::new(items.into_iter(), size)
}

/// One insert model per entity, in input order.
pub fn to_insert_models<T: Entity>(batch: &[T]) -> RepoResult<Vec<WriteModel>> {
    let resolver = IdentityResolver::<T>::new();
    batch
        .iter()
        .map(|entity| resolver.to_document(entity).map(WriteModel::InsertOne))
        .collect()
}

/// One replace-by-identity model per entity, every model carrying the same `upsert`.
pub fn to_replace_models<T: Entity>(batch: &[T], upsert: bool) -> RepoResult<Vec<WriteModel>> {
    let resolver = IdentityResolver::<T>::new();
    batch
        .iter()
        .map(|entity| {
            Ok(WriteModel::ReplaceOne {
                filter: resolver.unique_filter(entity)?,
                replacement: resolver.to_document(entity)?,
                upsert,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BatchMode {
    Insert,
    Upsert,
}

/// Submits batches of [`BATCH_SIZE`] entities one after the other, each as an
/// unordered bulk write, and sums their results.
pub(crate) struct BulkExecutor<'a> {
    collection: &'a dyn DocumentCollection,
}

impl<'a> BulkExecutor<'a> {
    pub(crate) fn new(collection: &'a dyn DocumentCollection) -> Self {
        BulkExecutor { collection }
    }

    pub(crate) async fn execute<T, I>(&self, items: I, mode: BatchMode) -> RepoResult<BulkWriteResult>
    where
        T: Entity,
        I: IntoIterator<Item = T>,
        I::IntoIter: Send,
    {
        let mut total = BulkWriteResult::default();
        for (index, batch) in partition(items, BATCH_SIZE)?.enumerate() {
            let models = match mode {
                BatchMode::Insert => to_insert_models(&batch)?,
                BatchMode::Upsert => to_replace_models(&batch, true)?,
            };
            log::debug!(
                "Submitting {:?} batch {} of {} documents to '{}'",
                mode,
                index,
                models.len(),
                self.collection.name()
            );
            let result = self.collection.bulk_write(models, false).await?;
            total.merge(result);
        }
        Ok(total)
    }
}
