use crate::common::Value;

/// Counters reported by a bulk write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkWriteResult {
    pub inserted_count: u64,
    pub matched_count: u64,
    pub modified_count: u64,
    pub deleted_count: u64,
    /// Identities of the documents inserted by upserting replace models.
    pub upserted_ids: Vec<Value>,
}

impl BulkWriteResult {
    /// Adds the counters of `other` to this result.
    pub fn merge(&mut self, other: BulkWriteResult) {
        self.inserted_count += other.inserted_count;
        self.matched_count += other.matched_count;
        self.modified_count += other.modified_count;
        self.deleted_count += other.deleted_count;
        self.upserted_ids.extend(other.upserted_ids);
    }

    pub fn upserted_count(&self) -> u64 {
        self.upserted_ids.len() as u64
    }
}

/// Outcome of a replace or update-many.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched_count: u64,
    /// Documents whose content actually changed.
    pub modified_count: u64,
    pub upserted_id: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}
