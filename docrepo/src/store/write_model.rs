use crate::common::Document;
use crate::filter::Filter;

/// One operation of a bulk write.
#[derive(Debug, Clone)]
pub enum WriteModel {
    InsertOne(Document),
    ReplaceOne {
        filter: Filter,
        replacement: Document,
        upsert: bool,
    },
}

impl WriteModel {
    pub fn is_upsert(&self) -> bool {
        matches!(self, WriteModel::ReplaceOne { upsert: true, .. })
    }
}
