/// Separator of embedded field paths, e.g. `address.city`.
pub const FIELD_SEPARATOR: &str = ".";

/// Number of documents submitted per bulk write by batched inserts and upserts.
pub const BATCH_SIZE: usize = 2000;
