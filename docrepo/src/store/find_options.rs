use crate::common::SortOrder;

/// Sorting and pagination of a find operation.
///
/// Sort keys are applied in the order they were added: the first key is the primary
/// one, later keys break ties. Skip and limit are applied after sorting.
///
/// ```rust
/// use docrepo::common::SortOrder;
/// use docrepo::store::{order_by, FindOptions};
///
/// let options = order_by("age", SortOrder::Descending)
///     .sort_by("name", SortOrder::Ascending)
///     .skip(20)
///     .limit(10);
///
/// assert_eq!(options.sort_fields().len(), 2);
/// assert_eq!(options.skip_count(), Some(20));
/// assert_eq!(options.limit_count(), Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    sort: Vec<(String, SortOrder)>,
    skip: Option<u64>,
    limit: Option<u64>,
}

impl FindOptions {
    pub fn new() -> Self {
        FindOptions::default()
    }

    /// Adds a sort key after the existing ones.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> Self {
        self.sort.push((field_name.to_string(), sort_order));
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort_fields(&self) -> &[(String, SortOrder)] {
        &self.sort
    }

    pub fn skip_count(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }
}

/// Options sorting by one field.
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

/// Options skipping the first `skip` results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Options returning at most `limit` results.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}
