/// Direction of a sort key.
///
/// Translated by the store into its native ascending/descending instruction.
/// Missing fields read as `Null` and therefore come first in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SortOrder {
    /// Smallest value first
    Ascending,
    /// Largest value first
    Descending,
}

impl SortOrder {
    /// Applies this direction to an ascending comparison result.
    #[inline]
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}
