use crate::common::Document;
use crate::errors::RepoResult;
use std::fmt::{Debug, Display};
use std::ops::Deref;
use std::sync::Arc;

use super::{AllFilter, AndFilter, NotFilter, OrFilter};

/// Evaluation strategy behind a [`Filter`].
///
/// Implement this trait to plug a custom predicate into the repository.
pub trait FilterProvider: Send + Sync + Display {
    /// Returns whether `entry` satisfies the filter.
    fn apply(&self, entry: &Document) -> RepoResult<bool>;

    /// Whether this filter accepts every document without looking at it.
    #[inline]
    fn is_match_all(&self) -> bool {
        false
    }
}

/// A shareable, composable document predicate.
#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter {
            inner: Arc::new(inner),
        }
    }

    /// `self AND filter`
    pub fn and(&self, filter: Filter) -> Self {
        Filter::new(AndFilter::new(vec![self.clone(), filter]))
    }

    /// `self OR filter`
    pub fn or(&self, filter: Filter) -> Self {
        Filter::new(OrFilter::new(vec![self.clone(), filter]))
    }

    /// `NOT self`
    pub fn not(&self) -> Self {
        Filter::new(NotFilter::new(self.clone()))
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter{}", self.inner)
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// A filter matching every document.
pub fn all() -> Filter {
    Filter::new(AllFilter)
}
