use crate::common::Document;
use crate::errors::RepoResult;
use itertools::Itertools;
use std::fmt::Display;

use super::{Filter, FilterProvider};

/// Conjunction; evaluation stops at the first filter that rejects.
pub(crate) struct AndFilter {
    filters: Vec<Filter>,
}

impl AndFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        AndFilter { filters }
    }
}

impl FilterProvider for AndFilter {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        for filter in &self.filters {
            if !filter.apply(entry)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Display for AndFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.filters.iter().join(" && "))
    }
}

/// Disjunction; evaluation stops at the first filter that accepts.
pub(crate) struct OrFilter {
    filters: Vec<Filter>,
}

impl OrFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        OrFilter { filters }
    }
}

impl FilterProvider for OrFilter {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        for filter in &self.filters {
            if filter.apply(entry)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Display for OrFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.filters.iter().join(" || "))
    }
}

pub(crate) struct NotFilter {
    filter: Filter,
}

impl NotFilter {
    pub(crate) fn new(filter: Filter) -> Self {
        NotFilter { filter }
    }
}

impl FilterProvider for NotFilter {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        Ok(!self.filter.apply(entry)?)
    }
}

impl Display for NotFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "!{}", self.filter)
    }
}

/// Matches when every filter matches. An empty list matches everything.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

/// Matches when at least one filter matches. An empty list matches nothing.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}

pub fn not(filter: Filter) -> Filter {
    filter.not()
}
