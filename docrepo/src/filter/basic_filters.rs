use crate::common::{Convertible, Document, Value};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use std::cmp::Ordering;
use std::fmt::Display;
use std::marker::PhantomData;

use super::{Filter, FilterProvider};

/// Matches every document.
pub(crate) struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _entry: &Document) -> RepoResult<bool> {
        Ok(true)
    }

    fn is_match_all(&self) -> bool {
        true
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AllFilter")
    }
}

/// `field == value`. A missing field reads as `null`, so `eq(Value::Null)` also
/// matches documents without the field.
pub(crate) struct EqualsFilter {
    field_name: String,
    field_value: Value,
}

impl EqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        EqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl FilterProvider for EqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        Ok(entry.get(&self.field_name) == self.field_value)
    }
}

impl Display for EqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} == {})", self.field_name, self.field_value)
    }
}

/// `field != value`
pub(crate) struct NotEqualsFilter {
    field_name: String,
    field_value: Value,
}

impl NotEqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        NotEqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl FilterProvider for NotEqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        Ok(entry.get(&self.field_name) != self.field_value)
    }
}

impl Display for NotEqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} != {})", self.field_name, self.field_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComparisonOp {
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl ComparisonOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Greater => ordering == Ordering::Greater,
            ComparisonOp::GreaterEqual => ordering != Ordering::Less,
            ComparisonOp::Lesser => ordering == Ordering::Less,
            ComparisonOp::LesserEqual => ordering != Ordering::Greater,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterEqual => ">=",
            ComparisonOp::Lesser => "<",
            ComparisonOp::LesserEqual => "<=",
        }
    }
}

/// Ordered comparison of a field against a value.
///
/// Values are only compared within the same type family (numbers with numbers,
/// strings with strings, ...). A missing field, a `null` field or a field of another
/// type never matches.
pub(crate) struct ComparisonFilter {
    field_name: String,
    field_value: Value,
    op: ComparisonOp,
}

impl ComparisonFilter {
    pub(crate) fn new(field_name: String, field_value: Value, op: ComparisonOp) -> Self {
        ComparisonFilter {
            field_name,
            field_value,
            op,
        }
    }
}

impl FilterProvider for ComparisonFilter {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        if self.field_value.is_null() {
            log::error!("Comparison filter on '{}' cannot use a null operand", self.field_name);
            return Err(RepoError::new(
                &format!("Cannot compare field '{}' with null", self.field_name),
                ErrorKind::FilterError,
            ));
        }

        let value = match entry.get_ref(&self.field_name) {
            Some(value) if !value.is_null() => value,
            _ => return Ok(false),
        };

        if value.type_rank() != self.field_value.type_rank() {
            return Ok(false);
        }
        Ok(self.op.accepts(value.cmp(&self.field_value)))
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field_name, self.op.symbol(), self.field_value)
    }
}

/// `field IN [values]`
pub(crate) struct InFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl InFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        InFilter {
            field_name,
            field_values,
        }
    }
}

impl FilterProvider for InFilter {
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(self.field_values.contains(&value))
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} in {})", self.field_name, Value::Array(self.field_values.clone()))
    }
}

/// Stands in for a filter whose operand could not be converted. Evaluating it
/// fails with the conversion error.
pub(crate) struct InvalidFilter {
    field_name: String,
    error: RepoError,
}

impl FilterProvider for InvalidFilter {
    fn apply(&self, _entry: &Document) -> RepoResult<bool> {
        log::error!("Filter on '{}' has an unconvertible operand: {}", self.field_name, self.error);
        Err(self.error.clone())
    }
}

impl Display for InvalidFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(invalid filter on {}: {})", self.field_name, self.error)
    }
}

pub(crate) fn invalid_filter(field_name: &str, error: RepoError) -> Filter {
    Filter::new(InvalidFilter {
        field_name: field_name.to_string(),
        error,
    })
}

/// Evaluates a closure over the document mapped back to `T`.
///
/// A document that cannot be mapped to `T` fails the evaluation with
/// [`ErrorKind::ObjectMappingError`] instead of being silently skipped.
pub(crate) struct PredicateFilter<T, F> {
    predicate: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> FilterProvider for PredicateFilter<T, F>
where
    T: Convertible<Output = T>,
    F: Fn(&T) -> bool + Send + Sync,
{
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        let item = T::from_value(&Value::Document(entry.clone()))?;
        Ok((self.predicate)(&item))
    }
}

impl<T, F> Display for PredicateFilter<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(predicate on {})", std::any::type_name::<T>())
    }
}

/// Builds a filter from a closure over the typed document.
///
/// ```rust
/// use docrepo::common::Document;
/// use docrepo::doc;
/// use docrepo::filter::predicate;
///
/// let active = predicate(|d: &Document| d.get("active").as_bool() == Some(true));
/// assert!(active.apply(&doc! { "active" => true }).unwrap());
/// ```
pub fn predicate<T, F>(predicate: F) -> Filter
where
    T: Convertible<Output = T> + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    Filter::new(PredicateFilter {
        predicate,
        _marker: PhantomData::<fn(&T)>,
    })
}

/// Builds a filter from a closure over the raw document.
pub fn document_predicate<F>(predicate: F) -> Filter
where
    F: Fn(&Document) -> bool + Send + Sync + 'static,
{
    Filter::new(DocumentPredicateFilter { predicate })
}

struct DocumentPredicateFilter<F> {
    predicate: F,
}

impl<F> FilterProvider for DocumentPredicateFilter<F>
where
    F: Fn(&Document) -> bool + Send + Sync,
{
    fn apply(&self, entry: &Document) -> RepoResult<bool> {
        Ok((self.predicate)(entry))
    }
}

impl<F> Display for DocumentPredicateFilter<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(document predicate)")
    }
}
