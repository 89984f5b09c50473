use crate::common::{Convertible, SortOrder, Value};
use crate::errors::RepoResult;
use crate::filter::{field, invalid_filter, Filter, FluentFilter};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// A typed selector for one field of the entity `T` holding values of type `V`.
///
/// Selectors are generated by `#[derive(DocumentEntity)]` as upper-case associated
/// constants (`User::AGE: Field<User, u32>`), which makes every update, sort and
/// filter built from them checked against the entity's declared fields and types.
///
/// ```rust
/// use docrepo::common::{Field, SortOrder};
///
/// struct User;
/// const AGE: Field<User, u32> = Field::named("age");
///
/// let sort = AGE.descending();
/// assert_eq!(sort.field_name(), "age");
/// assert_eq!(sort.order(), SortOrder::Descending);
/// ```
pub struct Field<T, V> {
    name: &'static str,
    _marker: PhantomData<fn(&T) -> V>,
}

impl<T, V> Field<T, V> {
    /// Creates a selector for the field stored under `name` (dotted paths allowed).
    pub const fn named(name: &'static str) -> Self {
        Field {
            name,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ascending(self) -> SortSpec<T> {
        SortSpec::new(self.name, SortOrder::Ascending)
    }

    pub fn descending(self) -> SortSpec<T> {
        SortSpec::new(self.name, SortOrder::Descending)
    }
}

impl<T, V: Convertible> Field<T, V> {
    /// Pairs this field with a new value for a partial update.
    pub fn set(self, value: impl Into<V>) -> FieldAssignment<T> {
        FieldAssignment {
            field_name: self.name.to_string(),
            value: value.into().to_value(),
            _marker: PhantomData,
        }
    }
}

/// Filters over the field. The operand goes through the field type's [`Convertible`]
/// mapping, so it is stored and compared in the same form as the entity's values.
/// An operand that fails to convert yields a filter whose evaluation returns the
/// conversion error.
impl<T, V: Convertible> Field<T, V> {
    pub fn eq(self, value: impl Into<V>) -> Filter {
        self.compare(value.into(), |fluent, value| fluent.eq(value))
    }

    pub fn ne(self, value: impl Into<V>) -> Filter {
        self.compare(value.into(), |fluent, value| fluent.ne(value))
    }

    pub fn gt(self, value: impl Into<V>) -> Filter {
        self.compare(value.into(), |fluent, value| fluent.gt(value))
    }

    pub fn gte(self, value: impl Into<V>) -> Filter {
        self.compare(value.into(), |fluent, value| fluent.gte(value))
    }

    pub fn lt(self, value: impl Into<V>) -> Filter {
        self.compare(value.into(), |fluent, value| fluent.lt(value))
    }

    pub fn lte(self, value: impl Into<V>) -> Filter {
        self.compare(value.into(), |fluent, value| fluent.lte(value))
    }

    pub fn in_values(self, values: Vec<V>) -> Filter {
        let converted: RepoResult<Vec<Value>> = values.iter().map(|value| value.to_value()).collect();
        match converted {
            Ok(values) => field(self.name).in_values(values),
            Err(err) => invalid_filter(self.name, err),
        }
    }

    fn compare(self, value: V, build: impl FnOnce(FluentFilter, Value) -> Filter) -> Filter {
        match value.to_value() {
            Ok(value) => build(field(self.name), value),
            Err(err) => invalid_filter(self.name, err),
        }
    }
}

impl<T, V> Clone for Field<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Field<T, V> {}

impl<T, V> Debug for Field<T, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field({})", self.name)
    }
}

/// One `field = value` instruction of a partial update.
///
/// The value is converted when the assignment is created; a conversion failure is
/// reported when the update is built.
pub struct FieldAssignment<T> {
    field_name: String,
    value: RepoResult<Value>,
    _marker: PhantomData<fn(&T)>,
}

impl<T> FieldAssignment<T> {
    /// Untyped assignment, for fields without a generated selector.
    pub fn new(field_name: &str, value: impl Into<Value>) -> Self {
        FieldAssignment {
            field_name: field_name.to_string(),
            value: Ok(value.into()),
            _marker: PhantomData,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn value(&self) -> RepoResult<&Value> {
        self.value.as_ref().map_err(Clone::clone)
    }

    pub(crate) fn into_parts(self) -> RepoResult<(String, Value)> {
        let value = self.value?;
        Ok((self.field_name, value))
    }
}

impl<T> Clone for FieldAssignment<T> {
    fn clone(&self) -> Self {
        FieldAssignment {
            field_name: self.field_name.clone(),
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Debug for FieldAssignment<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Ok(value) => write!(f, "{} = {}", self.field_name, value),
            Err(err) => write!(f, "{} = <{}>", self.field_name, err),
        }
    }
}

/// One key of a multi-key sort: the first spec is the primary key, later specs break ties.
pub struct SortSpec<T> {
    field_name: String,
    order: SortOrder,
    _marker: PhantomData<fn(&T)>,
}

impl<T> SortSpec<T> {
    pub fn new(field_name: &str, order: SortOrder) -> Self {
        SortSpec {
            field_name: field_name.to_string(),
            order,
            _marker: PhantomData,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

impl<T> Clone for SortSpec<T> {
    fn clone(&self) -> Self {
        SortSpec::new(&self.field_name, self.order)
    }
}

impl<T> Debug for SortSpec<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?}", self.field_name, self.order)
    }
}
