use crate::common::{Convertible, Document, Field, FieldAssignment, Value};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::filter::{all, Filter};
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};

/// An immutable partial update: an ordered set of `field = value` instructions.
///
/// Each field appears once; it keeps the position of its first assignment and the
/// value of its last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSpec {
    fields: IndexMap<String, Value>,
}

impl UpdateSpec {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field_name: &str) -> Option<&Value> {
        self.fields.get(field_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Sets every field on `document`; returns whether anything changed.
    pub fn apply(&self, document: &mut Document) -> RepoResult<bool> {
        let mut changed = false;
        for (name, value) in &self.fields {
            if document.get_ref(name) != Some(value) {
                document.put(name, value.clone())?;
                changed = true;
            }
        }
        Ok(changed)
    }
}

impl Display for UpdateSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "$set {{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

/// Composes field assignments into an [`UpdateSpec`].
///
/// Assignments are merged left to right and the last one wins for a field. An empty
/// list is rejected rather than turned into a no-op update.
///
/// ```rust
/// use docrepo::common::{FieldAssignment, Value};
/// use docrepo::repository::UpdateDefinition;
///
/// struct Player;
///
/// let spec = UpdateDefinition::build(vec![
///     FieldAssignment::<Player>::new("score", 10),
///     FieldAssignment::<Player>::new("level", 2),
///     FieldAssignment::<Player>::new("score", 12),
/// ])
/// .unwrap();
///
/// assert_eq!(spec.len(), 2);
/// assert_eq!(spec.get("score"), Some(&Value::I64(12)));
/// assert!(UpdateDefinition::build(Vec::<FieldAssignment<Player>>::new()).is_err());
/// ```
pub struct UpdateDefinition;

impl UpdateDefinition {
    pub fn build<T, I>(assignments: I) -> RepoResult<UpdateSpec>
    where
        I: IntoIterator<Item = FieldAssignment<T>>,
    {
        let mut fields = IndexMap::new();
        for assignment in assignments {
            let (name, value) = assignment.into_parts()?;
            fields.insert(name, value);
        }

        if fields.is_empty() {
            log::error!("Update requires at least one field assignment");
            return Err(RepoError::new(
                "At least one field assignment is required for an update",
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(UpdateSpec { fields })
    }

    /// Pairs the update with a filter matching every document.
    pub fn build_unscoped<T, I>(assignments: I) -> RepoResult<(Filter, UpdateSpec)>
    where
        I: IntoIterator<Item = FieldAssignment<T>>,
    {
        Ok((all(), Self::build(assignments)?))
    }

    /// Pairs the update with the documents satisfying `filter`.
    pub fn build_scoped<T, I>(filter: Filter, assignments: I) -> RepoResult<(Filter, UpdateSpec)>
    where
        I: IntoIterator<Item = FieldAssignment<T>>,
    {
        Ok((filter, Self::build(assignments)?))
    }
}

/// Fluent alternative to a list of assignments.
///
/// ```rust
/// use docrepo::common::Field;
/// use docrepo::repository::UpdateBuilder;
///
/// struct Player;
/// const SCORE: Field<Player, u32> = Field::named("score");
/// const NAME: Field<Player, String> = Field::named("name");
///
/// let spec = UpdateBuilder::new().set(SCORE, 10u32).set(NAME, "neo").build().unwrap();
/// assert_eq!(spec.len(), 2);
/// ```
pub struct UpdateBuilder<T> {
    assignments: Vec<FieldAssignment<T>>,
}

impl<T> Default for UpdateBuilder<T> {
    fn default() -> Self {
        UpdateBuilder {
            assignments: Vec::new(),
        }
    }
}

impl<T> UpdateBuilder<T> {
    pub fn new() -> Self {
        UpdateBuilder::default()
    }

    pub fn set<V: Convertible>(mut self, field: Field<T, V>, value: impl Into<V>) -> Self {
        self.assignments.push(field.set(value));
        self
    }

    pub fn assign(mut self, assignment: FieldAssignment<T>) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn assignments(self) -> Vec<FieldAssignment<T>> {
        self.assignments
    }

    pub fn build(self) -> RepoResult<UpdateSpec> {
        UpdateDefinition::build(self.assignments)
    }
}
