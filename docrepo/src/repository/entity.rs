use crate::common::{Convertible, Document, Value};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use crate::filter::{field, Filter};
use std::marker::PhantomData;

/// A document type stored by a [`Repository`](super::Repository).
///
/// The identity of an entity is declared at compile time: `id_field` names the
/// stored field and `id` reads its value. Implement it with
/// `#[derive(DocumentEntity)]` and an `#[entity(id)]` field, or by hand:
///
/// ```rust
/// use docrepo::common::{Convertible, Document, Value};
/// use docrepo::errors::RepoResult;
/// use docrepo::repository::Entity;
///
/// struct Tag {
///     code: String,
/// }
///
/// impl Convertible for Tag {
///     type Output = Tag;
///
///     fn to_value(&self) -> RepoResult<Value> {
///         let mut doc = Document::new();
///         doc.put("code", self.code.as_str())?;
///         Ok(Value::Document(doc))
///     }
///
///     fn from_value(value: &Value) -> RepoResult<Tag> {
///         let doc = Document::from_value(value)?;
///         Ok(Tag { code: String::from_value(&doc.get("code"))? })
///     }
/// }
///
/// impl Entity for Tag {
///     type Id = String;
///
///     fn entity_name() -> &'static str { "Tag" }
///     fn id_field() -> &'static str { "code" }
///     fn id(&self) -> &String { &self.code }
/// }
/// ```
pub trait Entity: Convertible<Output = Self> + Send + Sync + 'static {
    /// Type of the identity value.
    type Id: Convertible + Send + Sync;

    /// Default collection name, the type name unless overridden.
    fn entity_name() -> &'static str;

    /// Stored name of the identity field.
    fn id_field() -> &'static str;

    fn id(&self) -> &Self::Id;
}

/// Resolves the identity of entities of type `T` and maps them to documents.
pub struct IdentityResolver<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for IdentityResolver<T> {
    fn default() -> Self {
        IdentityResolver {
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for IdentityResolver<T> {
    fn clone(&self) -> Self {
        IdentityResolver::default()
    }
}

impl<T: Entity> IdentityResolver<T> {
    pub fn new() -> Self {
        IdentityResolver::default()
    }

    /// Name of the identity field of `T`.
    pub fn field_name(&self) -> RepoResult<&'static str> {
        let name = T::id_field();
        if name.is_empty() {
            log::error!("No identity attribute mapped for {}", T::entity_name());
            return Err(RepoError::new(
                &format!("No identity attribute mapped for type {}", T::entity_name()),
                ErrorKind::MappingError,
            ));
        }
        Ok(name)
    }

    /// Current identity value of `entity`. A null identity is rejected.
    pub fn identity_value(&self, entity: &T) -> RepoResult<Value> {
        let value = entity.id().to_value()?;
        if value.is_null() {
            log::error!("{} has no identity value", T::entity_name());
            return Err(RepoError::new(
                &format!("{} instance has a null identity", T::entity_name()),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(value)
    }

    /// Filter matching the document whose identity equals `id`. A null `id` is rejected.
    pub fn id_filter(&self, id: &T::Id) -> RepoResult<Filter> {
        let name = self.field_name()?;
        let value = id.to_value()?;
        if value.is_null() {
            log::error!("Lookup of {} by a null identity", T::entity_name());
            return Err(RepoError::new(
                &format!("Cannot look up {} by a null identity", T::entity_name()),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(field(name).eq(value))
    }

    /// Filter matching the stored document of `entity`.
    pub fn unique_filter(&self, entity: &T) -> RepoResult<Filter> {
        let name = self.field_name()?;
        let value = self.identity_value(entity)?;
        Ok(field(name).eq(value))
    }

    pub fn to_document(&self, entity: &T) -> RepoResult<Document> {
        match entity.to_value()? {
            Value::Document(document) => Ok(document),
            other => {
                log::error!("{} converted to {} instead of a document", T::entity_name(), other.type_name());
                Err(RepoError::new(
                    &format!("{} must convert to a document, got {}", T::entity_name(), other.type_name()),
                    ErrorKind::ObjectMappingError,
                ))
            }
        }
    }

    pub fn from_document(&self, document: Document) -> RepoResult<T> {
        T::from_value(&Value::Document(document))
    }
}
