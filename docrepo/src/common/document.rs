use crate::common::{Value, FIELD_SEPARATOR};
use crate::errors::{ErrorKind, RepoError, RepoResult};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// An ordered set of named values: the unit of storage of a document store.
///
/// Fields keep their insertion order. Keys containing the field separator (`.`)
/// address embedded documents, so `get("address.city")` reads the `city` field of the
/// document stored under `address`. Reading a missing path yields [`Value::Null`].
///
/// # Examples
///
/// ```rust
/// use docrepo::common::{Document, Value};
///
/// let mut doc = Document::new();
/// doc.put("name", "Ada").unwrap();
/// doc.put("address.city", "London").unwrap();
///
/// assert_eq!(doc.get("name"), Value::from("Ada"));
/// assert_eq!(doc.get("address.city"), Value::from("London"));
/// assert!(doc.get("missing").is_null());
/// ```
#[derive(Clone, Default)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Sets `key` to `value`, creating embedded documents along a dotted path.
    ///
    /// Overwriting an existing field keeps its position.
    pub fn put<T: Into<Value>>(&mut self, key: &str, value: T) -> RepoResult<()> {
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(RepoError::new(
                "Document does not support empty key",
                ErrorKind::InvalidArgument,
            ));
        }

        let value = value.into();
        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value)
        } else {
            self.data.insert(key.to_string(), value);
            Ok(())
        }
    }

    /// Returns the value at `key`, following dotted paths; `Null` when absent.
    pub fn get(&self, key: &str) -> Value {
        if let Some(value) = self.data.get(key) {
            return value.clone();
        }

        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_get(&splits).cloned().unwrap_or(Value::Null)
        } else {
            Value::Null
        }
    }

    /// Borrowing variant of [`get`](Self::get).
    pub fn get_ref(&self, key: &str) -> Option<&Value> {
        match self.data.get(key) {
            Some(value) => Some(value),
            None if key.contains(FIELD_SEPARATOR) => {
                let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
                self.deep_get(&splits)
            }
            None => None,
        }
    }

    /// Removes the field at `key`. Removing a missing field is a no-op.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if let Some(value) = self.data.shift_remove(key) {
            return Some(value);
        }

        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_remove(&splits)
        } else {
            None
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get_ref(key).is_some()
    }

    /// Top level field names in insertion order.
    pub fn fields(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    fn deep_get(&self, splits: &[&str]) -> Option<&Value> {
        let (first, rest) = splits.split_first()?;
        let value = self.data.get(*first)?;
        if rest.is_empty() {
            return Some(value);
        }

        match value {
            Value::Document(doc) => doc.deep_get(rest),
            Value::Array(array) => {
                let index = rest[0].parse::<usize>().ok()?;
                let item = array.get(index)?;
                if rest.len() == 1 {
                    Some(item)
                } else {
                    item.as_document()?.deep_get(&rest[1..])
                }
            }
            _ => None,
        }
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> RepoResult<()> {
        let Some((first, rest)) = splits.split_first() else {
            log::error!("Empty embedded key");
            return Err(RepoError::new("Empty embedded key", ErrorKind::InvalidArgument));
        };

        if first.is_empty() {
            log::error!("Document does not support empty key segment");
            return Err(RepoError::new(
                "Document does not support empty key segment",
                ErrorKind::InvalidArgument,
            ));
        }

        if rest.is_empty() {
            self.data.insert(first.to_string(), value);
            return Ok(());
        }

        match self.data.get_mut(*first) {
            Some(Value::Document(nested)) => nested.deep_put(rest, value),
            Some(other) if !other.is_null() => {
                log::error!("Cannot descend into non-document field '{}'", first);
                Err(RepoError::new(
                    &format!("Cannot set '{}': field '{}' is not a document", splits.join(FIELD_SEPARATOR), first),
                    ErrorKind::InvalidArgument,
                ))
            }
            _ => {
                let mut nested = Document::new();
                nested.deep_put(rest, value)?;
                self.data.insert(first.to_string(), Value::Document(nested));
                Ok(())
            }
        }
    }

    fn deep_remove(&mut self, splits: &[&str]) -> Option<Value> {
        let (first, rest) = splits.split_first()?;
        if rest.is_empty() {
            return self.data.shift_remove(*first);
        }

        match self.data.get_mut(*first) {
            Some(Value::Document(nested)) => nested.deep_remove(rest),
            _ => None,
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Document {}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.iter().cmp(other.data.iter())
    }
}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.len().hash(state);
        for (key, value) in &self.data {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.data.iter())
    }
}

/// Builds a [`Document`] from `key => value` pairs.
///
/// ```rust
/// use docrepo::doc;
///
/// let doc = doc! { "name" => "Ada", "age" => 36 };
/// assert_eq!(doc.size(), 2);
/// ```
#[macro_export]
macro_rules! doc {
    () => { $crate::common::Document::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut document = $crate::common::Document::new();
        $(
            document
                .put($key, $value)
                .expect("doc! keys must be non-empty");
        )+
        document
    }};
}
