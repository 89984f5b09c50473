use crate::common::{Document, Value};
use crate::errors::{ErrorKind, RepoError, RepoResult};

/// Two-way conversion between a Rust value and its stored [`Value`] form.
///
/// Entities implement `Convertible` to produce a [`Value::Document`]; field types
/// implement it to produce scalar values. It is usually derived with
/// `#[derive(Convertible)]` from the `docrepo_derive` crate.
///
/// ```rust
/// use docrepo::common::{Convertible, Value};
///
/// assert_eq!(42u32.to_value().unwrap(), Value::U64(42));
/// assert_eq!(u32::from_value(&Value::U64(42)).unwrap(), 42);
/// assert!(u8::from_value(&Value::U64(300)).is_err());
/// ```
pub trait Convertible {
    type Output;

    fn to_value(&self) -> RepoResult<Value>;
    fn from_value(value: &Value) -> RepoResult<Self::Output>;
}

pub(crate) fn mapping_error(expected: &str, value: &Value) -> RepoError {
    log::error!("Value {} is not a valid {}", value, expected);
    RepoError::new(
        &format!("Cannot convert {} value to {}", value.type_name(), expected),
        ErrorKind::ObjectMappingError,
    )
}

macro_rules! convertible_signed {
    ($($t:ty),*) => {
        $(impl Convertible for $t {
            type Output = $t;

            fn to_value(&self) -> RepoResult<Value> {
                Ok(Value::I64(*self as i64))
            }

            fn from_value(value: &Value) -> RepoResult<$t> {
                value
                    .as_i64()
                    .and_then(|i| <$t>::try_from(i).ok())
                    .ok_or_else(|| mapping_error(stringify!($t), value))
            }
        })*
    };
}

macro_rules! convertible_unsigned {
    ($($t:ty),*) => {
        $(impl Convertible for $t {
            type Output = $t;

            fn to_value(&self) -> RepoResult<Value> {
                Ok(Value::U64(*self as u64))
            }

            fn from_value(value: &Value) -> RepoResult<$t> {
                value
                    .as_u64()
                    .and_then(|u| <$t>::try_from(u).ok())
                    .ok_or_else(|| mapping_error(stringify!($t), value))
            }
        })*
    };
}

convertible_signed!(i8, i16, i32, i64, isize);
convertible_unsigned!(u8, u16, u32, u64, usize);

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> RepoResult<f64> {
        value.as_f64().ok_or_else(|| mapping_error("f64", value))
    }
}

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::F64(*self as f64))
    }

    fn from_value(value: &Value) -> RepoResult<f32> {
        value
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| mapping_error("f32", value))
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> RepoResult<bool> {
        value.as_bool().ok_or_else(|| mapping_error("bool", value))
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> RepoResult<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mapping_error("String", value))
    }
}

impl Convertible for &str {
    type Output = String;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn from_value(value: &Value) -> RepoResult<String> {
        String::from_value(value)
    }
}

impl<T> Convertible for Option<T>
where
    T: Convertible,
{
    type Output = Option<T::Output>;

    fn to_value(&self) -> RepoResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T> Convertible for Vec<T>
where
    T: Convertible,
{
    type Output = Vec<T::Output>;

    fn to_value(&self) -> RepoResult<Value> {
        let mut array = Vec::with_capacity(self.len());
        for item in self {
            array.push(item.to_value()?);
        }
        Ok(Value::Array(array))
    }

    fn from_value(value: &Value) -> RepoResult<Self::Output> {
        match value {
            Value::Array(array) => array.iter().map(T::from_value).collect(),
            other => Err(mapping_error("Vec", other)),
        }
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> RepoResult<Document> {
        value
            .as_document()
            .cloned()
            .ok_or_else(|| mapping_error("Document", value))
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> RepoResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> RepoResult<Value> {
        Ok(value.clone())
    }
}
