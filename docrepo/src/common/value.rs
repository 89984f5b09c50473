use crate::common::Document;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// A dynamically typed value stored in a [`Document`].
///
/// `Value` is the common currency between typed entities and the store: entities are
/// converted into documents of values, filters compare values, and sort specifications
/// order documents by values.
///
/// # Ordering
///
/// Values have a total order so that any field can be used as a sort key:
///
/// - `Null` sorts before everything else (a missing field reads as `Null`)
/// - numbers compare numerically across `I64`, `U64` and `F64`
/// - then booleans, strings, arrays and documents, each compared within its own kind
///
/// Equality and hashing agree with that order, so `Value::I64(1) == Value::U64(1)`.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A signed integer.
    I64(i64),
    /// An unsigned integer.
    U64(u64),
    /// A floating point number.
    F64(f64),
    /// A string.
    String(String),
    /// An ordered list of values.
    Array(Vec<Value>),
    /// An embedded document.
    Document(Document),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::I64(_) | Value::U64(_) | Value::F64(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            Value::U64(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(u) => Some(*u),
            Value::I64(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            Value::I64(i) => Some(*i as f64),
            Value::U64(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    /// Short name of the variant, used in mapping error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Document(_) => "document",
        }
    }

    pub(crate) fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::I64(_) | Value::U64(_) | Value::F64(_) => 1,
            Value::Bool(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Document(_) => 5,
        }
    }

    /// Exact integer value of the integral variants.
    fn integer(&self) -> Option<i128> {
        match self {
            Value::I64(i) => Some(*i as i128),
            Value::U64(u) => Some(*u as i128),
            _ => None,
        }
    }
}

/// 2^64, the first float beyond every `I64` and `U64` value.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

fn cmp_numbers(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::F64(x), Value::F64(y)) => normalize_float(*x).total_cmp(&normalize_float(*y)),
        (Value::F64(x), _) => b.integer().map_or(Ordering::Equal, |y| cmp_float_integer(*x, y)),
        (_, Value::F64(_)) => cmp_numbers(b, a).reverse(),
        _ => a.integer().cmp(&b.integer()),
    }
}

/// Compares a float with an integer without rounding either of them.
fn cmp_float_integer(f: f64, i: i128) -> Ordering {
    if f.is_nan() {
        // same place as in `total_cmp`: beyond the infinities
        return if f.is_sign_negative() {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    if f >= TWO_POW_64 {
        return Ordering::Greater;
    }
    if f < -TWO_POW_64 {
        return Ordering::Less;
    }

    let whole = f.trunc();
    match (whole as i128).cmp(&i) {
        Ordering::Equal => f.partial_cmp(&whole).unwrap_or(Ordering::Equal),
        ordering => ordering,
    }
}

#[inline]
fn normalize_float(f: f64) -> f64 {
    if f == 0.0 {
        0.0
    } else {
        f
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = self.type_rank().cmp(&other.type_rank());
        if rank != Ordering::Equal {
            return rank;
        }

        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Document(a), Value::Document(b)) => a.cmp(b),
            _ => cmp_numbers(self, other),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            // an integral float hashes like the integer it equals
            Value::I64(i) => (*i as i128).hash(state),
            Value::U64(u) => (*u as i128).hash(state),
            Value::F64(f) => {
                let f = normalize_float(*f);
                if f.fract() == 0.0 && (-TWO_POW_64..TWO_POW_64).contains(&f) {
                    (f as i128).hash(state)
                } else {
                    f.to_bits().hash(state)
                }
            }
            Value::String(s) => s.hash(state),
            Value::Array(a) => a.hash(state),
            Value::Document(d) => d.hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I64(i) => write!(f, "{}", i),
            Value::U64(u) => write!(f, "{}", u),
            Value::F64(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Array(a) => {
                write!(f, "[")?;
                for (i, v) in a.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Document(d) => write!(f, "{}", d),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::I64(value as i64)
            }
        })*
    };
}

macro_rules! value_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::U64(value as u64)
            }
        })*
    };
}

value_from_signed!(i8, i16, i32, i64);
value_from_unsigned!(u8, u16, u32, u64);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F64(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::I64(i) => serializer.serialize_i64(*i),
            Value::U64(u) => serializer.serialize_u64(*u),
            Value::F64(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(a) => serializer.collect_seq(a),
            Value::Document(d) => d.serialize(serializer),
        }
    }
}
