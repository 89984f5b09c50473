use crate::common::Value;

use super::basic_filters::{ComparisonFilter, ComparisonOp, EqualsFilter, InFilter, NotEqualsFilter};
use super::Filter;

/// Starts a filter on the field `field_name` (dotted paths allowed).
///
/// ```rust
/// use docrepo::doc;
/// use docrepo::filter::field;
///
/// let doc = doc! { "address" => doc! { "city" => "Oslo" } };
/// assert!(field("address.city").eq("Oslo").apply(&doc).unwrap());
/// ```
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// Field half of a filter, completed by one of its operator methods.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(EqualsFilter::new(self.field_name, value.into()))
    }

    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(NotEqualsFilter::new(self.field_name, value.into()))
    }

    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value.into(), ComparisonOp::Greater)
    }

    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value.into(), ComparisonOp::GreaterEqual)
    }

    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value.into(), ComparisonOp::Lesser)
    }

    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        self.compare(value.into(), ComparisonOp::LesserEqual)
    }

    /// Matches when the field equals any of `values`.
    pub fn in_values(self, values: Vec<Value>) -> Filter {
        Filter::new(InFilter::new(self.field_name, values))
    }

    #[inline]
    fn compare(self, value: Value, op: ComparisonOp) -> Filter {
        Filter::new(ComparisonFilter::new(self.field_name, value, op))
    }
}
