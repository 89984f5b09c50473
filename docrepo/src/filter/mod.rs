//! Predicates over documents.
//!
//! A [`Filter`] is an opaque boolean test evaluated against a stored
//! [`Document`](crate::common::Document). The repository passes filters to the store
//! untouched; the store decides how to evaluate them.
//!
//! # Creating Filters
//!
//! - `field("age").gt(30)` - comparison on a named field
//! - `User::AGE.gt(30)` - the same through a typed field selector
//! - `predicate(|u: &User| u.active)` - an arbitrary test over the typed entity
//! - `all()` - match every document
//! - `a.and(b)`, `a.or(b)`, `a.not()` - logical composition
//!
//! ```rust
//! use docrepo::doc;
//! use docrepo::filter::{all, field};
//!
//! let doc = doc! { "age" => 42, "status" => "active" };
//! let filter = field("age").gt(30).and(field("status").eq("active"));
//! assert!(filter.apply(&doc).unwrap());
//! assert!(all().apply(&doc).unwrap());
//! ```

mod basic_filters;
mod filter;
mod fluent;
mod logical_filters;

pub use basic_filters::*;
pub use filter::*;
pub use fluent::*;
pub use logical_filters::*;
