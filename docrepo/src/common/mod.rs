//! Value model and typed building blocks shared by the repository and the stores.

mod constants;
mod convertible;
mod document;
mod field;
mod sort_order;
mod value;

pub use constants::*;
pub(crate) use convertible::mapping_error;
pub use convertible::*;
pub use document::*;
pub use field::*;
pub use sort_order::*;
pub use value::*;
