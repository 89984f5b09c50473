//! The document store collaborator.
//!
//! A repository never talks to a storage engine directly. It drives a
//! [`DocumentCollection`], a handle bound to one named collection, obtained from a
//! [`DocumentDatabase`]. Any engine exposing these primitives can back a repository;
//! [`memory`] provides an embedded implementation.

mod collection;
mod find_options;
pub mod memory;
mod results;
mod write_model;

pub use collection::*;
pub use find_options::*;
pub use results::*;
pub use write_model::*;
