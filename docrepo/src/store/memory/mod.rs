//! Embedded, process-local document store.
//!
//! Documents live in memory for the lifetime of the [`InMemoryDatabase`]. The store
//! follows the usual document-store write semantics (duplicate keys, immutable
//! identities, ordered and unordered bulk writes) so repositories behave the same
//! against it as against a server-backed engine.

mod collection;
mod config;
mod database;

pub use collection::*;
pub use config::*;
pub use database::*;
