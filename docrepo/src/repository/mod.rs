//! Typed repositories over a document store.
//!
//! A [`Repository<T>`] maps an [`Entity`] type onto one collection of a
//! [`DocumentDatabase`](crate::store::DocumentDatabase) and offers existence checks,
//! counts, inserts, filtered and paginated retrieval, partial and full updates,
//! upserts and deletes.
//!
//! # Pieces
//!
//! - [`IdentityResolver`] finds the identity field of `T` and reads its value
//! - [`UpdateDefinition`] and [`UpdateBuilder`] turn field assignments into one
//!   [`UpdateSpec`]
//! - [`partition`] and the bulk executor split large inputs into bounded bulk writes
//! - [`BlockingRepository`] exposes the same operations synchronously
//!
//! ```rust,ignore
//! use docrepo::repository::Repository;
//! use docrepo::store::memory::InMemoryDatabase;
//! use docrepo_derive::{Convertible, DocumentEntity};
//!
//! #[derive(Convertible, DocumentEntity, Clone, Debug, PartialEq)]
//! struct User {
//!     #[entity(id)]
//!     id: u64,
//!     name: String,
//!     age: u32,
//! }
//!
//! let db = InMemoryDatabase::new();
//! let users = Repository::<User>::new(&db)?;
//! users.insert(User { id: 1, name: "Ada".into(), age: 36 }).await?;
//! users.update_field(User::AGE, 37u32).await?;
//! let ada = users.find(&1).await?;
//! ```

mod batch;
mod blocking;
mod entity;
#[allow(clippy::module_inception)]
mod repository;
mod update;

pub use batch::*;
pub use blocking::*;
pub use entity::*;
pub use repository::*;
pub use update::*;
