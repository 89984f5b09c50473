//! # docrepo - typed repositories over document stores
//!
//! `docrepo` maps Rust types onto collections of a document store and offers one
//! repository type with the usual data-access operations: existence checks, counts,
//! single and bulk inserts, filtered, sorted and paginated retrieval, partial
//! updates, full replacement, upserts and deletes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docrepo::repository::Repository;
//! use docrepo::store::memory::InMemoryDatabase;
//! use docrepo_derive::{Convertible, DocumentEntity};
//!
//! #[derive(Convertible, DocumentEntity, Clone, Debug)]
//! struct Book {
//!     #[entity(id)]
//!     isbn: String,
//!     title: String,
//!     pages: u32,
//! }
//!
//! let db = InMemoryDatabase::new();
//! let books = Repository::<Book>::new(&db)?;
//!
//! books.insert_many(catalogue).await?;
//! let long_reads = books.get_sorted(Book::PAGES.gt(500u32), &[Book::TITLE.ascending()]).await?;
//! books.update_field_where(Book::ISBN.eq("978-0"), Book::PAGES, 512u32).await?;
//! ```
//!
//! ## Design
//!
//! - **Compile-time identity**: every entity declares its identity field through the
//!   [`repository::Entity`] trait, usually derived with `#[derive(DocumentEntity)]`.
//! - **Typed updates**: field selectors (`Book::PAGES`) carry the entity and value type,
//!   so partial updates and sorts are checked by the compiler.
//! - **Bounded bulk writes**: multi-document inserts and upserts are split into batches
//!   of [`common::BATCH_SIZE`] documents submitted one after the other.
//! - **One async API**: [`repository::Repository`] is asynchronous;
//!   [`repository::BlockingRepository`] drives it to completion for synchronous callers.
//! - **Pluggable store**: any engine implementing [`store::DocumentCollection`] can back
//!   a repository. [`store::memory`] provides an embedded one.
//!
//! ## Module Organization
//!
//! - [`common`] - values, documents, conversions, field selectors
//! - [`config`] - repository configuration and builder
//! - [`errors`] - error types and result definitions
//! - [`filter`] - document predicates
//! - [`repository`] - identity resolution, update builder, batching and the repository
//! - [`store`] - store collaborator traits and the in-memory store

pub mod common;
pub mod config;
pub mod errors;
pub mod filter;
pub mod repository;
pub mod store;
