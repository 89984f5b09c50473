#![recursion_limit = "128"]
//! # docrepo derive macros
//!
//! ### `Convertible`
//!
//! Derives `docrepo::common::Convertible`, mapping a struct with named fields to a
//! document (one entry per field) and a field-less enum to the name of its variant.
//!
//! - **Struct attribute**: `#[converter(ignored = "a, b")]` skips fields; they are
//!   restored with `Default::default()`
//! - **Field attribute**: `#[converter(rename = "...")]` changes the stored field name
//!
//! ```rust,ignore
//! use docrepo_derive::Convertible;
//!
//! #[derive(Convertible)]
//! pub struct Address {
//!     pub street: String,
//!     #[converter(rename = "zip")]
//!     pub postal_code: String,
//! }
//!
//! #[derive(Convertible)]
//! pub enum Status {
//!     Active,
//!     Suspended,
//! }
//! ```
//!
//! ### `DocumentEntity`
//!
//! Derives `docrepo::repository::Entity` for a struct that also derives `Convertible`,
//! and adds one typed field selector per stored field as an upper-case associated
//! constant.
//!
//! - **Struct attribute**: `#[entity(name = "...")]` sets the collection name
//!   (defaults to the struct name)
//! - **Field attribute**: `#[entity(id)]` marks the identity field; exactly one field
//!   must carry it
//!
//! ```rust,ignore
//! use docrepo_derive::{Convertible, DocumentEntity};
//!
//! #[derive(Convertible, DocumentEntity)]
//! #[entity(name = "customers")]
//! pub struct Customer {
//!     #[entity(id)]
//!     pub id: u64,
//!     pub name: String,
//! }
//!
//! // generated: Customer::ID: Field<Customer, u64>, Customer::NAME: Field<Customer, String>
//! ```

extern crate proc_macro;
mod convertible;
mod entity;

use crate::convertible::{generate_convertible_for_enum, generate_convertible_for_struct};
use crate::entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives `Convertible` for structs with named fields and field-less enums.
///
/// # Errors
///
/// Returns a compile error for tuple and unit structs, enums whose variants carry
/// data, unions, and malformed `#[converter]` attributes.
#[proc_macro_derive(Convertible, attributes(converter))]
pub fn derive_convertible(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_convertible_for_struct(&ast, data),
        Data::Enum(ref data) => generate_convertible_for_enum(&ast, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "Cannot derive Convertible for unions. Use a struct with named fields or a field-less enum.",
        )),
    };

    result.unwrap_or_else(|e| e.to_compile_error()).into()
}

/// Derives `Entity` and the typed field selectors of a struct.
///
/// # Errors
///
/// Returns a compile error when the struct has no `#[entity(id)]` field, more than
/// one, or when applied to anything but a struct with named fields.
#[proc_macro_derive(DocumentEntity, attributes(entity))]
pub fn derive_document_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    let result = match ast.data {
        Data::Struct(ref data) => generate_entity_for_struct(&ast, data),
        Data::Enum(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "Cannot derive DocumentEntity for enums. Only structs with named fields are supported.",
        )),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "Cannot derive DocumentEntity for unions. Only structs with named fields are supported.",
        )),
    };

    result.unwrap_or_else(|e| e.to_compile_error()).into()
}
