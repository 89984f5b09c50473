use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::{DataStruct, DeriveInput, Field, LitStr, Result};

use crate::convertible::{ignored_fields, named_fields, stored_name};

pub(crate) fn generate_entity_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut entity_name = name.to_string();
    let mut id_by_name: Option<LitStr> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    if s.value().is_empty() {
                        return Err(meta.error("entity name cannot be empty"));
                    }
                    entity_name = s.value();
                    Ok(())
                } else if meta.path.is_ident("id") {
                    meta.parse_nested_meta(|meta| {
                        if meta.path.is_ident("field") {
                            id_by_name = Some(meta.value()?.parse()?);
                            Ok(())
                        } else {
                            Err(meta.error("Unknown id attribute, expected `field = \"...\"`"))
                        }
                    })
                } else {
                    Err(meta.error("Unknown entity attribute, expected `name` or `id(field = ...)`"))
                }
            })?;
        }
    }

    let fields = named_fields(ast, data)?;
    let ignored = ignored_fields(ast)?;
    let id_field = find_id_field(ast, &fields, id_by_name)?;

    let id_ident = &id_field.ident;
    let id_type = &id_field.ty;
    let id_name = stored_name(id_field)?;
    if id_ident
        .as_ref()
        .is_some_and(|ident| ignored.contains(&ident.to_string()))
    {
        return Err(syn::Error::new_spanned(
            id_field,
            "the identity field cannot be ignored by the converter",
        ));
    }

    let mut selectors = Vec::with_capacity(fields.len());
    for field in &fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if ignored.contains(&ident.to_string()) {
            continue;
        }

        let stored = stored_name(field)?;
        let const_name = Ident::new(
            &ident.to_string().trim_start_matches("r#").to_uppercase(),
            Span::call_site(),
        );
        let ty = &field.ty;
        let doc = format!("Selector of the `{}` field.", stored);
        selectors.push(quote! {
            #[doc = #doc]
            pub const #const_name: ::docrepo::common::Field<Self, #ty> = ::docrepo::common::Field::named(#stored);
        });
    }

    Ok(quote! {
        impl #impl_generics ::docrepo::repository::Entity for #name #ty_generics #where_clause {
            type Id = #id_type;

            fn entity_name() -> &'static str {
                #entity_name
            }

            fn id_field() -> &'static str {
                #id_name
            }

            fn id(&self) -> &Self::Id {
                &self.#id_ident
            }
        }

        #[allow(dead_code)]
        impl #impl_generics #name #ty_generics #where_clause {
            #(#selectors)*
        }
    })
}

/// The single identity field: marked `#[entity(id)]` or named by `#[entity(id(field = ...))]`.
fn find_id_field<'a>(ast: &DeriveInput, fields: &[&'a Field], by_name: Option<LitStr>) -> Result<&'a Field> {
    let mut marked: Option<&'a Field> = None;
    for field in fields.iter().copied() {
        for attr in &field.attrs {
            if !attr.path().is_ident("entity") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    if marked.is_some() {
                        return Err(meta.error("Multiple id fields are not allowed"));
                    }
                    marked = Some(field);
                    Ok(())
                } else {
                    Err(meta.error("Unknown entity field attribute, expected `id`"))
                }
            })?;
        }
    }

    match (marked, by_name) {
        (Some(field), None) => Ok(field),
        (None, Some(name)) => fields
            .iter()
            .copied()
            .find(|field| field.ident.as_ref().is_some_and(|ident| *ident == name.value()))
            .ok_or_else(|| {
                syn::Error::new_spanned(
                    &name,
                    format!("Id field `{}` does not exist in `{}`", name.value(), ast.ident),
                )
            }),
        (Some(field), Some(_)) => Err(syn::Error::new_spanned(
            field,
            "Identity declared twice: use either `#[entity(id)]` on a field or `#[entity(id(field = ...))]`",
        )),
        (None, None) => Err(syn::Error::new_spanned(
            &ast.ident,
            format!(
                "`{}` has no identity field; mark exactly one field with `#[entity(id)]`",
                ast.ident
            ),
        )),
    }
}
