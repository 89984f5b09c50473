use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, DataStruct, DeriveInput, Field, Fields, LitStr, Result};

/// Field names listed in `#[converter(ignored = "a, b")]` on the type.
pub(crate) fn ignored_fields(ast: &DeriveInput) -> Result<Vec<String>> {
    let mut ignored = vec![];
    for attr in &ast.attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let list: LitStr = meta.value()?.parse()?;
                    ignored.extend(
                        list.value()
                            .split(',')
                            .map(|name| name.trim().to_string())
                            .filter(|name| !name.is_empty()),
                    );
                    Ok(())
                } else {
                    Err(meta.error("unsupported converter attribute, expected `ignored = \"...\"`"))
                }
            })?;
        }
    }
    Ok(ignored)
}

/// Name under which `field` is stored: its `#[converter(rename = "...")]` or its identifier.
pub(crate) fn stored_name(field: &Field) -> Result<String> {
    let mut name = None;
    for attr in &field.attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let rename: LitStr = meta.value()?.parse()?;
                    if rename.value().is_empty() {
                        return Err(meta.error("renamed field cannot be empty"));
                    }
                    name = Some(rename.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported converter attribute, expected `rename = \"...\"`"))
                }
            })?;
        }
    }

    match name {
        Some(name) => Ok(name),
        None => field
            .ident
            .as_ref()
            .map(|ident| ident.to_string().trim_start_matches("r#").to_string())
            .ok_or_else(|| syn::Error::new_spanned(field, "field must be named")),
    }
}

pub(crate) fn named_fields<'a>(ast: &DeriveInput, data: &'a DataStruct) -> Result<Vec<&'a Field>> {
    match &data.fields {
        Fields::Named(fields) => Ok(fields.named.iter().collect()),
        _ => Err(syn::Error::new_spanned(
            &ast.ident,
            format!(
                "Only structs with named fields are supported, `{}` is a tuple or unit struct",
                ast.ident
            ),
        )),
    }
}

pub(crate) fn generate_convertible_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let ignored = ignored_fields(ast)?;
    let fields = named_fields(ast, data)?;

    let mut puts = Vec::with_capacity(fields.len());
    let mut initializers = Vec::with_capacity(fields.len());
    for field in fields {
        let ident = field.ident.as_ref();
        let ty = &field.ty;
        let plain_name = ident.map(|i| i.to_string()).unwrap_or_default();

        if ignored.contains(&plain_name) {
            initializers.push(quote! { #ident: ::core::default::Default::default() });
            continue;
        }

        let name = stored_name(field)?;
        puts.push(quote! {
            document.put(#name, ::docrepo::common::Convertible::to_value(&self.#ident)?)?;
        });
        initializers.push(quote! {
            #ident: <#ty as ::docrepo::common::Convertible>::from_value(&document.get(#name))?
        });
    }

    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::docrepo::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> ::docrepo::errors::RepoResult<::docrepo::common::Value> {
                let mut document = ::docrepo::common::Document::new();
                #(#puts)*
                Ok(::docrepo::common::Value::Document(document))
            }

            fn from_value(value: &::docrepo::common::Value) -> ::docrepo::errors::RepoResult<Self::Output> {
                match value {
                    ::docrepo::common::Value::Document(document) => Ok(#name {
                        #(#initializers,)*
                    }),
                    other => Err(::docrepo::errors::RepoError::new(
                        &format!("Cannot convert {} value to {}", other.type_name(), #type_name),
                        ::docrepo::errors::ErrorKind::ObjectMappingError,
                    )),
                }
            }
        }
    })
}

pub(crate) fn generate_convertible_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut to_arms = Vec::with_capacity(data.variants.len());
    let mut from_arms = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                format!(
                    "Variant `{}::{}` carries data; only field-less enums can derive Convertible",
                    name, variant.ident
                ),
            ));
        }

        let ident = &variant.ident;
        let variant_name = ident.to_string();
        to_arms.push(quote! {
            #name::#ident => #variant_name
        });
        from_arms.push(quote! {
            Some(#variant_name) => Ok(#name::#ident)
        });
    }

    Ok(quote! {
        impl #impl_generics ::docrepo::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> ::docrepo::errors::RepoResult<::docrepo::common::Value> {
                let variant = match self {
                    #(#to_arms,)*
                };
                Ok(::docrepo::common::Value::from(variant))
            }

            fn from_value(value: &::docrepo::common::Value) -> ::docrepo::errors::RepoResult<Self::Output> {
                match value.as_str() {
                    #(#from_arms,)*
                    _ => Err(::docrepo::errors::RepoError::new(
                        &format!("Value {} is not a variant of {}", value, #type_name),
                        ::docrepo::errors::ErrorKind::ObjectMappingError,
                    )),
                }
            }
        }
    })
}
