use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DataEnum, DataStruct, Fields, FieldsNamed, FieldsUnnamed, Generics, Ident, WhereClause};

use crate::attrs::{field_attrs, key_name, positional_fields, variant_attrs};
use crate::types::{is_option_type, type_mentions_ident};
use crate::util::{add_where_bound, error, where_clause_or_empty};

/// Builds `target { .. }` from the map held in `value`.
fn named_fields(
    name: &Ident,
    value: &TokenStream,
    fields: &FieldsNamed,
    target: &TokenStream,
    wc: &mut WhereClause,
) -> syn::Result<TokenStream> {
    let missing = error("MissingKey");
    let mut inits = Vec::new();
    for field in &fields.named {
        let attr = field_attrs(&field.attrs)?;
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        if attr.skip {
            add_where_bound(wc, ty, quote!(::core::default::Default));
            inits.push(quote!(#ident: ::core::default::Default::default()));
            continue;
        }
        if !type_mentions_ident(ty, name) {
            add_where_bound(wc, ty, quote!(::extcbor::FromCbor));
        }
        let key = key_name(attr.rename.as_ref(), ident);
        let absent = if attr.default || is_option_type(ty) {
            add_where_bound(wc, ty, quote!(::core::default::Default));
            quote!(::core::default::Default::default())
        } else {
            quote!(return ::core::result::Result::Err(#missing))
        };
        inits.push(quote! {
            #ident: match map.get(&::extcbor::CborObject::from(#key)) {
                ::core::option::Option::Some(v) => ::extcbor::FromCbor::from_cbor(v)?,
                ::core::option::Option::None => #absent,
            }
        });
    }
    Ok(quote! {
        let map = #value.as_map()?;
        ::core::result::Result::Ok(#target { #(#inits),* })
    })
}

/// Builds `target(..)` from the array held in `value`, which must have exactly the field count.
fn tuple_fields(
    name: &Ident,
    value: &TokenStream,
    fields: &FieldsUnnamed,
    target: &TokenStream,
    wc: &mut WhereClause,
) -> syn::Result<TokenStream> {
    positional_fields(fields)?;
    let len = fields.unnamed.len();
    let mismatch = error("LengthMismatch");
    let mut vars = Vec::new();
    let mut decodes = Vec::new();
    for (idx, field) in fields.unnamed.iter().enumerate() {
        if !type_mentions_ident(&field.ty, name) {
            add_where_bound(wc, &field.ty, quote!(::extcbor::FromCbor));
        }
        let var = format_ident!("v{idx}");
        decodes.push(quote! {
            let #var = ::extcbor::FromCbor::from_cbor(&items[#idx])?;
        });
        vars.push(var);
    }
    Ok(quote! {
        let items = #value.as_array()?;
        if items.len() != #len {
            return ::core::result::Result::Err(#mismatch);
        }
        #(#decodes)*
        ::core::result::Result::Ok(#target(#(#vars),*))
    })
}

fn finish_impl(name: &Ident, generics: &Generics, wc: &WhereClause, body: &TokenStream) -> TokenStream {
    let (impl_generics, ty_generics, _) = generics.split_for_impl();
    quote! {
        impl #impl_generics ::extcbor::FromCbor for #name #ty_generics #wc {
            fn from_cbor(value: &::extcbor::CborObject) -> ::core::result::Result<Self, ::extcbor::CborError> {
                #body
            }
        }
    }
}

pub(crate) fn from_cbor_struct(
    name: &Ident,
    generics: &Generics,
    data: &DataStruct,
) -> syn::Result<TokenStream> {
    let mut wc = where_clause_or_empty(generics.where_clause.as_ref());
    let value = quote!(value);
    let body = match &data.fields {
        Fields::Named(fields) => named_fields(name, &value, fields, &quote!(Self), &mut wc)?,
        Fields::Unnamed(fields) => tuple_fields(name, &value, fields, &quote!(Self), &mut wc)?,
        Fields::Unit => {
            let mismatch = error("TypeMismatch");
            quote! {
                if value.untag().is_null() {
                    ::core::result::Result::Ok(Self)
                } else {
                    ::core::result::Result::Err(#mismatch)
                }
            }
        }
    };
    Ok(finish_impl(name, generics, &wc, &body))
}

pub(crate) fn from_cbor_enum(
    name: &Ident,
    generics: &Generics,
    data: &DataEnum,
) -> syn::Result<TokenStream> {
    let mut wc = where_clause_or_empty(generics.where_clause.as_ref());
    let mut unit_arms = Vec::new();
    let mut data_arms = Vec::new();
    let payload = quote!(payload);

    for variant in &data.variants {
        let v_attr = variant_attrs(&variant.attrs)?;
        let vname = key_name(v_attr.rename.as_ref(), &variant.ident);
        let ident = &variant.ident;
        let target = quote!(Self::#ident);
        match &variant.fields {
            Fields::Unit => {
                unit_arms.push(quote!(#vname => ::core::result::Result::Ok(#target)));
                let mismatch = error("TypeMismatch");
                data_arms.push(quote! {
                    #vname => {
                        if #payload.untag().is_null() {
                            ::core::result::Result::Ok(#target)
                        } else {
                            ::core::result::Result::Err(#mismatch)
                        }
                    }
                });
            }
            Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                positional_fields(fields)?;
                let ty = &fields.unnamed[0].ty;
                if !type_mentions_ident(ty, name) {
                    add_where_bound(&mut wc, ty, quote!(::extcbor::FromCbor));
                }
                data_arms.push(quote! {
                    #vname => ::core::result::Result::Ok(#target(::extcbor::FromCbor::from_cbor(#payload)?))
                });
            }
            Fields::Unnamed(fields) => {
                let body = tuple_fields(name, &payload, fields, &target, &mut wc)?;
                data_arms.push(quote!(#vname => { #body }));
            }
            Fields::Named(fields) => {
                let body = named_fields(name, &payload, fields, &target, &mut wc)?;
                data_arms.push(quote!(#vname => { #body }));
            }
        }
    }

    let unknown = error("MissingKey");
    let mismatch = error("TypeMismatch");
    let body = quote! {
        match value.untag() {
            ::extcbor::CborObject::TextString(s) => match s.as_str() {
                #(#unit_arms,)*
                _ => ::core::result::Result::Err(#unknown),
            },
            ::extcbor::CborObject::Map(m) if m.len() == 1 => {
                let ::core::option::Option::Some((k, #payload)) = m.iter().next() else {
                    return ::core::result::Result::Err(#mismatch);
                };
                match k.as_str()? {
                    #(#data_arms,)*
                    _ => ::core::result::Result::Err(#unknown),
                }
            }
            _ => ::core::result::Result::Err(#mismatch),
        }
    };
    Ok(finish_impl(name, generics, &wc, &body))
}
