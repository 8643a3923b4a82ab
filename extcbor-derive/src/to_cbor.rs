use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DataEnum, DataStruct, Fields, FieldsNamed, FieldsUnnamed, Generics, Ident, Type};

use crate::attrs::{field_attrs, key_name, positional_fields, variant_attrs};
use crate::types::type_mentions_ident;
use crate::util::{add_where_bound, where_clause_or_empty};

/// Map-building statements for named fields; `access` yields an expression of type `&T`.
fn named_entries<'a, F>(
    name: &Ident,
    fields: &'a FieldsNamed,
    bounds: &mut Vec<&'a Type>,
    access: F,
) -> syn::Result<(Vec<TokenStream>, Vec<&'a Ident>)>
where
    F: Fn(&Ident) -> TokenStream,
{
    let mut entries = Vec::new();
    let mut bound_idents = Vec::new();
    for field in &fields.named {
        let attr = field_attrs(&field.attrs)?;
        if attr.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let key = key_name(attr.rename.as_ref(), ident);
        if !type_mentions_ident(&field.ty, name) {
            bounds.push(&field.ty);
        }
        let expr = access(ident);
        entries.push(quote! {
            map.insert(
                ::extcbor::CborObject::from(#key),
                ::extcbor::ToCbor::to_cbor(#expr)?,
            )?;
        });
        bound_idents.push(ident);
    }
    Ok((entries, bound_idents))
}

fn tuple_items<'a, F>(
    name: &Ident,
    fields: &'a FieldsUnnamed,
    bounds: &mut Vec<&'a Type>,
    access: F,
) -> syn::Result<Vec<TokenStream>>
where
    F: Fn(usize) -> TokenStream,
{
    positional_fields(fields)?;
    let mut items = Vec::new();
    for (idx, field) in fields.unnamed.iter().enumerate() {
        if !type_mentions_ident(&field.ty, name) {
            bounds.push(&field.ty);
        }
        let expr = access(idx);
        items.push(quote!(::extcbor::ToCbor::to_cbor(#expr)?));
    }
    Ok(items)
}

fn finish_impl(
    name: &Ident,
    generics: &Generics,
    bounds: &[&Type],
    body: &TokenStream,
) -> TokenStream {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let mut wc = where_clause_or_empty(where_clause);
    for ty in bounds {
        add_where_bound(&mut wc, ty, quote!(::extcbor::ToCbor));
    }
    quote! {
        impl #impl_generics ::extcbor::ToCbor for #name #ty_generics #wc {
            fn to_cbor(&self) -> ::core::result::Result<::extcbor::CborObject, ::extcbor::CborError> {
                #body
            }
        }
        impl #impl_generics ::extcbor::CborArrayElem for #name #ty_generics #where_clause {}
    }
}

pub(crate) fn to_cbor_struct(
    name: &Ident,
    generics: &Generics,
    data: &DataStruct,
) -> syn::Result<TokenStream> {
    let mut bounds = Vec::new();
    let body = match &data.fields {
        Fields::Named(fields) => {
            let (entries, _) =
                named_entries(name, fields, &mut bounds, |ident| quote!(&self.#ident))?;
            quote! {
                let mut map = ::extcbor::CborObject::new_map();
                #(#entries)*
                ::core::result::Result::Ok(map)
            }
        }
        Fields::Unnamed(fields) => {
            let items = tuple_items(name, fields, &mut bounds, |idx| {
                let index = syn::Index::from(idx);
                quote!(&self.#index)
            })?;
            quote! {
                ::core::result::Result::Ok(::extcbor::CborObject::Array(::std::vec![#(#items),*]))
            }
        }
        Fields::Unit => quote!(::core::result::Result::Ok(::extcbor::CborObject::Null)),
    };
    Ok(finish_impl(name, generics, &bounds, &body))
}

pub(crate) fn to_cbor_enum(
    name: &Ident,
    generics: &Generics,
    data: &DataEnum,
) -> syn::Result<TokenStream> {
    let mut bounds = Vec::new();
    let mut arms = Vec::new();

    for variant in &data.variants {
        let v_attr = variant_attrs(&variant.attrs)?;
        let vname = key_name(v_attr.rename.as_ref(), &variant.ident);
        let ident = &variant.ident;
        match &variant.fields {
            Fields::Unit => arms.push(quote! {
                Self::#ident => ::core::result::Result::Ok(::extcbor::CborObject::from(#vname))
            }),
            Fields::Unnamed(fields) => {
                let pats: Vec<_> = (0..fields.unnamed.len())
                    .map(|idx| format_ident!("v{idx}"))
                    .collect();
                let mut items = tuple_items(name, fields, &mut bounds, |idx| {
                    let var = format_ident!("v{idx}");
                    quote!(#var)
                })?;
                // One field is a newtype variant and carries its value unwrapped.
                let payload = if items.len() == 1 {
                    items.remove(0)
                } else {
                    quote!(::extcbor::CborObject::Array(::std::vec![#(#items),*]))
                };
                arms.push(quote! {
                    Self::#ident( #(#pats),* ) => {
                        let mut map = ::extcbor::CborObject::new_map();
                        map.insert(::extcbor::CborObject::from(#vname), #payload)?;
                        ::core::result::Result::Ok(map)
                    }
                });
            }
            Fields::Named(fields) => {
                let (entries, idents) =
                    named_entries(name, fields, &mut bounds, |ident| quote!(#ident))?;
                arms.push(quote! {
                    Self::#ident { #(#idents,)* .. } => {
                        let inner = {
                            let mut map = ::extcbor::CborObject::new_map();
                            #(#entries)*
                            map
                        };
                        let mut map = ::extcbor::CborObject::new_map();
                        map.insert(::extcbor::CborObject::from(#vname), inner)?;
                        ::core::result::Result::Ok(map)
                    }
                });
            }
        }
    }

    let body = if arms.is_empty() {
        quote!(match *self {})
    } else {
        quote! {
            match self {
                #(#arms),*
            }
        }
    };
    Ok(finish_impl(name, generics, &bounds, &body))
}
