//! Derive macros for `extcbor`.
//!
//! `#[derive(ToCbor, FromCbor)]` maps Rust types onto the `CborObject` data model:
//!
//! - named-field structs become maps keyed by field name
//! - tuple structs become arrays of their fields
//! - unit structs become `null`
//! - unit enum variants become their name as text; data variants become a single-entry map from the
//!   variant name to the payload (a newtype variant carries its one field unwrapped)
//!
//! Field attributes: `#[cbor(rename = "...")]`, `#[cbor(skip)]` (omitted on encode, `Default` on
//! decode) and `#[cbor(default)]` (absent key decodes as `Default`). Variants accept
//! `#[cbor(rename = "...")]`. `Option` fields are optional keys.

extern crate proc_macro;

mod attrs;
mod from_cbor;
mod to_cbor;
mod types;
mod util;

use proc_macro::TokenStream;
use syn::{parse_macro_input, Data, DeriveInput};

use crate::attrs::reject_attrs;

#[proc_macro_derive(ToCbor, attributes(cbor))]
pub fn derive_to_cbor(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let out = reject_attrs(&input.attrs, "the type itself").and_then(|()| match &input.data {
        Data::Struct(data) => to_cbor::to_cbor_struct(&input.ident, &input.generics, data),
        Data::Enum(data) => to_cbor::to_cbor_enum(&input.ident, &input.generics, data),
        Data::Union(u) => Err(syn::Error::new(
            u.union_token.span,
            "ToCbor is not supported for unions",
        )),
    });
    TokenStream::from(out.unwrap_or_else(syn::Error::into_compile_error))
}

#[proc_macro_derive(FromCbor, attributes(cbor))]
pub fn derive_from_cbor(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let out = reject_attrs(&input.attrs, "the type itself").and_then(|()| match &input.data {
        Data::Struct(data) => from_cbor::from_cbor_struct(&input.ident, &input.generics, data),
        Data::Enum(data) => from_cbor::from_cbor_enum(&input.ident, &input.generics, data),
        Data::Union(u) => Err(syn::Error::new(
            u.union_token.span,
            "FromCbor is not supported for unions",
        )),
    });
    TokenStream::from(out.unwrap_or_else(syn::Error::into_compile_error))
}
