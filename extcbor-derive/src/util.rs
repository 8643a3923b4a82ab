use proc_macro2::TokenStream;
use syn::{parse_quote, Type, WhereClause, WherePredicate};

pub(crate) fn add_where_bound(wc: &mut WhereClause, ty: &Type, bound: TokenStream) {
    let pred: WherePredicate = parse_quote!(#ty: #bound);
    wc.predicates.push(pred);
}

pub(crate) fn where_clause_or_empty(wc: Option<&WhereClause>) -> WhereClause {
    wc.cloned().unwrap_or_else(|| WhereClause {
        where_token: Default::default(),
        predicates: Default::default(),
    })
}

/// `CborError::new(ErrorCode::<code>, 0)` as tokens.
pub(crate) fn error(code: &str) -> TokenStream {
    let code = syn::Ident::new(code, proc_macro2::Span::call_site());
    quote::quote!(::extcbor::CborError::new(::extcbor::ErrorCode::#code, 0))
}
