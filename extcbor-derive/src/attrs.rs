use syn::{meta::ParseNestedMeta, spanned::Spanned, Attribute, LitStr};

/// Options written as `#[cbor(...)]` on a named field or an enum variant.
#[derive(Default, Clone)]
pub(crate) struct KeyAttrs {
    pub(crate) rename: Option<LitStr>,
    pub(crate) skip: bool,
    pub(crate) default: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Site {
    Field,
    Variant,
}

fn cbor_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|a| a.path().is_ident("cbor"))
}

fn set_flag(meta: &ParseNestedMeta<'_>, flag: &mut bool, name: &str) -> syn::Result<()> {
    if *flag {
        return Err(meta.error(format!("`cbor({name})` given twice")));
    }
    *flag = true;
    Ok(())
}

fn parse_key_attrs(attrs: &[Attribute], site: Site) -> syn::Result<KeyAttrs> {
    let mut out = KeyAttrs::default();
    for attr in cbor_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if out.rename.is_some() {
                    return Err(meta.error("`cbor(rename = ...)` given twice"));
                }
                out.rename = Some(meta.value()?.parse()?);
                return Ok(());
            }
            match site {
                Site::Field if meta.path.is_ident("skip") => set_flag(&meta, &mut out.skip, "skip"),
                Site::Field if meta.path.is_ident("default") => {
                    set_flag(&meta, &mut out.default, "default")
                }
                Site::Field => Err(meta.error("expected `rename`, `skip` or `default`")),
                Site::Variant => Err(meta.error("enum variants only accept `rename`")),
            }
        })?;
        if out.skip && (out.rename.is_some() || out.default) {
            return Err(syn::Error::new(
                attr.span(),
                "a skipped field takes no `rename` or `default`",
            ));
        }
    }
    Ok(out)
}

pub(crate) fn field_attrs(attrs: &[Attribute]) -> syn::Result<KeyAttrs> {
    parse_key_attrs(attrs, Site::Field)
}

pub(crate) fn variant_attrs(attrs: &[Attribute]) -> syn::Result<KeyAttrs> {
    parse_key_attrs(attrs, Site::Variant)
}

pub(crate) fn reject_attrs(attrs: &[Attribute], what: &str) -> syn::Result<()> {
    match cbor_attrs(attrs).next() {
        Some(a) => Err(syn::Error::new(
            a.span(),
            format!("`#[cbor(...)]` is not accepted on {what}"),
        )),
        None => Ok(()),
    }
}

/// Tuple fields are positional, so they accept no `cbor` attributes.
pub(crate) fn positional_fields(fields: &syn::FieldsUnnamed) -> syn::Result<()> {
    fields
        .unnamed
        .iter()
        .try_for_each(|f| reject_attrs(&f.attrs, "tuple fields"))
}

/// Map key for a field or variant: the `rename` literal, else the identifier without `r#`.
pub(crate) fn key_name(rename: Option<&LitStr>, ident: &syn::Ident) -> LitStr {
    rename.cloned().unwrap_or_else(|| {
        let name = ident.to_string();
        LitStr::new(name.strip_prefix("r#").unwrap_or(&name), ident.span())
    })
}
