use syn::{Attribute, LitStr, Path};

use crate::PERSIST_ATTRIBUTE_NAME;

fn persist_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident(PERSIST_ATTRIBUTE_NAME))
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// `#[persist(...)]` on the type.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    /// `tag = "..."`
    pub tag: Option<LitStr>,
    /// `crate = "..."`
    pub krate: Option<Path>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in persist_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("tag") {
                    if out.tag.is_some() {
                        return Err(meta.error("duplicate `tag` attribute"));
                    }
                    let tag: LitStr = meta.value()?.parse()?;
                    if tag.value().is_empty() {
                        return Err(syn::Error::new(tag.span(), "type tag must not be empty"));
                    }
                    out.tag = Some(tag);
                    Ok(())
                } else if meta.path.is_ident("crate") {
                    if out.krate.is_some() {
                        return Err(meta.error("duplicate `crate` attribute"));
                    }
                    let path: LitStr = meta.value()?.parse()?;
                    out.krate = Some(path.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported attribute, expected `tag` or `crate`"))
                }
            })?;
        }
        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// `#[persist(...)]` on a field.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    /// `skip`
    pub skip: bool,
    /// `rename = "..."`
    pub rename: Option<LitStr>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in persist_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    out.skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    if out.rename.is_some() {
                        return Err(meta.error("duplicate `rename` attribute"));
                    }
                    out.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported attribute, expected `skip` or `rename`"))
                }
            })?;
        }
        if let Some(rename) = &out.rename
            && out.skip
        {
            return Err(syn::Error::new(
                rename.span(),
                "`skip` and `rename` cannot be combined",
            ));
        }
        Ok(out)
    }
}

/// Variants carry no attributes of their own.
pub(crate) fn reject_variant_attrs(attrs: &[Attribute]) -> syn::Result<()> {
    match persist_attrs(attrs).next() {
        Some(attr) => Err(syn::Error::new_spanned(
            attr,
            "`persist` attributes are not supported on variants",
        )),
        None => Ok(()),
    }
}
