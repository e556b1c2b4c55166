//! Parsed form of a `#[derive(Persist)]` input.

// -----------------------------------------------------------------------------
// Modules

mod attributes;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, TypeAttributes};

use syn::{Data, DeriveInput, Fields, Generics, Ident, Index, Member, Path, Type};

use crate::path;

/// How the fields of a struct or variant are written.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldsKind {
    Named,
    Unnamed,
    Unit,
}

pub(crate) struct FieldData {
    /// `self.#member`
    pub member: Member,
    pub ty: Type,
    /// Trace tag.
    pub tag: String,
    pub skip: bool,
}

pub(crate) struct FieldsData {
    pub kind: FieldsKind,
    pub fields: Vec<FieldData>,
}

impl FieldsData {
    fn parse(fields: &Fields) -> syn::Result<Self> {
        let kind = match fields {
            Fields::Named(_) => FieldsKind::Named,
            Fields::Unnamed(_) => FieldsKind::Unnamed,
            Fields::Unit => FieldsKind::Unit,
        };

        let fields = fields
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
                let member = match &field.ident {
                    Some(ident) => Member::Named(ident.clone()),
                    None => Member::Unnamed(Index::from(index)),
                };
                let tag = match (&attrs.rename, &field.ident) {
                    (Some(rename), _) => rename.value(),
                    (None, Some(ident)) => syn::ext::IdentExt::unraw(ident).to_string(),
                    (None, None) => index.to_string(),
                };
                Ok(FieldData {
                    member,
                    ty: field.ty.clone(),
                    tag,
                    skip: attrs.skip,
                })
            })
            .collect::<syn::Result<_>>()?;

        Ok(Self { kind, fields })
    }

    /// Fields that are saved and loaded.
    pub fn active(&self) -> impl Iterator<Item = (usize, &FieldData)> {
        self.fields.iter().enumerate().filter(|(_, field)| !field.skip)
    }
}

pub(crate) struct VariantData {
    pub ident: Ident,
    pub fields: FieldsData,
}

pub(crate) enum Body {
    Struct(FieldsData),
    Enum(Vec<VariantData>),
}

// -----------------------------------------------------------------------------
// PersistDerive

pub(crate) struct PersistDerive {
    pub ident: Ident,
    pub generics: Generics,
    pub attrs: TypeAttributes,
    /// Path to `ogre_serial`.
    pub krate: Path,
    pub body: Body,
}

impl PersistDerive {
    pub fn parse(ast: &DeriveInput) -> syn::Result<Self> {
        let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;

        if let Some(tag) = &attrs.tag
            && !ast.generics.params.is_empty()
        {
            return Err(syn::Error::new(
                tag.span(),
                "`tag` is not supported on generic types",
            ));
        }

        let body = match &ast.data {
            Data::Struct(data) => Body::Struct(FieldsData::parse(&data.fields)?),
            Data::Enum(data) => Body::Enum(
                data.variants
                    .iter()
                    .map(|variant| {
                        attributes::reject_variant_attrs(&variant.attrs)?;
                        Ok(VariantData {
                            ident: variant.ident.clone(),
                            fields: FieldsData::parse(&variant.fields)?,
                        })
                    })
                    .collect::<syn::Result<_>>()?,
            ),
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span,
                    "`Persist` cannot be derived for unions",
                ));
            }
        };

        let krate = match &attrs.krate {
            Some(path) => path.clone(),
            None => path::ogre_serial(),
        };

        Ok(Self {
            ident: ast.ident.clone(),
            generics: ast.generics.clone(),
            attrs,
            krate,
            body,
        })
    }
}
