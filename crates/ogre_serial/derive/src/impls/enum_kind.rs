use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

use crate::derive_data::{FieldsData, FieldsKind, VariantData};
use crate::path;

use super::{field_binding, ok_unit};

const VARIANT_TAG: &str = "variant";

// `Self::Variant { a: __field_0, .. }`, binding active fields only.
fn save_pattern(variant: &VariantData) -> TokenStream {
    let ident = &variant.ident;
    let fields = &variant.fields;
    match fields.kind {
        FieldsKind::Unit => quote! { Self::#ident },
        FieldsKind::Named => {
            let bindings = fields.active().map(|(index, field)| {
                let member = &field.member;
                let binding = field_binding(index);
                quote! { #member: #binding }
            });
            quote! { Self::#ident { #(#bindings,)* .. } }
        }
        FieldsKind::Unnamed => {
            let bindings = fields.fields.iter().enumerate().map(|(index, field)| {
                if field.skip {
                    quote! { _ }
                } else {
                    let binding = field_binding(index);
                    quote! { #binding }
                }
            });
            quote! { Self::#ident(#(#bindings),*) }
        }
    }
}

// `Self::Variant { a: __field_0, b: Default::default() }`
fn construct(variant: &VariantData) -> TokenStream {
    let ident = &variant.ident;
    let fields = &variant.fields;
    let values = fields.fields.iter().enumerate().map(|(index, field)| {
        if field.skip {
            quote! { ::core::default::Default::default() }
        } else {
            let binding = field_binding(index);
            quote! { #binding }
        }
    });
    match fields.kind {
        FieldsKind::Unit => quote! { Self::#ident },
        FieldsKind::Named => {
            let members = fields.fields.iter().map(|field| &field.member);
            quote! { Self::#ident { #(#members: #values),* } }
        }
        FieldsKind::Unnamed => quote! { Self::#ident(#(#values),*) },
    }
}

pub(super) fn save_body(variants: &[VariantData]) -> TokenStream {
    if variants.is_empty() {
        return quote! { match *self {} };
    }

    let arms = variants.iter().enumerate().map(|(index, variant)| {
        let index = index as u32;
        let pattern = save_pattern(variant);
        let saves = variant.fields.active().map(|(index, field)| {
            let tag = &field.tag;
            let binding = field_binding(index);
            quote! { s.save(#tag, #binding)?; }
        });
        quote! {
            #pattern => {
                s.save(#VARIANT_TAG, &#index)?;
                #(#saves)*
            }
        }
    });
    let ok = ok_unit();
    quote! {
        match self {
            #(#arms)*
        }
        #ok
    }
}

pub(super) fn load_body(krate: &Path, variants: &[VariantData]) -> TokenStream {
    let unknown_variant_ = path::unknown_variant_(krate);
    let ok = ok_unit();

    let arms = variants.iter().enumerate().map(|(index, variant)| {
        let index = index as u32;
        let loads = load_fields(&variant.fields);
        let value = construct(variant);
        quote! {
            #index => {
                #loads
                *self = #value;
                #ok
            }
        }
    });

    quote! {
        let __position = s.read_position();
        let mut __variant: u32 = 0;
        s.load(#VARIANT_TAG, &mut __variant)?;
        match __variant {
            #(#arms)*
            _ => ::core::result::Result::Err(#unknown_variant_(
                __position,
                __variant,
                ::core::any::type_name::<Self>(),
            )),
        }
    }
}

fn load_fields(fields: &FieldsData) -> TokenStream {
    let loads = fields.active().map(|(index, field)| {
        let ty = &field.ty;
        let tag = &field.tag;
        let binding = field_binding(index);
        quote! {
            let mut #binding: #ty = ::core::default::Default::default();
            s.load(#tag, &mut #binding)?;
        }
    });
    quote! { #(#loads)* }
}
