//! Code generation.

// -----------------------------------------------------------------------------
// Modules

mod enum_kind;
mod polymorphic;
mod struct_kind;

// -----------------------------------------------------------------------------
// Internal API

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Generics, Ident, parse_quote};

use crate::derive_data::{Body, PersistDerive};
use crate::path;

pub(crate) fn impl_persist(derive: &PersistDerive) -> TokenStream {
    let krate = &derive.krate;
    let persist_ = path::persist_(krate);
    let serializer_ = path::serializer_(krate);
    let result_ = path::result_(krate);

    let (save_uses_s, save, load_uses_s, load) = match &derive.body {
        Body::Struct(fields) => (
            fields.active().next().is_some(),
            struct_kind::save_body(fields),
            fields.active().next().is_some(),
            struct_kind::load_body(fields),
        ),
        Body::Enum(variants) => (
            !variants.is_empty(),
            enum_kind::save_body(variants),
            true,
            enum_kind::load_body(krate, variants),
        ),
    };
    let save_s = serializer_ident(save_uses_s);
    let load_s = serializer_ident(load_uses_s);

    let generics = bounded_generics(derive);
    let ident = &derive.ident;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let polymorphic = polymorphic::impl_polymorphic(derive);

    quote! {
        impl #impl_generics #persist_ for #ident #ty_generics #where_clause {
            fn save(&self, #save_s: &mut #serializer_<'_>) -> #result_<()> {
                #save
            }

            fn load(&mut self, #load_s: &mut #serializer_<'_>) -> #result_<()> {
                #load
            }
        }

        #polymorphic
    }
}

// The generated bodies refer to the serializer as `s`.
fn serializer_ident(used: bool) -> Ident {
    if used {
        format_ident!("s")
    } else {
        format_ident!("_s")
    }
}

// `T: Persist` for every type parameter, plus `Default` where enum loads
// construct fields.
fn bounded_generics(derive: &PersistDerive) -> Generics {
    let persist_ = path::persist_(&derive.krate);
    let needs_default = matches!(derive.body, Body::Enum(_));

    let mut generics = derive.generics.clone();
    let params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for param in params {
        if needs_default {
            where_clause
                .predicates
                .push(parse_quote!(#param: #persist_ + ::core::default::Default));
        } else {
            where_clause.predicates.push(parse_quote!(#param: #persist_));
        }
    }
    generics
}

/// Binding of the field at `index` in generated patterns.
fn field_binding(index: usize) -> Ident {
    format_ident!("__field_{}", index)
}

fn ok_unit() -> TokenStream {
    quote! { ::core::result::Result::Ok(()) }
}
