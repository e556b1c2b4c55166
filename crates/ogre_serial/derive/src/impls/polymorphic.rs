use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::PersistDerive;
use crate::path;

pub(super) fn impl_polymorphic(derive: &PersistDerive) -> TokenStream {
    let Some(tag) = &derive.attrs.tag else {
        return TokenStream::new();
    };
    let polymorphic_ = path::polymorphic_(&derive.krate);
    let ident = &derive.ident;

    quote! {
        impl #polymorphic_ for #ident {
            #[inline]
            fn type_tag(&self) -> &'static str {
                #tag
            }
        }
    }
}
