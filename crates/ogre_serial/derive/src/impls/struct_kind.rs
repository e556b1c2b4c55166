use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::FieldsData;

use super::ok_unit;

pub(super) fn save_body(fields: &FieldsData) -> TokenStream {
    let saves = fields.active().map(|(_, field)| {
        let member = &field.member;
        let tag = &field.tag;
        quote! { s.save(#tag, &self.#member)?; }
    });
    let ok = ok_unit();
    quote! {
        #(#saves)*
        #ok
    }
}

pub(super) fn load_body(fields: &FieldsData) -> TokenStream {
    let loads = fields.active().map(|(_, field)| {
        let member = &field.member;
        let tag = &field.tag;
        quote! { s.load(#tag, &mut self.#member)?; }
    });
    let ok = ok_unit();
    quote! {
        #(#loads)*
        #ok
    }
}
