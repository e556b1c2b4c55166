//! Paths into `ogre_serial` used by the generated code.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// The path under which the caller reaches `ogre_serial`.
///
/// Reading the caller's manifest is comparatively expensive, so this is
/// called once per derive and the result passed around.
pub(crate) fn ogre_serial() -> syn::Path {
    ogre_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("ogre_serial"))
}

// -----------------------------------------------------------------------------
// Items

#[inline]
pub(crate) fn persist_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::Persist }
}

#[inline]
pub(crate) fn polymorphic_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::Polymorphic }
}

#[inline]
pub(crate) fn serializer_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::Serializer }
}

#[inline]
pub(crate) fn result_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::Result }
}

#[inline]
pub(crate) fn unknown_variant_(krate: &syn::Path) -> TokenStream {
    quote! { #krate::__macro_exports::unknown_variant }
}
