//! See [`Persist`].
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static PERSIST_ATTRIBUTE_NAME: &str = "persist";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// Implements `ogre_serial::Persist`, and `ogre_serial::Polymorphic` when a
/// type tag is given.
///
/// Members are saved and loaded in declaration order. Each one is passed
/// to `Serializer::save` / `Serializer::load` with its field name, or its
/// index for tuple fields, as trace tag.
///
/// Enums save the index of the variant (in declaration order, explicit
/// discriminants are ignored) under the tag `variant`, then the fields of
/// the variant. Loading builds the variant from [`Default`] field values
/// and loads into them, so every enum field type must be `Default`.
///
/// ## Type attributes
///
/// ```rust, ignore
/// #[derive(Persist, Default)]
/// #[persist(tag = "Beam")]
/// struct Beam { /* ... */ }
/// ```
///
/// - `tag = "..."`: implement `Polymorphic` returning this tag. The type
///   must not be generic.
/// - `crate = "..."`: path to `ogre_serial`, when it cannot be found from
///   the caller's `Cargo.toml`.
///
/// ## Field attributes
///
/// - `skip`: the field is neither saved nor loaded. In enums it is reset to
///   its default on load.
/// - `rename = "..."`: trace tag to use instead of the field name.
///
/// ## Generics
///
/// Every type parameter is bound by `Persist` (and by `Default` for enums).
#[proc_macro_derive(Persist, attributes(persist))]
pub fn derive_persist(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match derive_data::PersistDerive::parse(&ast) {
        Ok(derive) => impls::impl_persist(&derive).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
