//! Polymorphic type registry.
//!
//! A stream records the *type tag* of every object loaded through a
//! polymorphic base. On load the tag is looked up here to build a default
//! instance of the concrete type, which then loads its own body.
//!
//! Types are registered by hand with [`TypeRegistry::register`], or at link
//! time with [`register_type!`](crate::register_type) and collected by
//! [`TypeRegistry::auto_register`].
//!
//! The `auto_register` feature uses the [`inventory`] crate. Not every
//! platform supports it; there `auto_register` returns `false` and types
//! must be registered by hand.
//!
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

#[cfg(feature = "auto_register")]
mod auto_register;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

#[cfg(feature = "auto_register")]
pub use auto_register::AutoRegistration;
pub use type_registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Macros

/// Registers a type at link time, for
/// [`TypeRegistry::auto_register`](crate::TypeRegistry::auto_register).
///
/// - `register_type!(dyn Base => Type, "tag")` makes `Type` loadable through
///   `Ptr<dyn Base>` and `Rc<RefCell<dyn Base>>`.
/// - `register_type!(Type, "tag")` registers `Type` as its own base.
///
/// Without the `auto_register` feature the macro expands to nothing.
///
/// # Examples
///
/// ```
/// use ogre_serial::{Persist, Polymorphic, polymorphic_base, register_type};
///
/// pub trait Element: Polymorphic {}
/// polymorphic_base!(dyn Element);
///
/// #[derive(Persist, Default)]
/// #[persist(tag = "Truss")]
/// pub struct Truss {
///     area: f64,
/// }
/// impl Element for Truss {}
///
/// register_type!(dyn Element => Truss, "Truss");
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! register_type {
    (dyn $base:path => $ty:ty, $tag:expr $(,)?) => {
        const _: () = {
            fn __register(registry: &mut $crate::TypeRegistry) {
                registry.register::<dyn $base, $ty>($tag, |value| value);
            }
            $crate::__macro_exports::inventory::submit! {
                $crate::__macro_exports::AutoRegistration::new(__register)
            }
        };
    };
    ($ty:ty, $tag:expr $(,)?) => {
        const _: () = {
            fn __register(registry: &mut $crate::TypeRegistry) {
                registry.register::<$ty, $ty>($tag, |value| value);
            }
            $crate::__macro_exports::inventory::submit! {
                $crate::__macro_exports::AutoRegistration::new(__register)
            }
        };
    };
}

/// Registers a type at link time.
///
/// The `auto_register` feature is disabled, so this expands to nothing.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! register_type {
    (dyn $base:path => $ty:ty, $tag:expr $(,)?) => {};
    ($ty:ty, $tag:expr $(,)?) => {};
}
