#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// `#[derive(Persist)]` expands to `::ogre_serial::...` paths; this makes them
// resolve inside the crate as well.
extern crate self as ogre_serial;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod container;
mod error;
mod identity;
mod persist;
mod pointer;
mod registry;
mod serializer;

pub mod codec;
pub mod config;
pub mod medium;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use container::{ByteBuf, Matrix};
pub use error::{Result, SerialError};
pub use identity::{RecordKind, Token};
pub use persist::Persist;
pub use pointer::{Pointee, Polymorphic, Ptr, Shared, WeakPtr};
pub use registry::TypeRegistry;
pub use serializer::{Serializer, SerializerBuilder};

pub use config::{Format, SerializerConfig, TraceMode};

/// `#[derive(Persist)]`.
///
/// Members are saved in declaration order, each under its field name (or
/// index, for tuple structs) as trace tag. Enums save the variant index
/// under the tag `variant`, then the fields of that variant; loading an
/// enum rebuilds the variant with [`Default`] fields first.
///
/// Type attributes:
/// - `#[persist(tag = "Name")]`: also implement [`Polymorphic`] with this tag.
/// - `#[persist(crate = "path")]`: path of this crate, if it cannot be
///   found from `Cargo.toml`.
///
/// Field attributes:
/// - `#[persist(skip)]`: neither saved nor loaded.
/// - `#[persist(rename = "name")]`: use `name` as trace tag.
///
/// Every type parameter gets a [`Persist`] bound.
///
/// # Examples
///
/// ```
/// use ogre_serial::{Persist, Ptr, Serializer};
///
/// #[derive(Persist, Default)]
/// enum Support {
///     #[default]
///     Free,
///     Pinned { x: f64, y: f64 },
/// }
///
/// #[derive(Persist, Default)]
/// struct Joint {
///     #[persist(rename = "support_kind")]
///     support: Support,
///     #[persist(skip)]
///     cache: Vec<f64>,
///     neighbour: Ptr<Joint>,
/// }
///
/// let mut s = Serializer::new();
/// let joint = Joint {
///     support: Support::Pinned { x: 1.0, y: 2.0 },
///     cache: vec![3.0],
///     neighbour: Ptr::null(),
/// };
/// s.save("joint", &joint).unwrap();
///
/// let mut back = Joint::default();
/// s.load("joint", &mut back).unwrap();
/// let Support::Pinned { x, y } = back.support else {
///     panic!("wrong variant");
/// };
/// assert_eq!((x, y), (1.0, 2.0));
/// assert!(back.cache.is_empty());
/// ```
pub use ogre_serial_derive::Persist;
