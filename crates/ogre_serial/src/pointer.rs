//! Pointer types with identity.
//!
//! Every pointer record goes through the serializer's identity tables, so
//! shared objects are written once and cycles terminate.
//!
//! | type | null | owning |
//! |---|---|---|
//! | [`Shared<T>`] (`Rc<RefCell<T>>`) | no | yes |
//! | [`Ptr<T>`] | yes, the default | yes |
//! | [`WeakPtr<T>`] | yes, also when dangling | no |
//!
//! `T` is either a concrete [`Persist`] + [`Default`] type, or a trait
//! object declared with [`polymorphic_base!`](crate::polymorphic_base).

use alloc::rc::{Rc, Weak};
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;

use crate::error::{Result, SerialError};
use crate::persist::Persist;
use crate::registry::TypeRegistry;
use crate::serializer::Serializer;

/// A non-null shared handle.
pub type Shared<T> = Rc<RefCell<T>>;

// -----------------------------------------------------------------------------
// Polymorphic

/// A concrete type that can be loaded through a polymorphic base.
///
/// [`type_tag`](Self::type_tag) must return the tag the type is registered
/// under in the [`TypeRegistry`]. `#[derive(Persist)]` implements it from
/// `#[persist(tag = "...")]`.
pub trait Polymorphic: Persist + 'static {
    fn type_tag(&self) -> &'static str;
}

// -----------------------------------------------------------------------------
// Pointee

/// A type that pointer records can point to.
///
/// Implemented for every `Persist + Default` type, which is written as a
/// plain object record, and by [`polymorphic_base!`](crate::polymorphic_base)
/// for trait objects, which record the type tag of the concrete value.
pub trait Pointee: Persist + 'static {
    /// Whether records for this type carry a type tag.
    const POLYMORPHIC: bool;

    /// The tag to record for this value, `None` for static types.
    fn registered_tag(&self) -> Option<&'static str>;

    /// Builds an empty instance to load a record body into.
    ///
    /// `tag` is `Some` exactly when [`POLYMORPHIC`](Self::POLYMORPHIC) is set.
    fn instantiate(tag: Option<&str>, registry: &TypeRegistry) -> Result<Shared<Self>>;
}

impl<T: Persist + Default + 'static> Pointee for T {
    const POLYMORPHIC: bool = false;

    #[inline]
    fn registered_tag(&self) -> Option<&'static str> {
        None
    }

    #[inline]
    fn instantiate(_tag: Option<&str>, _registry: &TypeRegistry) -> Result<Shared<Self>> {
        Ok(Rc::new(RefCell::new(T::default())))
    }
}

/// Implements [`Pointee`] for trait objects of polymorphic base traits.
///
/// The trait must have [`Polymorphic`] as a supertrait. Concrete types are
/// then registered for `dyn Trait` in the [`TypeRegistry`].
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use ogre_serial::{Persist, Polymorphic, Ptr, Serializer, Shared, TypeRegistry, polymorphic_base};
///
/// pub trait Shape: Polymorphic {
///     fn area(&self) -> f64;
/// }
/// polymorphic_base!(dyn Shape);
///
/// #[derive(Persist, Default)]
/// #[persist(tag = "Square")]
/// struct Square {
///     side: f64,
/// }
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.side * self.side
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<dyn Shape, Square>("Square", |v| v);
///
/// let mut s = Serializer::builder().registry(&registry).build();
/// let square: Shared<Square> = Rc::new(RefCell::new(Square { side: 3.0 }));
/// let shape: Ptr<dyn Shape> = Ptr::from_rc(square);
/// s.save("shape", &shape).unwrap();
///
/// let mut back: Ptr<dyn Shape> = Ptr::null();
/// s.load("shape", &mut back).unwrap();
/// assert_eq!(back.borrow().unwrap().area(), 9.0);
/// ```
#[macro_export]
macro_rules! polymorphic_base {
    ($(dyn $base:path),+ $(,)?) => {$(
        impl $crate::Pointee for dyn $base {
            const POLYMORPHIC: bool = true;

            #[inline]
            fn registered_tag(&self) -> ::core::option::Option<&'static str> {
                ::core::option::Option::Some($crate::Polymorphic::type_tag(self))
            }

            fn instantiate(
                tag: ::core::option::Option<&str>,
                registry: &$crate::TypeRegistry,
            ) -> $crate::Result<$crate::Shared<Self>> {
                registry.create::<Self>(tag.unwrap_or_default())
            }
        }
    )+};
}

// -----------------------------------------------------------------------------
// Shared

impl<T: Pointee + ?Sized> Persist for Rc<RefCell<T>> {
    #[inline]
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.save_pointer(Some(self))
    }

    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        let position = s.read_position();
        *self = s
            .load_pointer::<T>()?
            .ok_or_else(|| SerialError::corrupt(position, "null record for a non-null pointer"))?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Ptr

/// A nullable shared handle.
///
/// `Ptr` is [`Default`] (null) for any `T`, trait objects included, so it
/// can be an element of containers and a member of derived types.
pub struct Ptr<T: ?Sized>(Option<Shared<T>>);

impl<T: ?Sized> Ptr<T> {
    /// Wraps `value` in a new, non-null handle.
    #[inline]
    pub fn new(value: T) -> Self
    where
        T: Sized,
    {
        Self(Some(Rc::new(RefCell::new(value))))
    }

    #[inline]
    pub const fn null() -> Self {
        Self(None)
    }

    #[inline]
    pub const fn from_rc(rc: Shared<T>) -> Self {
        Self(Some(rc))
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub fn as_rc(&self) -> Option<&Shared<T>> {
        self.0.as_ref()
    }

    #[inline]
    pub fn into_rc(self) -> Option<Shared<T>> {
        self.0
    }

    /// Borrows the pointee, `None` if null.
    ///
    /// # Panics
    ///
    /// If the pointee is mutably borrowed.
    #[inline]
    pub fn borrow(&self) -> Option<Ref<'_, T>> {
        self.0.as_ref().map(|rc| rc.borrow())
    }

    /// Mutably borrows the pointee, `None` if null.
    ///
    /// # Panics
    ///
    /// If the pointee is borrowed.
    #[inline]
    pub fn borrow_mut(&self) -> Option<RefMut<'_, T>> {
        self.0.as_ref().map(|rc| rc.borrow_mut())
    }

    /// Whether both handles are null or point to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn downgrade(&self) -> WeakPtr<T> {
        WeakPtr(self.0.as_ref().map(Rc::downgrade))
    }
}

impl<T: ?Sized> Default for Ptr<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> Clone for Ptr<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> From<Shared<T>> for Ptr<T> {
    #[inline]
    fn from(rc: Shared<T>) -> Self {
        Self::from_rc(rc)
    }
}

impl<T: ?Sized> fmt::Debug for Ptr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(rc) => write!(f, "Ptr({:p})", Rc::as_ptr(rc)),
            None => f.write_str("Ptr(null)"),
        }
    }
}

impl<T: Pointee + ?Sized> Persist for Ptr<T> {
    #[inline]
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.save_pointer(self.0.as_ref())
    }

    #[inline]
    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        self.0 = s.load_pointer()?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// WeakPtr

/// A non-owning handle.
///
/// A dangling handle is saved as a null record. On load the object is owned
/// by the serializer's identity arena until the arena is reset or dropped;
/// unless an owning pointer to it is loaded as well, the handle dangles
/// from then on.
pub struct WeakPtr<T: ?Sized>(Option<Weak<RefCell<T>>>);

impl<T: ?Sized> WeakPtr<T> {
    #[inline]
    pub const fn null() -> Self {
        Self(None)
    }

    #[inline]
    pub fn upgrade(&self) -> Option<Shared<T>> {
        self.0.as_ref().and_then(Weak::upgrade)
    }

    /// Whether the handle is null or its object is gone.
    #[inline]
    pub fn is_dangling(&self) -> bool {
        self.0.as_ref().is_none_or(|weak| weak.strong_count() == 0)
    }
}

impl<T: ?Sized> Default for WeakPtr<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> Clone for WeakPtr<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> From<&Shared<T>> for WeakPtr<T> {
    #[inline]
    fn from(rc: &Shared<T>) -> Self {
        Self(Some(Rc::downgrade(rc)))
    }
}

impl<T: ?Sized> fmt::Debug for WeakPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(rc) => write!(f, "WeakPtr({:p})", Rc::as_ptr(&rc)),
            None => f.write_str("WeakPtr(dangling)"),
        }
    }
}

impl<T: Pointee + ?Sized> Persist for WeakPtr<T> {
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.save_pointer(self.upgrade().as_ref())
    }

    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        self.0 = s.load_pointer::<T>()?.map(|rc| Rc::downgrade(&rc));
        Ok(())
    }
}
