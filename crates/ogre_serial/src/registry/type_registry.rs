use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::cell::RefCell;
use core::fmt;
use std::sync::OnceLock;

use ogre_utils::TypeIdMap;
use ogre_utils::hash::HashMap;

use crate::error::{Result, SerialError};

// A default-constructing factory, already upcast to its base.
type Constructor<B> = Box<dyn Fn() -> Rc<RefCell<B>> + Send + Sync>;

struct TypeEntry {
    type_id: TypeId,
    type_name: &'static str,
    // base `TypeId` -> `Constructor<B>`
    constructors: TypeIdMap<Box<dyn Any + Send + Sync>>,
    bases: Vec<&'static str>,
}

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

// -----------------------------------------------------------------------------
// TypeRegistry

/// Maps type tags to factories of concrete polymorphic types.
///
/// A tag names exactly one concrete type. The type can be registered for
/// several bases (trait objects it can be loaded through); each base gets
/// its own factory.
///
/// A registry is filled once, then [installed](Self::install) as the
/// process-wide instance every [`Serializer`](crate::Serializer) defaults
/// to. After installation it is only read, so creating instances needs no
/// locking.
///
/// # Examples
///
/// ```
/// use core::fmt::Debug;
/// use ogre_serial::TypeRegistry;
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<dyn Debug, u32>("u32", |v| v);
///
/// let value = registry.create::<dyn Debug>("u32").unwrap();
/// assert_eq!(format!("{:?}", value.borrow()), "0");
/// assert_eq!(registry.tag_of::<u32>(), Some("u32"));
/// ```
#[derive(Default)]
pub struct TypeRegistry {
    entries: HashMap<&'static str, TypeEntry>,
    tags: TypeIdMap<&'static str>,
    #[cfg(feature = "auto_register")]
    auto_registered: bool,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: HashMap::with_hasher(ogre_utils::hash::FixedHashState),
            tags: TypeIdMap::new(),
            #[cfg(feature = "auto_register")]
            auto_registered: false,
        }
    }

    /// Registers concrete type `T` under `tag`, constructible through base `B`.
    ///
    /// `upcast` converts the concrete handle into a base handle. For a trait
    /// object base the identity closure `|v| v` is enough: the unsizing
    /// coercion happens in its return position.
    ///
    /// Registering the same `(tag, T, B)` twice logs a warning and keeps the
    /// first registration.
    ///
    /// # Panics
    ///
    /// If `tag` is already registered for another concrete type, or `T` is
    /// already registered under another tag.
    pub fn register<B, T>(
        &mut self,
        tag: &'static str,
        upcast: fn(Rc<RefCell<T>>) -> Rc<RefCell<B>>,
    ) -> &mut Self
    where
        B: ?Sized + 'static,
        T: Default + 'static,
    {
        let type_id = TypeId::of::<T>();
        if let Some(&other) = self.tags.get(&type_id)
            && other != tag
        {
            panic!(
                "`{}` is already registered as `{other}`, cannot register it as `{tag}`",
                type_name::<T>()
            );
        }

        let entry = self.entries.entry(tag).or_insert_with(|| TypeEntry {
            type_id,
            type_name: type_name::<T>(),
            constructors: TypeIdMap::new(),
            bases: Vec::new(),
        });
        if entry.type_id != type_id {
            panic!(
                "type tag `{tag}` is already registered for `{}`, cannot register `{}`",
                entry.type_name,
                type_name::<T>()
            );
        }
        self.tags.insert(type_id, tag);

        let inserted = entry.constructors.try_insert(TypeId::of::<B>(), || {
            let constructor: Constructor<B> =
                Box::new(move || upcast(Rc::new(RefCell::new(T::default()))));
            Box::new(constructor) as Box<dyn Any + Send + Sync>
        });
        if inserted {
            entry.bases.push(type_name::<B>());
        } else {
            log::warn!(
                "`{}` is already registered as `{tag}` for base `{}`",
                type_name::<T>(),
                type_name::<B>()
            );
        }
        self
    }

    /// Creates a default instance of the type registered under `tag`, as a
    /// handle of base `B`.
    ///
    /// # Errors
    ///
    /// - [`UnknownType`](SerialError::UnknownType) if `tag` is not registered.
    /// - [`TypeMismatch`](SerialError::TypeMismatch) if it is not registered
    ///   for `B`.
    pub fn create<B: ?Sized + 'static>(&self, tag: &str) -> Result<Rc<RefCell<B>>> {
        let entry = self.entries.get(tag).ok_or_else(|| SerialError::UnknownType {
            tag: tag.into(),
            token: None,
        })?;
        let constructor = entry
            .constructors
            .get(&TypeId::of::<B>())
            .and_then(|boxed| boxed.downcast_ref::<Constructor<B>>())
            .ok_or_else(|| SerialError::TypeMismatch {
                tag: tag.into(),
                base: type_name::<B>(),
            })?;
        Ok(constructor())
    }

    /// Whether `tag` can be created through base `B`.
    pub fn contains<B: ?Sized + 'static>(&self, tag: &str) -> bool {
        self.entries
            .get(tag)
            .is_some_and(|entry| entry.constructors.contains(&TypeId::of::<B>()))
    }

    /// The tag `T` is registered under.
    #[inline]
    pub fn tag_of<T: ?Sized + 'static>(&self) -> Option<&'static str> {
        self.tags.get(&TypeId::of::<T>()).copied()
    }

    /// Number of registered tags.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(tag, concrete type name)` pairs, in no particular order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().map(|(tag, entry)| (*tag, entry.type_name))
    }

    /// Names of the bases `tag` is registered for.
    pub fn bases_of(&self, tag: &str) -> &[&'static str] {
        self.entries
            .get(tag)
            .map(|entry| entry.bases.as_slice())
            .unwrap_or_default()
    }

    /// Applies every [`register_type!`](crate::register_type) in the binary.
    ///
    /// Returns `false` if static registration is unavailable: the
    /// `auto_register` feature is disabled, or the platform does not support
    /// the [`inventory`] crate. Repeated calls do nothing and return the
    /// first result.
    ///
    /// # Examples
    ///
    /// ```
    /// use ogre_serial::{Persist, Polymorphic, TypeRegistry, polymorphic_base, register_type};
    ///
    /// pub trait Animal: Polymorphic {}
    /// polymorphic_base!(dyn Animal);
    ///
    /// #[derive(Persist, Default)]
    /// #[persist(tag = "Cat")]
    /// struct Cat {
    ///     lives: u8,
    /// }
    /// impl Animal for Cat {}
    ///
    /// register_type!(dyn Animal => Cat, "Cat");
    ///
    /// let mut registry = TypeRegistry::new();
    /// if registry.auto_register() {
    ///     assert!(registry.contains::<dyn Animal>("Cat"));
    /// }
    /// ```
    ///
    /// [`inventory`]: https://docs.rs/inventory
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            if !self.auto_registered {
                self.auto_registered = super::auto_register::register_all(self);
            }
            self.auto_registered
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Publishes `self` as the process-wide registry.
    ///
    /// Fails, handing `self` back, if a registry is already installed,
    /// including the one [`global`](Self::global) installs lazily.
    pub fn install(self) -> Result<&'static Self, Self> {
        let mut fresh = Some(self);
        let installed = GLOBAL.get_or_init(|| fresh.take().unwrap_or_default());
        match fresh {
            Some(rejected) => Err(rejected),
            None => {
                log::debug!("installed type registry with {} tags", installed.len());
                Ok(installed)
            }
        }
    }

    /// The process-wide registry.
    ///
    /// If none was installed, installs one filled by
    /// [`auto_register`](Self::auto_register).
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| {
            let mut registry = Self::new();
            registry.auto_register();
            log::debug!(
                "installed default type registry with {} tags",
                registry.len()
            );
            registry
        })
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(tag, entry)| (tag, entry.type_name)))
            .finish()
    }
}
