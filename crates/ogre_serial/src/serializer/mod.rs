//! The serializer façade.
//!
//! A [`Serializer`] owns a [`Medium`], a [`SerializerConfig`] and the two
//! identity tables of its session. Values are written with
//! [`save`](Serializer::save) and read back, in the same order, with
//! [`load`](Serializer::load).
//!
//! ## Dispatch
//!
//! Every value is dispatched through its [`Persist`] impl:
//!
//! 1. A null pointer becomes a `Null` record.
//! 2. A pointer to an object already seen in this session becomes a
//!    `Reference` record naming its token.
//! 3. Primitives go through the primitive codec.
//! 4. Containers write their length and recurse into their elements.
//! 5. Anything else is a user type whose impl saves its members, usually by
//!    calling back into [`save`](Serializer::save).
//!
//! ## Identity sessions
//!
//! Identity is kept per serializer, across calls: an object saved by one
//! `save` call is written as a reference by every later call, until
//! [`reset_identity`](Serializer::reset_identity). Loading mirrors this, so
//! the loader must reset at the same point of the stream as the saver.
//!
//! ## Trace tags
//!
//! Unless the trace mode is [`TraceMode::NoTrace`], `save` writes the
//! member tag before each value and `load` checks it, failing with
//! [`TagMismatch`](SerialError::TagMismatch) at the first drift.

// -----------------------------------------------------------------------------
// Modules

mod builder;

// -----------------------------------------------------------------------------
// Exports

pub use builder::SerializerBuilder;

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::type_name;
use core::fmt;
use std::path::Path;

use crate::codec::{self, Primitive};
use crate::config::{SerializerConfig, TraceMode};
use crate::error::{Result, SerialError};
use crate::identity::{LoadTable, RecordKind, SaveTable, Token};
use crate::medium::{FileMedium, Medium, MemoryMedium};
use crate::persist::Persist;
use crate::pointer::{Pointee, Shared};
use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// Serializer

/// Saves and loads object graphs to and from a [`Medium`].
///
/// `'r` is the lifetime of the [`TypeRegistry`] used for polymorphic
/// pointers; it is `'static` unless a local registry was given to the
/// [builder](Serializer::builder).
///
/// A serializer holds shared handles to every object of its identity
/// session and is therefore neither `Send` nor `Sync`.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use ogre_serial::Serializer;
///
/// let mut s = Serializer::new();
/// let table = BTreeMap::from([(1_u8, "one".to_string()), (2, "two".to_string())]);
/// s.save("table", &table).unwrap();
///
/// let bytes = s.into_buffer().unwrap();
///
/// let mut s = Serializer::from_bytes(bytes);
/// let mut back: BTreeMap<u8, String> = BTreeMap::new();
/// s.load("table", &mut back).unwrap();
/// assert_eq!(table, back);
/// ```
pub struct Serializer<'r> {
    medium: Box<dyn Medium>,
    config: SerializerConfig,
    registry: &'r TypeRegistry,
    saved: SaveTable,
    loaded: LoadTable,
}

impl Serializer<'static> {
    /// A serializer on an empty in-memory medium, with the default
    /// configuration and the process-wide registry.
    #[inline]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// A serializer reading from `bytes`, with the default configuration.
    #[inline]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::builder()
            .medium(MemoryMedium::from_bytes(bytes.into()))
            .build()
    }

    /// A serializer writing to a new file at `path`.
    pub fn create_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::builder().medium(FileMedium::create(path)?).build())
    }

    /// A serializer reading from the file at `path`.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::builder().medium(FileMedium::open(path)?).build())
    }

    #[inline]
    pub const fn builder() -> SerializerBuilder<'static> {
        SerializerBuilder::new()
    }
}

impl<'r> Serializer<'r> {
    pub(crate) fn from_parts(
        medium: Box<dyn Medium>,
        config: SerializerConfig,
        registry: &'r TypeRegistry,
    ) -> Self {
        log::debug!(
            "new serializer: {:?} format, {:?}, {} registered types",
            config.format,
            config.trace,
            registry.len()
        );
        Self {
            medium,
            config,
            registry,
            saved: SaveTable::new(),
            loaded: LoadTable::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Entry points

    /// Saves `value` under the member tag `tag`.
    ///
    /// The tag is only written to traced streams.
    pub fn save<T: Persist + ?Sized>(&mut self, tag: &str, value: &T) -> Result<()> {
        self.write_tag(tag)?;
        value.save(self)
    }

    /// Loads the next value into `value`, checking the member tag `tag` on
    /// traced streams.
    ///
    /// On error `value` may be partially overwritten.
    pub fn load<T: Persist + ?Sized>(&mut self, tag: &str, value: &mut T) -> Result<()> {
        self.check_tag(tag)?;
        value.load(self)
    }

    fn write_tag(&mut self, tag: &str) -> Result<()> {
        let trace = self.config.trace;
        if !trace.writes_tags() {
            return Ok(());
        }
        if trace.logs() {
            log::trace!("save `{tag}` at byte {}", self.medium.write_position());
        }
        self.write_str(tag)
    }

    fn check_tag(&mut self, tag: &str) -> Result<()> {
        let trace = self.config.trace;
        if !trace.writes_tags() {
            return Ok(());
        }
        let position = self.read_position();
        let found = self.read_string()?;
        if found != tag {
            return Err(SerialError::TagMismatch {
                expected: tag.into(),
                found,
                position,
            });
        }
        if trace.logs() {
            log::trace!("load `{tag}` at byte {position}");
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Pointers

    /// Writes a pointer record for `pointer`.
    ///
    /// The first sighting of an object writes its token, its type tag if
    /// `P` is polymorphic, and its body. Later sightings write only the
    /// token.
    ///
    /// # Errors
    ///
    /// - [`BorrowConflict`](SerialError::BorrowConflict) if the object is
    ///   mutably borrowed.
    /// - [`PointerMismatch`](SerialError::PointerMismatch) if the object was
    ///   already saved through another pointer type, which could not be
    ///   loaded back.
    /// - [`UnknownType`](SerialError::UnknownType) or
    ///   [`TypeMismatch`](SerialError::TypeMismatch) if the concrete type
    ///   cannot be created through `P` on load.
    pub fn save_pointer<P: Pointee + ?Sized>(&mut self, pointer: Option<&Shared<P>>) -> Result<()> {
        let Some(rc) = pointer else {
            return self.write_kind(RecordKind::Null);
        };

        let address = Rc::as_ptr(rc).cast::<()>() as usize;
        let (token, is_new) = self.saved.register_or_get_token(address, rc)?;
        if !is_new {
            self.write_kind(RecordKind::Reference)?;
            return self.write_token(token);
        }

        let object = rc
            .try_borrow()
            .map_err(|_| SerialError::BorrowConflict { token })?;
        match object.registered_tag() {
            Some(tag) => {
                self.check_registered::<P>(tag, token)?;
                self.write_kind(RecordKind::TaggedObject)?;
                self.write_token(token)?;
                self.write_str(tag)?;
            }
            None => {
                self.write_kind(RecordKind::Object)?;
                self.write_token(token)?;
            }
        }
        object.save(self)
    }

    // A stream naming an uncreatable type must never be produced.
    fn check_registered<P: ?Sized + 'static>(&self, tag: &str, token: Token) -> Result<()> {
        if self.registry.contains::<P>(tag) {
            Ok(())
        } else if self.registry.bases_of(tag).is_empty() {
            Err(SerialError::UnknownType {
                tag: tag.into(),
                token: Some(token),
            })
        } else {
            Err(SerialError::TypeMismatch {
                tag: tag.into(),
                base: type_name::<P>(),
            })
        }
    }

    /// Reads a pointer record, `None` for a null record.
    ///
    /// A new object is registered before its body is loaded, so references
    /// to it from inside the body, cycles included, resolve to the object
    /// being built.
    ///
    /// # Errors
    ///
    /// - [`CorruptData`](SerialError::CorruptData) on an invalid record, or
    ///   a record whose kind does not match `P`.
    /// - [`UnresolvedReference`](SerialError::UnresolvedReference) for a
    ///   reference to an undefined token.
    /// - [`PointerMismatch`](SerialError::PointerMismatch) if the object was
    ///   defined through another pointer type.
    /// - [`UnknownType`](SerialError::UnknownType) or
    ///   [`TypeMismatch`](SerialError::TypeMismatch) if the recorded tag
    ///   cannot be created through `P`.
    pub fn load_pointer<P: Pointee + ?Sized>(&mut self) -> Result<Option<Shared<P>>> {
        let position = self.read_position();
        let byte: u8 = self.read_primitive()?;
        let kind = RecordKind::from_u8(byte)
            .ok_or_else(|| SerialError::corrupt(position, format!("invalid record kind {byte}")))?;

        match kind {
            RecordKind::Null => Ok(None),
            RecordKind::Reference => {
                let token = self.read_token()?;
                self.loaded.resolve::<Shared<P>>(token).map(Some)
            }
            RecordKind::Object | RecordKind::TaggedObject => {
                let tagged = kind == RecordKind::TaggedObject;
                if tagged != P::POLYMORPHIC {
                    let expected = if P::POLYMORPHIC { "tagged" } else { "untagged" };
                    return Err(SerialError::corrupt(
                        position,
                        format!("`{}` needs a {expected} object record", type_name::<P>()),
                    ));
                }

                let token_position = self.read_position();
                let token = self.read_token()?;
                let tag = if tagged {
                    Some(self.read_string()?)
                } else {
                    None
                };

                let instance = P::instantiate(tag.as_deref(), self.registry)
                    .map_err(|err| err.with_token(token))?;
                self.loaded
                    .reserve(token, Box::new(Rc::clone(&instance)), token_position)?;
                {
                    let mut body = instance
                        .try_borrow_mut()
                        .map_err(|_| SerialError::BorrowConflict { token })?;
                    body.load(self)?;
                }
                Ok(Some(instance))
            }
        }
    }

    #[inline]
    fn write_kind(&mut self, kind: RecordKind) -> Result<()> {
        self.write_primitive(kind as u8)
    }

    #[inline]
    fn write_token(&mut self, token: Token) -> Result<()> {
        self.write_primitive(token.index())
    }

    #[inline]
    fn read_token(&mut self) -> Result<Token> {
        self.read_primitive::<u32>().map(Token::new)
    }

    // -------------------------------------------------------------------------
    // Primitive access

    #[inline]
    pub fn write_primitive<P: Primitive>(&mut self, value: P) -> Result<()> {
        value.encode(self.config.format, &mut *self.medium)
    }

    #[inline]
    pub fn read_primitive<P: Primitive>(&mut self) -> Result<P> {
        P::decode(self.config.format, &mut *self.medium)
    }

    #[inline]
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        codec::write_str(self.config.format, &mut *self.medium, value)
    }

    #[inline]
    pub fn read_string(&mut self) -> Result<String> {
        codec::read_string(self.config.format, &mut *self.medium)
    }

    /// Writes a raw buffer. Text streams store it as hex.
    #[inline]
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<()> {
        codec::write_bytes(self.config.format, &mut *self.medium, value)
    }

    #[inline]
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        codec::read_bytes(self.config.format, &mut *self.medium)
    }

    /// Writes a container length. Lengths are never traced.
    #[inline]
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        codec::write_len(self.config.format, &mut *self.medium, len)
    }

    #[inline]
    pub fn read_len(&mut self) -> Result<usize> {
        codec::read_len(self.config.format, &mut *self.medium)
    }

    /// How many of `len` elements it is safe to reserve room for.
    ///
    /// Every element takes at least one byte, so a header claiming more
    /// elements than bytes left is truncated here and fails later on.
    pub(crate) fn capacity_hint(&self, len: usize) -> usize {
        match self.medium.remaining() {
            Some(left) => len.min(usize::try_from(left).unwrap_or(usize::MAX)),
            None => len,
        }
    }

    // -------------------------------------------------------------------------
    // Session and medium

    #[inline]
    pub fn config(&self) -> SerializerConfig {
        self.config
    }

    #[inline]
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// The trace mode in effect.
    #[inline]
    pub fn trace(&self) -> TraceMode {
        self.config.trace
    }

    /// Starts a new identity session.
    ///
    /// Objects saved or loaded before are forgotten, and the handles the
    /// session kept to them are released.
    pub fn reset_identity(&mut self) {
        log::debug!(
            "identity reset after {} saved and {} loaded objects",
            self.saved.len(),
            self.loaded.len()
        );
        self.saved.clear();
        self.loaded.clear();
    }

    /// Number of distinct objects saved in this identity session.
    #[inline]
    pub fn saved_objects(&self) -> usize {
        self.saved.len()
    }

    /// Number of distinct objects loaded in this identity session.
    #[inline]
    pub fn loaded_objects(&self) -> usize {
        self.loaded.len()
    }

    #[inline]
    pub fn read_position(&self) -> u64 {
        self.medium.read_position()
    }

    #[inline]
    pub fn write_position(&self) -> u64 {
        self.medium.write_position()
    }

    /// Bytes left to load, if the medium knows.
    #[inline]
    pub fn remaining(&self) -> Option<u64> {
        self.medium.remaining()
    }

    /// The bytes written so far, for in-memory media.
    #[inline]
    pub fn buffer(&self) -> Option<&[u8]> {
        self.medium.buffer()
    }

    /// Consumes the serializer, returning the buffer of an in-memory medium.
    #[inline]
    pub fn into_buffer(self) -> Option<Vec<u8>> {
        self.medium.into_buffer()
    }

    #[inline]
    pub fn flush(&mut self) -> Result<()> {
        self.medium.flush()
    }
}

impl Default for Serializer<'static> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Serializer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("config", &self.config)
            .field("read_position", &self.read_position())
            .field("write_position", &self.write_position())
            .field("saved_objects", &self.saved.len())
            .field("loaded_objects", &self.loaded.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use std::collections::HashMap;

    use super::Serializer;
    use crate::identity::Token;
    use crate::medium::MemoryMedium;
    use crate::{
        Format, Persist, Polymorphic, Ptr, SerialError, Shared, TraceMode, TypeRegistry, WeakPtr,
        polymorphic_base,
    };

    #[derive(Persist, Default)]
    struct Node {
        value: i32,
        next: Ptr<Node>,
    }

    #[derive(Persist, Default)]
    struct Leaf {
        weight: f32,
    }

    trait Shape: Polymorphic {
        fn area(&self) -> f64;
    }

    polymorphic_base!(dyn Shape);

    #[derive(Persist, Default)]
    #[persist(tag = "Circle")]
    struct Circle {
        radius: f64,
    }

    impl Shape for Circle {
        fn area(&self) -> f64 {
            3.0 * self.radius * self.radius
        }
    }

    #[derive(Persist, Default)]
    #[persist(tag = "Square")]
    struct Square {
        side: f64,
    }

    impl Shape for Square {
        fn area(&self) -> f64 {
            self.side * self.side
        }
    }

    fn shapes() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register::<dyn Shape, Circle>("Circle", |v| v)
            .register::<dyn Shape, Square>("Square", |v| v);
        registry
    }

    fn node(value: i32) -> Ptr<Node> {
        Ptr::new(Node {
            value,
            next: Ptr::null(),
        })
    }

    #[test]
    fn primitives_round_trip_in_both_formats() {
        for format in [Format::Binary, Format::Text] {
            let registry = TypeRegistry::new();
            let mut s = Serializer::builder()
                .format(format)
                .registry(&registry)
                .build();

            s.save("a", &-7_i64).unwrap();
            s.save("b", &f64::MIN_POSITIVE).unwrap();
            s.save("c", &-0.0_f32).unwrap();
            s.save("d", &'λ').unwrap();
            s.save("e", &String::new()).unwrap();

            let mut a = 0_i64;
            let mut b = 0_f64;
            let mut c = 0_f32;
            let mut d = ' ';
            let mut e = String::from("stale");
            s.load("a", &mut a).unwrap();
            s.load("b", &mut b).unwrap();
            s.load("c", &mut c).unwrap();
            s.load("d", &mut d).unwrap();
            s.load("e", &mut e).unwrap();

            assert_eq!(a, -7);
            assert_eq!(b.to_bits(), f64::MIN_POSITIVE.to_bits());
            assert_eq!(c.to_bits(), (-0.0_f32).to_bits());
            assert_eq!(d, 'λ');
            assert_eq!(e, "");
        }
    }

    #[test]
    fn shared_object_is_loaded_once() {
        let mut s = Serializer::new();
        let shared = node(1);
        let list = vec![shared.clone(), node(2), shared];
        s.save("list", &list).unwrap();
        assert_eq!(s.saved_objects(), 2);

        let mut back: Vec<Ptr<Node>> = Vec::new();
        s.load("list", &mut back).unwrap();
        assert_eq!(back.len(), 3);
        assert!(back[0].ptr_eq(&back[2]));
        assert!(!back[0].ptr_eq(&back[1]));
        assert_eq!(back[1].borrow().unwrap().value, 2);
        assert_eq!(s.loaded_objects(), 2);
    }

    #[test]
    fn cycle_terminates_and_is_restored() {
        let a = node(1);
        let b = node(2);
        a.borrow_mut().unwrap().next = b.clone();
        b.borrow_mut().unwrap().next = a.clone();

        let mut s = Serializer::new();
        s.save("a", &a).unwrap();

        let mut back = Ptr::<Node>::null();
        s.load("a", &mut back).unwrap();
        let second = back.borrow().unwrap().next.clone();
        assert_eq!(second.borrow().unwrap().value, 2);
        assert!(second.borrow().unwrap().next.ptr_eq(&back));

        // Break both cycles so the test does not leak.
        a.borrow_mut().unwrap().next = Ptr::null();
        second.borrow_mut().unwrap().next = Ptr::null();
    }

    #[test]
    fn self_reference_resolves_to_the_object_being_loaded() {
        let a = node(5);
        a.borrow_mut().unwrap().next = a.clone();

        let mut s = Serializer::new();
        s.save("a", &a).unwrap();
        let mut back = Ptr::<Node>::null();
        s.load("a", &mut back).unwrap();
        assert!(back.borrow().unwrap().next.ptr_eq(&back));

        a.borrow_mut().unwrap().next = Ptr::null();
        back.borrow_mut().unwrap().next = Ptr::null();
    }

    #[test]
    fn polymorphic_objects_recover_their_type() {
        let registry = shapes();
        let mut s = Serializer::builder().registry(&registry).build();

        let circle: Shared<Circle> = Rc::new(RefCell::new(Circle { radius: 2.0 }));
        let square: Shared<Square> = Rc::new(RefCell::new(Square { side: 3.0 }));
        let list: Vec<Ptr<dyn Shape>> = vec![
            Ptr::from_rc(circle.clone()),
            Ptr::from_rc(square),
            Ptr::null(),
            Ptr::from_rc(circle),
        ];
        s.save("shapes", &list).unwrap();

        let mut back: Vec<Ptr<dyn Shape>> = Vec::new();
        s.load("shapes", &mut back).unwrap();
        assert_eq!(back[0].borrow().unwrap().type_tag(), "Circle");
        assert_eq!(back[0].borrow().unwrap().area(), 12.0);
        assert_eq!(back[1].borrow().unwrap().type_tag(), "Square");
        assert_eq!(back[1].borrow().unwrap().area(), 9.0);
        assert!(back[2].is_null());
        assert!(back[0].ptr_eq(&back[3]));
    }

    #[test]
    fn unregistered_tag_fails_on_load() {
        let registry = shapes();
        let mut s = Serializer::builder().registry(&registry).build();
        let shape: Ptr<dyn Shape> = Ptr::from_rc(Rc::new(RefCell::new(Circle { radius: 1.0 })));
        s.save("shape", &shape).unwrap();
        let bytes = s.into_buffer().unwrap();

        let empty = TypeRegistry::new();
        let mut s = Serializer::builder()
            .medium(MemoryMedium::from_bytes(bytes))
            .registry(&empty)
            .build();
        let mut back: Ptr<dyn Shape> = Ptr::null();
        let err = s.load("shape", &mut back).unwrap_err();
        assert!(matches!(
            err,
            SerialError::UnknownType { ref tag, token: Some(token) }
                if tag == "Circle" && token == Token::new(0)
        ));
    }

    #[test]
    fn unregistered_tag_fails_on_save() {
        let empty = TypeRegistry::new();
        let mut s = Serializer::builder().registry(&empty).build();
        let shape: Ptr<dyn Shape> = Ptr::from_rc(Rc::new(RefCell::new(Square { side: 1.0 })));
        let err = s.save("shape", &shape).unwrap_err();
        assert!(matches!(err, SerialError::UnknownType { ref tag, .. } if tag == "Square"));
    }

    #[test]
    fn map_values_are_bit_exact() {
        let map = HashMap::from([("42".to_string(), -30.556_f64), ("3".to_string(), 10.258)]);
        for format in [Format::Binary, Format::Text] {
            let mut s = Serializer::builder().format(format).build();
            s.save("map", &map).unwrap();

            let mut back: HashMap<String, f64> = HashMap::from([("stale".to_string(), 0.0)]);
            s.load("map", &mut back).unwrap();
            assert_eq!(back.len(), 2);
            assert_eq!(back["42"].to_bits(), (-30.556_f64).to_bits());
            assert_eq!(back["3"].to_bits(), 10.258_f64.to_bits());
        }
    }

    #[test]
    fn tag_drift_is_reported() {
        let mut s = Serializer::builder().trace(TraceMode::TraceError).build();
        s.save("mass", &1.5_f64).unwrap();

        let mut value = 0.0_f64;
        let err = s.load("density", &mut value).unwrap_err();
        assert!(matches!(
            err,
            SerialError::TagMismatch { ref expected, ref found, position: 0 }
                if expected == "density" && found == "mass"
        ));
    }

    #[test]
    fn untraced_streams_ignore_tags() {
        let mut s = Serializer::new();
        s.save("mass", &1.5_f64).unwrap();
        assert_eq!(s.buffer().unwrap().len(), 8);

        let mut value = 0.0_f64;
        s.load("anything", &mut value).unwrap();
        assert_eq!(value, 1.5);
    }

    #[test]
    fn truncated_stream_is_corrupt() {
        let mut s = Serializer::new();
        s.save("name", &String::from("truncated payload")).unwrap();
        let mut bytes = s.into_buffer().unwrap();
        bytes.truncate(bytes.len() - 3);

        let mut s = Serializer::from_bytes(bytes);
        let mut name = String::new();
        assert!(matches!(
            s.load("name", &mut name),
            Err(SerialError::CorruptData { position: 0, .. })
        ));
    }

    #[test]
    fn reference_to_undefined_token() {
        let mut bytes = vec![3_u8];
        bytes.extend_from_slice(&5_u32.to_le_bytes());

        let mut s = Serializer::from_bytes(bytes);
        let mut back = Ptr::<Node>::null();
        assert!(matches!(
            s.load("node", &mut back),
            Err(SerialError::UnresolvedReference { token }) if token == Token::new(5)
        ));
    }

    #[test]
    fn invalid_record_kind() {
        let mut s = Serializer::from_bytes(vec![9_u8]);
        let mut back = Ptr::<Node>::null();
        assert!(matches!(
            s.load("node", &mut back),
            Err(SerialError::CorruptData { position: 0, .. })
        ));
    }

    #[test]
    fn reference_through_another_pointer_type() {
        let mut s = Serializer::new();
        let leaf = Ptr::new(Leaf { weight: 1.0 });
        s.save("first", &leaf).unwrap();
        s.save("second", &leaf).unwrap();

        let mut first = Ptr::<Leaf>::null();
        let mut second = Ptr::<Node>::null();
        s.load("first", &mut first).unwrap();
        assert!(matches!(
            s.load("second", &mut second),
            Err(SerialError::PointerMismatch { token, .. }) if token == Token::new(0)
        ));
    }

    #[test]
    fn object_saved_through_two_pointer_types_is_rejected() {
        let registry = shapes();
        let mut s = Serializer::builder().registry(&registry).build();
        let circle: Shared<Circle> = Rc::new(RefCell::new(Circle { radius: 1.0 }));
        s.save("concrete", &circle).unwrap();

        let shape: Ptr<dyn Shape> = Ptr::from_rc(circle.clone());
        assert!(matches!(
            s.save("base", &shape),
            Err(SerialError::PointerMismatch { token, .. }) if token == Token::new(0)
        ));
        assert_eq!(s.saved_objects(), 1);

        let mut back: Shared<Circle> = Rc::default();
        s.load("concrete", &mut back).unwrap();
        assert_eq!(back.borrow().radius, 1.0);
    }

    #[test]
    fn null_into_non_null_handle_is_corrupt() {
        let mut s = Serializer::new();
        s.save("node", &Ptr::<Node>::null()).unwrap();

        let mut back: Shared<Node> = Rc::default();
        assert!(matches!(
            s.load("node", &mut back),
            Err(SerialError::CorruptData { .. })
        ));
    }

    #[test]
    fn identity_spans_calls_until_reset() {
        let mut s = Serializer::new();
        let shared = node(7);
        s.save("first", &shared).unwrap();
        let after_first = s.write_position();
        s.save("second", &shared).unwrap();
        // kind + token only
        assert_eq!(s.write_position() - after_first, 5);

        s.reset_identity();
        s.save("third", &shared).unwrap();
        assert_eq!(s.write_position() - after_first - 5, after_first);
        assert_eq!(s.saved_objects(), 1);

        let mut first = Ptr::<Node>::null();
        let mut second = Ptr::<Node>::null();
        let mut third = Ptr::<Node>::null();
        s.load("first", &mut first).unwrap();
        s.load("second", &mut second).unwrap();
        s.reset_identity();
        s.load("third", &mut third).unwrap();
        assert!(first.ptr_eq(&second));
        assert!(!first.ptr_eq(&third));
        assert_eq!(third.borrow().unwrap().value, 7);
    }

    #[test]
    fn dangling_weak_pointer_saves_as_null() {
        let kept = node(3);
        let dropped = node(4);
        let weak_kept = kept.downgrade();
        let weak_dropped = dropped.downgrade();
        drop(dropped);

        let mut s = Serializer::new();
        s.save("owner", &kept).unwrap();
        s.save("kept", &weak_kept).unwrap();
        s.save("dropped", &weak_dropped).unwrap();

        let mut owner = Ptr::<Node>::null();
        let mut kept_back = WeakPtr::<Node>::null();
        let mut dropped_back = WeakPtr::<Node>::null();
        s.load("owner", &mut owner).unwrap();
        s.load("kept", &mut kept_back).unwrap();
        s.load("dropped", &mut dropped_back).unwrap();

        let kept_rc = kept_back.upgrade().unwrap();
        assert!(Rc::ptr_eq(owner.as_rc().unwrap(), &kept_rc));
        assert!(dropped_back.is_dangling());
    }

    #[test]
    fn mutably_borrowed_pointee_is_a_conflict() {
        let mut s = Serializer::new();
        let target = node(1);
        let _guard = target.borrow_mut();
        assert!(matches!(
            s.save("node", &target),
            Err(SerialError::BorrowConflict { token }) if token == Token::new(0)
        ));
    }

    #[test]
    fn text_stream_with_trace_tags() {
        let registry = shapes();
        let mut s = Serializer::builder()
            .format(Format::Text)
            .trace(TraceMode::TraceAll)
            .registry(&registry)
            .build();

        let a = node(-1);
        let list = vec![a.clone(), a];
        s.save("list", &list).unwrap();
        let shape: Ptr<dyn Shape> = Ptr::from_rc(Rc::new(RefCell::new(Square { side: 0.5 })));
        s.save("shape", &shape).unwrap();

        let mut back_list: Vec<Ptr<Node>> = Vec::new();
        let mut back_shape: Ptr<dyn Shape> = Ptr::null();
        s.load("list", &mut back_list).unwrap();
        s.load("shape", &mut back_shape).unwrap();
        assert!(back_list[0].ptr_eq(&back_list[1]));
        assert_eq!(back_list[0].borrow().unwrap().value, -1);
        assert_eq!(back_shape.borrow().unwrap().area(), 0.25);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.bin");

        let mut s = Serializer::create_file(&path).unwrap();
        let a = node(11);
        s.save("pair", &(a.clone(), a)).unwrap();
        s.flush().unwrap();
        assert!(s.buffer().is_none());
        drop(s);

        let mut s = Serializer::open_file(&path).unwrap();
        let mut pair = (Ptr::<Node>::null(), Ptr::<Node>::null());
        s.load("pair", &mut pair).unwrap();
        assert!(pair.0.ptr_eq(&pair.1));
        assert_eq!(pair.0.borrow().unwrap().value, 11);
        assert_eq!(s.remaining(), Some(0));
    }
}
