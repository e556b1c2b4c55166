//! Object identity across a save or load session.
//!
//! Every object reached through a pointer gets a [`Token`] the first time
//! it is seen. Tokens are dense and handed out in first-occurrence order,
//! so the save side and the load side assign the same token to the same
//! object without the token ever depending on a memory address.
//!
//! - [`SaveTable`] maps an object address to its token.
//! - [`LoadTable`] is an arena of reconstructed instances indexed by token.
//!
//! Both tables register an object *before* its body is processed. A body
//! that points back at its own object, directly or through a cycle, then
//! resolves to the registered entry instead of recursing.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use ogre_utils::hash::HashMap;

use crate::error::{Result, SerialError};

// -----------------------------------------------------------------------------
// Token

/// Identifier of one object within an identity session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u32);

impl Token {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// RecordKind

/// Leading byte of every pointer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordKind {
    /// A null pointer. Nothing follows.
    Null = 0,
    /// First sighting of a statically typed object: token, then body.
    Object = 1,
    /// First sighting of a polymorphic object: token, type tag, then body.
    TaggedObject = 2,
    /// A later sighting: token only.
    Reference = 3,
}

impl RecordKind {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Null),
            1 => Some(Self::Object),
            2 => Some(Self::TaggedObject),
            3 => Some(Self::Reference),
            _ => None,
        }
    }
}

// The token of the `index`-th object, `None` once tokens are exhausted.
#[inline]
fn token_at(index: usize) -> Option<Token> {
    u32::try_from(index).ok().map(Token)
}

// -----------------------------------------------------------------------------
// SaveTable

struct SaveEntry {
    token: Token,
    // Pointer type the object was first saved through.
    pointer: TypeId,
}

/// Save-side identity table.
///
/// Besides the token, every entry owns a `pin`: a strong handle to the
/// object. While the session lasts no registered object can be freed, so
/// its address cannot be recycled by an unrelated object saved later.
#[derive(Default)]
pub struct SaveTable {
    entries: HashMap<usize, SaveEntry>,
    pins: Vec<Box<dyn Any>>,
}

impl SaveTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the token of `address`, assigning the next one if the address
    /// is new. The boolean is `true` for a new assignment, in which case a
    /// clone of `handle` is kept as pin.
    ///
    /// `H` is the pointer type of the save site. An object is only ever
    /// loaded back through one pointer type, so a later sighting through
    /// another `H` fails here.
    ///
    /// # Errors
    ///
    /// - [`PointerMismatch`](SerialError::PointerMismatch) if `address` was
    ///   registered through another pointer type.
    /// - [`TooManyObjects`](SerialError::TooManyObjects) if every token of
    ///   the session is taken.
    pub fn register_or_get_token<H: Clone + 'static>(
        &mut self,
        address: usize,
        handle: &H,
    ) -> Result<(Token, bool)> {
        if let Some(entry) = self.entries.get(&address) {
            if entry.pointer != TypeId::of::<H>() {
                return Err(SerialError::PointerMismatch {
                    token: entry.token,
                    expected: type_name::<H>(),
                });
            }
            return Ok((entry.token, false));
        }
        let token = token_at(self.pins.len()).ok_or(SerialError::TooManyObjects)?;
        self.entries.insert(
            address,
            SaveEntry {
                token,
                pointer: TypeId::of::<H>(),
            },
        );
        self.pins.push(Box::new(handle.clone()));
        Ok((token, true))
    }

    /// Number of distinct objects registered.
    #[inline]
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Forgets every object and releases the pins.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.pins.clear();
    }
}

impl fmt::Debug for SaveTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveTable").field("len", &self.len()).finish()
    }
}

// -----------------------------------------------------------------------------
// LoadTable

/// Load-side identity arena.
///
/// Slot `n` holds the handle of the object defined with token `n`, stored
/// as `Box<dyn Any>` so objects of any pointer type share one arena.
#[derive(Default)]
pub struct LoadTable {
    slots: Vec<Box<dyn Any>>,
}

impl LoadTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The token the next defined object must carry, `None` once tokens
    /// are exhausted.
    #[inline]
    pub fn next_token(&self) -> Option<Token> {
        token_at(self.slots.len())
    }

    /// Registers the handle of a newly defined object.
    ///
    /// `position` is only used for the error: a token other than
    /// [`next_token`](Self::next_token) cannot come from a conforming writer.
    pub fn reserve(&mut self, token: Token, handle: Box<dyn Any>, position: u64) -> Result<()> {
        match self.next_token() {
            Some(expected) if expected == token => {
                self.slots.push(handle);
                Ok(())
            }
            Some(expected) => Err(SerialError::corrupt(
                position,
                format!("object defined with token {token}, expected {expected}"),
            )),
            None => Err(SerialError::corrupt(
                position,
                format!("object defined with token {token} after the last token"),
            )),
        }
    }

    /// Returns a clone of the handle registered under `token`.
    ///
    /// `H` is the pointer type of the reference site. It must be the type
    /// the object was registered with.
    pub fn resolve<H: Clone + 'static>(&self, token: Token) -> Result<H> {
        let slot = self
            .slots
            .get(token.0 as usize)
            .ok_or(SerialError::UnresolvedReference { token })?;
        slot.downcast_ref::<H>()
            .cloned()
            .ok_or(SerialError::PointerMismatch {
                token,
                expected: type_name::<H>(),
            })
    }

    /// Number of objects defined.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Forgets every object and drops the arena's handles.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl fmt::Debug for LoadTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadTable").field("len", &self.len()).finish()
    }
}
