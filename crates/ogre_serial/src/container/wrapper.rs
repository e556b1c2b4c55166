use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::persist::Persist;
use crate::serializer::Serializer;

use super::load_element;

// -----------------------------------------------------------------------------
// Option

impl<T: Persist + Default> Persist for Option<T> {
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.write_primitive(self.is_some())?;
        match self {
            Some(value) => value.save(s),
            None => Ok(()),
        }
    }

    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        if s.read_primitive::<bool>()? {
            *self = Some(load_element(s)?);
            Ok(())
        } else {
            *self = None;
            Ok(())
        }
    }
}

// -----------------------------------------------------------------------------
// Box

impl<T: Persist + ?Sized> Persist for Box<T> {
    #[inline]
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        (**self).save(s)
    }

    #[inline]
    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        (**self).load(s)
    }
}

// -----------------------------------------------------------------------------
// Unit

impl Persist for () {
    #[inline]
    fn save(&self, _: &mut Serializer<'_>) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn load(&mut self, _: &mut Serializer<'_>) -> Result<()> {
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ByteBuf

/// Bytes saved as one raw buffer rather than a sequence of `u8`.
///
/// Text streams write it as a single hex token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ByteBuf(pub Vec<u8>);

impl Deref for ByteBuf {
    type Target = Vec<u8>;

    #[inline]
    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl DerefMut for ByteBuf {
    #[inline]
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.0
    }
}

impl From<Vec<u8>> for ByteBuf {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Persist for ByteBuf {
    #[inline]
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.write_bytes(&self.0)
    }

    #[inline]
    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        self.0 = s.read_bytes()?;
        Ok(())
    }
}
