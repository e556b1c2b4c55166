use alloc::collections::VecDeque;
use alloc::format;
use alloc::vec::Vec;

use crate::error::{Result, SerialError};
use crate::persist::Persist;
use crate::serializer::Serializer;

use super::load_element;

impl<T: Persist + Default> Persist for Vec<T> {
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.write_len(self.len())?;
        self.iter().try_for_each(|element| element.save(s))
    }

    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        let len = s.read_len()?;
        self.clear();
        self.reserve(s.capacity_hint(len));
        for _ in 0..len {
            self.push(load_element(s)?);
        }
        Ok(())
    }
}

impl<T: Persist + Default> Persist for VecDeque<T> {
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.write_len(self.len())?;
        self.iter().try_for_each(|element| element.save(s))
    }

    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        let len = s.read_len()?;
        self.clear();
        self.reserve(s.capacity_hint(len));
        for _ in 0..len {
            self.push_back(load_element(s)?);
        }
        Ok(())
    }
}

impl<T: Persist, const N: usize> Persist for [T; N] {
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.write_len(N)?;
        self.iter().try_for_each(|element| element.save(s))
    }

    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        let position = s.read_position();
        let len = s.read_len()?;
        if len != N {
            return Err(SerialError::corrupt(
                position,
                format!("array of {len} elements loaded into `[_; {N}]`"),
            ));
        }
        self.iter_mut().try_for_each(|element| element.load(s))
    }
}
