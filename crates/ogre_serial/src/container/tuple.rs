use crate::error::Result;
use crate::persist::Persist;
use crate::serializer::Serializer;

// Members in order, no header.
macro_rules! impl_persist_tuple {
    ($($name:ident : $index:tt),+) => {
        impl<$($name: Persist),+> Persist for ($($name,)+) {
            #[inline]
            fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
                $(self.$index.save(s)?;)+
                Ok(())
            }

            #[inline]
            fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
                $(self.$index.load(s)?;)+
                Ok(())
            }
        }
    };
}

impl_persist_tuple!(A: 0);
impl_persist_tuple!(A: 0, B: 1);
impl_persist_tuple!(A: 0, B: 1, C: 2);
impl_persist_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_persist_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_persist_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
