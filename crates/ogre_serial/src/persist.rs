use alloc::string::String;

use crate::error::Result;
use crate::serializer::Serializer;

// -----------------------------------------------------------------------------
// Persist

/// A value that can be saved to and loaded from a [`Serializer`].
///
/// `load` writes into an existing value; containers build their elements
/// with [`Default`] and then load into them. Implementations save and load
/// their members in the same fixed order, usually through
/// [`Serializer::save`] and [`Serializer::load`] so every member gets a
/// trace tag.
///
/// The trait is object safe, so polymorphic bases can require it as a
/// supertrait:
///
/// ```
/// use ogre_serial::{Persist, Polymorphic};
///
/// pub trait Shape: Polymorphic {
///     fn area(&self) -> f64;
/// }
/// ```
///
/// Most types derive it instead of implementing it by hand:
///
/// ```
/// use ogre_serial::{Persist, Serializer};
///
/// #[derive(Persist, Default, PartialEq, Debug)]
/// struct Node {
///     id: u32,
///     name: String,
/// }
///
/// let mut s = Serializer::new();
/// let node = Node { id: 3, name: "root".into() };
/// s.save("node", &node).unwrap();
///
/// let mut back = Node::default();
/// s.load("node", &mut back).unwrap();
/// assert_eq!(node, back);
/// ```
pub trait Persist {
    /// Writes `self` to `s`.
    fn save(&self, s: &mut Serializer<'_>) -> Result<()>;

    /// Overwrites `self` with the next value read from `s`.
    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()>;
}

macro_rules! impl_persist_primitive {
    ($($ty:ty),*) => {$(
        impl Persist for $ty {
            #[inline]
            fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
                s.write_primitive(*self)
            }

            #[inline]
            fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
                *self = s.read_primitive()?;
                Ok(())
            }
        }
    )*};
}

impl_persist_primitive!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64
);

impl Persist for String {
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.write_str(self)
    }

    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        *self = s.read_string()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::{Persist, SerialError, Serializer, TraceMode};

    #[derive(Persist, Default, PartialEq, Debug)]
    enum Support {
        #[default]
        Free,
        Roller(f64),
        Pinned {
            x: f64,
            y: f64,
        },
        Spring(f64, #[persist(skip)] u8, f64),
    }

    #[derive(Persist, Default, PartialEq, Debug)]
    struct Pair<A, B>(A, B);

    #[derive(Persist, Default, PartialEq, Debug)]
    struct Labelled<T> {
        #[persist(rename = "title")]
        label: String,
        value: T,
        #[persist(skip)]
        dirty: bool,
    }

    #[derive(Persist, Default)]
    struct Marker;

    #[derive(Persist, Default)]
    struct Retitled {
        name: String,
    }

    #[test]
    fn enum_variants_round_trip() {
        let supports = vec![
            Support::Free,
            Support::Roller(0.25),
            Support::Pinned { x: 1.0, y: -2.0 },
            Support::Spring(10.0, 9, 20.0),
        ];
        let mut s = Serializer::new();
        s.save("supports", &supports).unwrap();

        let mut back: Vec<Support> = Vec::new();
        s.load("supports", &mut back).unwrap();
        assert_eq!(back[..3], supports[..3]);
        assert_eq!(back[3], Support::Spring(10.0, 0, 20.0));
    }

    #[test]
    fn variant_index_out_of_range_is_corrupt() {
        let mut s = Serializer::new();
        s.save("support", &7_u32).unwrap();

        let mut back = Support::Free;
        assert!(matches!(
            s.load("support", &mut back),
            Err(SerialError::CorruptData { position: 0, .. })
        ));
    }

    #[test]
    fn generic_and_tuple_structs() {
        let pair = Pair(3_u16, String::from("three"));
        let labelled = Labelled {
            label: String::from("loads"),
            value: Pair(1_i8, 2_i8),
            dirty: true,
        };
        let mut s = Serializer::builder().trace(TraceMode::TraceError).build();
        s.save("pair", &pair).unwrap();
        s.save("labelled", &labelled).unwrap();
        s.save("marker", &Marker).unwrap();

        let mut pair_back: Pair<u16, String> = Pair::default();
        let mut labelled_back: Labelled<Pair<i8, i8>> = Labelled::default();
        s.load("pair", &mut pair_back).unwrap();
        s.load("labelled", &mut labelled_back).unwrap();
        s.load("marker", &mut Marker).unwrap();

        assert_eq!(pair_back, pair);
        assert_eq!(labelled_back.label, "loads");
        assert_eq!(labelled_back.value, Pair(1, 2));
        assert!(!labelled_back.dirty);
        assert_eq!(s.remaining(), Some(0));
    }

    #[test]
    fn renamed_field_uses_its_trace_tag() {
        let labelled = Labelled::<u8> {
            label: String::from("x"),
            ..Labelled::default()
        };
        let mut s = Serializer::builder().trace(TraceMode::TraceError).build();
        s.save("value", &labelled).unwrap();

        let mut back = Retitled::default();
        assert!(matches!(
            s.load("value", &mut back),
            Err(SerialError::TagMismatch { expected, found, .. })
                if expected == "name" && found == "title"
        ));
    }
}
