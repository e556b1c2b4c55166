use alloc::collections::{BTreeMap, BTreeSet};
use core::hash::{BuildHasher, Hash};

use ogre_utils::hash::hashbrown;

use crate::error::Result;
use crate::persist::Persist;
use crate::serializer::Serializer;

use super::load_element;

// -----------------------------------------------------------------------------
// Mappings: length, then interleaved keys and values

impl<K, V> Persist for BTreeMap<K, V>
where
    K: Persist + Default + Ord,
    V: Persist + Default,
{
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.write_len(self.len())?;
        for (key, value) in self {
            key.save(s)?;
            value.save(s)?;
        }
        Ok(())
    }

    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        let len = s.read_len()?;
        self.clear();
        for _ in 0..len {
            let key: K = load_element(s)?;
            let value: V = load_element(s)?;
            self.insert(key, value);
        }
        Ok(())
    }
}

macro_rules! impl_persist_hash_map {
    ($($map:ident)::+) => {
        impl<K, V, S> Persist for $($map)::+<K, V, S>
        where
            K: Persist + Default + Eq + Hash,
            V: Persist + Default,
            S: BuildHasher + Default,
        {
            fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
                s.write_len(self.len())?;
                for (key, value) in self {
                    key.save(s)?;
                    value.save(s)?;
                }
                Ok(())
            }

            fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
                let len = s.read_len()?;
                self.clear();
                self.reserve(s.capacity_hint(len));
                for _ in 0..len {
                    let key: K = load_element(s)?;
                    let value: V = load_element(s)?;
                    self.insert(key, value);
                }
                Ok(())
            }
        }
    };
}

impl_persist_hash_map!(std::collections::HashMap);
impl_persist_hash_map!(hashbrown::HashMap);

// -----------------------------------------------------------------------------
// Sets: length, then elements

impl<T: Persist + Default + Ord> Persist for BTreeSet<T> {
    fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
        s.write_len(self.len())?;
        self.iter().try_for_each(|element| element.save(s))
    }

    fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
        let len = s.read_len()?;
        self.clear();
        for _ in 0..len {
            self.insert(load_element(s)?);
        }
        Ok(())
    }
}

macro_rules! impl_persist_hash_set {
    ($($set:ident)::+) => {
        impl<T, S> Persist for $($set)::+<T, S>
        where
            T: Persist + Default + Eq + Hash,
            S: BuildHasher + Default,
        {
            fn save(&self, s: &mut Serializer<'_>) -> Result<()> {
                s.write_len(self.len())?;
                self.iter().try_for_each(|element| element.save(s))
            }

            fn load(&mut self, s: &mut Serializer<'_>) -> Result<()> {
                let len = s.read_len()?;
                self.clear();
                self.reserve(s.capacity_hint(len));
                for _ in 0..len {
                    self.insert(load_element(s)?);
                }
                Ok(())
            }
        }
    };
}

impl_persist_hash_set!(std::collections::HashSet);
impl_persist_hash_set!(hashbrown::HashSet);

#[cfg(test)]
mod tests {
    use alloc::collections::{BTreeMap, BTreeSet};
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use std::collections::HashSet;

    use ogre_utils::hash::HashMap;

    use crate::{Format, Serializer};

    #[test]
    fn maps_replace_previous_content() {
        let sizes: [BTreeMap<i16, String>; 3] = [
            BTreeMap::new(),
            BTreeMap::from([(5, String::from("five"))]),
            BTreeMap::from([(3, String::from("three")), (-1, String::new()), (8, "8".into())]),
        ];
        for map in &sizes {
            for format in [Format::Binary, Format::Text] {
                let mut s = Serializer::builder().format(format).build();
                s.save("map", map).unwrap();
                s.save("map", map).unwrap();

                let mut stale = BTreeMap::from([(9_i16, String::from("stale")), (10, "x".into())]);
                let mut empty: BTreeMap<i16, String> = BTreeMap::new();
                s.load("map", &mut stale).unwrap();
                s.load("map", &mut empty).unwrap();
                assert_eq!(&stale, map, "{format:?}");
                assert_eq!(&empty, map, "{format:?}");
            }
        }
    }

    #[test]
    fn hash_maps_of_any_size() {
        for len in [0_u32, 1, 12] {
            let map: HashMap<u32, i64> = (0..len).map(|k| (k, -i64::from(k))).collect();
            for format in [Format::Binary, Format::Text] {
                let mut s = Serializer::builder().format(format).build();
                s.save("map", &map).unwrap();

                let mut back: HashMap<u32, i64> = HashMap::default();
                back.insert(99, 1);
                s.load("map", &mut back).unwrap();
                assert_eq!(back, map, "{len} {format:?}");
            }
        }
    }

    #[test]
    fn hashbrown_map_of_vectors() {
        let mut map: HashMap<u32, Vec<f32>> = HashMap::default();
        map.insert(1, vec![0.5, -2.0]);
        map.insert(2, Vec::new());

        let mut s = Serializer::builder().format(Format::Text).build();
        s.save("map", &map).unwrap();
        let mut back: HashMap<u32, Vec<f32>> = HashMap::default();
        s.load("map", &mut back).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn empty_map_is_a_zero_count() {
        let mut s = Serializer::new();
        s.save("map", &BTreeMap::<u8, u8>::new()).unwrap();
        assert_eq!(s.buffer().unwrap(), &[0; 8]);
    }

    #[test]
    fn sets_round_trip() {
        let ordered = BTreeSet::from(['x', 'y']);
        let hashed: HashSet<String> = ["a", "b", "c"].iter().map(ToString::to_string).collect();

        let mut s = Serializer::new();
        s.save("ordered", &ordered).unwrap();
        s.save("hashed", &hashed).unwrap();

        let mut ordered_back: BTreeSet<char> = BTreeSet::new();
        let mut hashed_back: HashSet<String> = HashSet::new();
        s.load("ordered", &mut ordered_back).unwrap();
        s.load("hashed", &mut hashed_back).unwrap();
        assert_eq!(ordered_back, ordered);
        assert_eq!(hashed_back, hashed);
    }
}
