//! serde support. A `Set` is a sequence and a `Map` a map; neither has a stable order.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::builder::{MapBuilder, SetBuilder};
use crate::map::Map;
use crate::set::Set;
use crate::trie_key::TrieKey;

impl<K> Serialize for Set<K>
where
    K: TrieKey + Clone + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<K, V> Serialize for Map<K, V>
where
    K: TrieKey + Clone + Serialize,
    V: Clone + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

struct SetVisitor<K> {
    marker: PhantomData<K>,
}

impl<'de, K> Visitor<'de> for SetVisitor<K>
where
    K: TrieKey + Clone + Deserialize<'de>,
{
    type Value = Set<K>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence of set members")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut builder = SetBuilder::new();
        while let Some(key) = seq.next_element()? {
            builder.add(key);
        }
        Ok(builder.finish())
    }
}

impl<'de, K> Deserialize<'de> for Set<K>
where
    K: TrieKey + Clone + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(SetVisitor {
            marker: PhantomData,
        })
    }
}

struct MapVisitor<K, V> {
    marker: PhantomData<(K, V)>,
}

impl<'de, K, V> Visitor<'de> for MapVisitor<K, V>
where
    K: TrieKey + Clone + Deserialize<'de>,
    V: Clone + Deserialize<'de>,
{
    type Value = Map<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut builder = MapBuilder::new();
        while let Some((key, value)) = access.next_entry()? {
            builder.add(key, value);
        }
        Ok(builder.finish())
    }
}

impl<'de, K, V> Deserialize<'de> for Map<K, V>
where
    K: TrieKey + Clone + Deserialize<'de>,
    V: Clone + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MapVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_serializes_as_sequence() {
        let json = serde_json::to_string(&Set::from_range(0, 10, 3)).unwrap();
        let mut members: Vec<i64> = serde_json::from_str(&json).unwrap();
        members.sort();
        assert_eq!(members, vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_empty_collections() {
        assert_eq!(serde_json::to_string(&Set::<u32>::new()).unwrap(), "[]");
        assert_eq!(serde_json::to_string(&Map::<String, u32>::new()).unwrap(), "{}");

        let set: Set<u32> = serde_json::from_str("[]").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_deserializes_with_duplicates() {
        let set: Set<String> = serde_json::from_str(r#"["a", "b", "a", "c"]"#).unwrap();
        assert_eq!(set.count(), 3);
        assert!(set.has(&String::from("a")));
    }

    #[test]
    fn test_map_round_trips_through_json() {
        let map: Map<String, Vec<u8>> = (0..200u8)
            .map(|i| (format!("key{i}"), vec![i; (i % 4) as usize]))
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        let back: Map<String, Vec<u8>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_map_deserializes_last_value() {
        let map: Map<String, i32> = serde_json::from_str(r#"{"k": 1, "j": 2, "k": 3}"#).unwrap();
        assert_eq!(map.count(), 2);
        assert_eq!(map.get(&String::from("k")), Some(&3));
    }

    #[test]
    fn test_set_rejects_wrong_shape() {
        assert!(serde_json::from_str::<Set<u32>>(r#"{"a": 1}"#).is_err());
        assert!(serde_json::from_str::<Set<u8>>("[1, 300]").is_err());
    }
}
