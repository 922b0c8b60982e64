//! Property tests against reference containers from std.

use std::collections::BTreeMap;

use proptest::prelude::*;

use coalmap::{CoalescedMap, InsertionMode, MapBuilder};

const CAPACITY: usize = 128;

fn mode_from(idx: usize) -> InsertionMode {
    [
        InsertionMode::Lich,
        InsertionMode::Eich,
        InsertionMode::Vich,
    ][idx % 3]
}

proptest! {
    /// Insert results, lookups, and traversal all agree with a reference
    /// first-wins map.
    #[test]
    fn matches_reference_model(
        entries in prop::collection::vec((0u64..400, 0u32..1000), 0..100),
        mode_idx in 0usize..3,
    ) {
        let mut map: CoalescedMap<u64, u32> = MapBuilder::new(CAPACITY)
            .insertion_mode(mode_from(mode_idx))
            .build()
            .unwrap();
        let mut reference: BTreeMap<u64, u32> = BTreeMap::new();

        for (key, value) in entries {
            // fewer distinct keys than capacity: insertion cannot fail
            let (cursor, inserted) = map.try_insert(key, value).unwrap();
            prop_assert_eq!(inserted, !reference.contains_key(&key));
            reference.entry(key).or_insert(value);
            prop_assert_eq!(cursor.value(), reference.get(&key));
        }

        prop_assert_eq!(map.len(), reference.len());
        for (key, value) in &reference {
            prop_assert_eq!(map.get(key), Some(value));
            prop_assert!(!map.find(key).is_end());
        }
        for key in 400u64..420 {
            prop_assert!(map.find(&key).is_end());
            prop_assert_eq!(map.get(&key), None);
        }

        // traversal visits exactly the stored entries, each once
        let mut seen: BTreeMap<u64, u32> = BTreeMap::new();
        for (key, value) in map.iter() {
            prop_assert!(seen.insert(*key, *value).is_none(), "repeat of {}", key);
        }
        prop_assert_eq!(seen, reference);
    }

    /// Walking back to front is the mirror of front to back.
    #[test]
    fn reverse_iteration_agrees(
        keys in prop::collection::vec(0u64..300, 0..80),
        mode_idx in 0usize..3,
    ) {
        let mut map: CoalescedMap<u64, u64> = MapBuilder::new(CAPACITY)
            .insertion_mode(mode_from(mode_idx))
            .build()
            .unwrap();
        for key in keys {
            map.try_insert(key, key).unwrap();
        }

        let forward: Vec<u64> = map.keys().copied().collect();
        let mut backward: Vec<u64> = map.keys().rev().copied().collect();
        backward.reverse();
        prop_assert_eq!(forward, backward);
    }

    /// An overloaded table never exceeds capacity, never loses a stored
    /// entry, and keeps answering lookups after rejected inserts.
    #[test]
    fn capacity_bound_holds_under_pressure(
        keys in prop::collection::vec(0u64..64, 0..200),
    ) {
        let mut map: CoalescedMap<u64, u64> = CoalescedMap::with_capacity(16);
        for key in keys {
            let _ = map.try_insert(key, key);
            prop_assert!(map.len() <= map.capacity());
        }

        let stored: Vec<u64> = map.keys().copied().collect();
        prop_assert_eq!(stored.len(), map.len());
        for key in stored {
            prop_assert_eq!(map.get(&key), Some(&key));
        }
    }

    /// Values stay reachable and editable through iter_mut.
    #[test]
    fn iter_mut_touches_every_entry(
        keys in prop::collection::vec(0u64..200, 0..60),
    ) {
        let mut map: CoalescedMap<u64, u64> = CoalescedMap::with_capacity(CAPACITY);
        for key in &keys {
            map.try_insert(*key, 0).unwrap();
        }

        for (_, value) in map.iter_mut() {
            *value += 1;
        }

        for (_, value) in map.iter() {
            prop_assert_eq!(*value, 1);
        }
    }
}
