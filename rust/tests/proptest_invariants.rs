use std::collections::BTreeMap;

use bplus_index::{BPlusTree, ByteTree};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_chain_sorted_and_complete(
        degree in 2usize..12,
        entries in prop::collection::vec((-500i32..500, any::<u16>()), 0..600),
    ) {
        let mut tree = BPlusTree::new(entries.len().max(1), degree).unwrap();
        let mut reference = BTreeMap::new();
        for (key, value) in &entries {
            tree.insert(*key, *value);
            reference.insert(*key, *value);
        }

        prop_assert!(tree.check_invariants().is_ok());
        let forwards: Vec<i32> = tree.keys().copied().collect();
        let expected: Vec<i32> = reference.keys().copied().collect();
        prop_assert_eq!(&forwards, &expected);

        let mut backwards: Vec<i32> = tree.keys_right_to_left().into_iter().copied().collect();
        backwards.reverse();
        prop_assert_eq!(backwards, expected);
    }

    #[test]
    fn prop_round_trip_returns_latest_value(
        degree in 2usize..9,
        entries in prop::collection::vec((0u8..64, any::<i64>()), 1..300),
        probes in prop::collection::vec(0u8..128, 0..64),
    ) {
        let mut tree = BPlusTree::new(256, degree).unwrap();
        let mut latest = BTreeMap::new();
        for (key, value) in &entries {
            tree.insert(*key, *value);
            latest.insert(*key, *value);
        }

        for (key, value) in &latest {
            prop_assert_eq!(tree.contains(key), (true, Some(value)));
        }
        for probe in &probes {
            prop_assert_eq!(tree.contains_key(probe), latest.contains_key(probe));
        }
        prop_assert_eq!(tree.len(), latest.len());
    }

    #[test]
    fn prop_occupancy_bound_holds_after_every_insert(
        degree in 2usize..7,
        keys in prop::collection::vec(any::<i16>(), 1..200),
    ) {
        let mut tree = BPlusTree::new(keys.len(), degree).unwrap();
        for key in keys {
            tree.insert(key, ());
            prop_assert!(tree.is_valid());
        }
    }

    #[test]
    fn prop_byte_keys_match_sorted_bytes(
        keys in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..6), 0..200),
    ) {
        let mut tree = ByteTree::new_bytes(256, 4).unwrap();
        for (i, key) in keys.iter().enumerate() {
            tree.insert(key.clone(), i);
        }

        let mut expected = keys.clone();
        expected.sort();
        expected.dedup();
        let got: Vec<Vec<u8>> = tree.keys().cloned().collect();
        prop_assert_eq!(got, expected);
        prop_assert!(tree.leaf_chain_report().is_sorted());
    }
}
