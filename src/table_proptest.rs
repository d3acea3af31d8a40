#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check
// slot-level invariants that the public API does not expose.

use crate::key::{hash_bytes, Key};
use crate::table::{Entry, HashTable};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

// The model is itself a prehashed table: hashbrown's HashTable fed with
// the same hash our keys carry.
type Model = hashbrown::HashTable<(Vec<u8>, i32)>;

// Pool-indexed operations so shrinking moves toward earlier keys, a
// smaller pool, and shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Fetch(usize),
    Get(usize),
    GetForeign(Vec<u8>),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<OpI>)> {
    // Bytes drawn from a tiny alphabet including 0 so embedded NULs and
    // shared prefixes are common.
    let bytes = proptest::collection::vec(prop_oneof![Just(0u8), Just(b'a'), Just(b'b')], 0..5);
    proptest::collection::vec(bytes.clone(), 1..=24).prop_flat_map(move |pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            idx.clone().prop_map(OpI::Fetch),
            idx.clone().prop_map(OpI::Get),
            bytes.clone().prop_map(OpI::GetForeign),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Collapsing the hash to two bits keeps it a function of the bytes while
// forcing long collision chains.
fn make_key(collide: bool, bytes: &[u8]) -> Key<'_> {
    if collide {
        Key::with_hash(hash_bytes(bytes) & 3, bytes)
    } else {
        Key::from_bytes(bytes)
    }
}

fn model_get<'m>(model: &'m Model, key: &Key<'_>) -> Option<&'m i32> {
    model
        .find(key.hash(), |(b, _)| b.as_slice() == key.as_bytes())
        .map(|(_, v)| v)
}

fn model_slot<'m>(model: &'m mut Model, key: &Key<'_>, collide: bool) -> &'m mut i32 {
    let bytes = key.as_bytes();
    let (_, v) = model
        .entry(
            key.hash(),
            |(b, _)| b.as_slice() == bytes,
            |(b, _)| make_key(collide, b).hash(),
        )
        .or_insert_with(|| (bytes.to_vec(), 0))
        .into_mut();
    v
}

fn check_structure(sut: &HashTable<'_, i32>, collide: bool) -> Result<(), TestCaseError> {
    let cap = sut.capacity();
    prop_assert!(cap.is_power_of_two());
    prop_assert!(4 * sut.len() <= 3 * cap);
    prop_assert_eq!(sut.occupied_slots(), sut.len());
    for (k, _) in sut.iter() {
        prop_assert_eq!(k.hash(), make_key(collide, k.as_bytes()).hash());
    }
    Ok(())
}

fn run_state_machine(pool: &[Vec<u8>], ops: Vec<OpI>, collide: bool) -> Result<(), TestCaseError> {
    let mut sut: HashTable<i32> = HashTable::with_capacity(0).expect("min capacity");
    let mut model = Model::new();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = make_key(collide, &pool[i]);
                *sut.put(k).expect("put") = v;
                *model_slot(&mut model, &k, collide) = v;
            }
            OpI::Fetch(i) => {
                let k = make_key(collide, &pool[i]);
                let already = model_get(&model, &k).copied();
                match sut.entry(k).expect("entry") {
                    Entry::Inserted(v) => {
                        prop_assert!(already.is_none(), "inserted an existing key");
                        prop_assert_eq!(*v, 0, "new cell must hold the default");
                        model_slot(&mut model, &k, collide);
                    }
                    Entry::Existing(v) => {
                        prop_assert_eq!(Some(*v), already);
                    }
                }
            }
            OpI::Get(i) => {
                let k = make_key(collide, &pool[i]);
                let before = sut.len();
                prop_assert_eq!(sut.get(&k), model_get(&model, &k));
                prop_assert_eq!(sut.contains_key(&k), model_get(&model, &k).is_some());
                prop_assert_eq!(sut.len(), before);
            }
            OpI::GetForeign(bytes) => {
                let k = make_key(collide, &bytes);
                let cap = sut.capacity();
                prop_assert_eq!(sut.get(&k), model_get(&model, &k));
                prop_assert_eq!(sut.capacity(), cap);
            }
            OpI::Mutate(i, d) => {
                let k = make_key(collide, &pool[i]);
                match sut.get_mut(&k) {
                    Some(v) => {
                        *v = v.wrapping_add(d);
                        let m = model_slot(&mut model, &k, collide);
                        *m = m.wrapping_add(d);
                    }
                    None => prop_assert!(model_get(&model, &k).is_none()),
                }
            }
            OpI::Iterate => {
                let mut s: Vec<(Vec<u8>, i32)> =
                    sut.iter().map(|(k, v)| (k.as_bytes().to_vec(), *v)).collect();
                let mut m: Vec<(Vec<u8>, i32)> = model.iter().cloned().collect();
                s.sort();
                m.sort();
                prop_assert_eq!(s, m);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        check_structure(&sut, collide)?;
    }

    // Teardown hands back exactly the model's values.
    let mut drained = Vec::new();
    sut.destroy_with(|v| drained.push(v));
    let mut expected: Vec<i32> = model.iter().map(|(_, v)| *v).collect();
    drained.sort();
    expected.sort();
    prop_assert_eq!(drained, expected);
    Ok(())
}

// Property: state-machine equivalence against a hashbrown model.
// Invariants exercised across random operation sequences:
// - put/entry create at most one cell per distinct byte string; a new cell
//   holds the default and later fetches see the last write.
// - get/contains_key agree with the model and never change len/capacity.
// - Capacity stays a power of two with load factor <= 3/4 after each op.
// - Every stored hash is the hash of its stored bytes (growth relocates,
//   it does not rehash or drop entries).
// - destroy_with yields each live value exactly once.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(&pool, ops, false)?;
    }

    // Same invariants with hashes collapsed to four values, stressing
    // byte comparison along long probe runs.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(&pool, ops, true)?;
    }
}
