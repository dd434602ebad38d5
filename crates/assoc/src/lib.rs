//! A closed-addressing hash index keyed by raw key bytes.
//!
//! This is a thin wrapper over `std::collections::HashMap` with `ahash`'s non-cryptographic
//! hasher, the same pairing the reference workspace uses elsewhere for hashing opaque keys
//! (`PagedStrategy`'s `HashMap<TypeId, ..., ahash::RandomState>`). It has no opinion about what
//! `V` is; the item layer stores whatever handle it needs to get back to a chunk.
#![allow(dead_code)]

use std::collections::HashMap;

/// Maps key bytes to a value of the caller's choosing. Enforces nothing about key uniqueness
/// beyond what `HashMap` already gives you; the item layer is responsible for ensuring at most
/// one *linked* item exists per key, this table just stores whatever it's told to.
pub struct AssocTable<V> {
    table: HashMap<Box<[u8]>, V, ahash::RandomState>,
}

impl<V> AssocTable<V> {
    /// Create a table pre-sized to `2^hash_power` buckets.
    pub fn create(hash_power: u32) -> Self {
        let buckets = 1usize << hash_power.min(31);
        log::debug!("assoc table created with {} buckets", buckets);
        AssocTable {
            table: HashMap::with_capacity_and_hasher(buckets, ahash::RandomState::new()),
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.table.get(key)
    }

    /// Insert or replace the entry for `key`.
    pub fn put(&mut self, key: &[u8], value: V) {
        self.table.insert(key.into(), value);
    }

    /// Remove the entry for `key`, if any.
    pub fn delete(&mut self, key: &[u8]) -> Option<V> {
        self.table.remove(key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<V> Default for AssocTable<V> {
    fn default() -> Self {
        Self::create(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let mut table: AssocTable<u32> = AssocTable::create(4);
        table.put(b"foo", 42);
        assert_eq!(table.get(b"foo"), Some(&42));
        assert_eq!(table.get(b"bar"), None);
    }

    #[test]
    fn put_replaces_the_existing_entry_for_a_key() {
        let mut table: AssocTable<u32> = AssocTable::create(4);
        table.put(b"foo", 1);
        table.put(b"foo", 2);
        assert_eq!(table.get(b"foo"), Some(&2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn delete_removes_the_entry_and_returns_it() {
        let mut table: AssocTable<u32> = AssocTable::create(4);
        table.put(b"foo", 7);
        assert_eq!(table.delete(b"foo"), Some(7));
        assert_eq!(table.get(b"foo"), None);
        assert_eq!(table.delete(b"foo"), None);
    }
}
