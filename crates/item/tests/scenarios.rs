//! End-to-end scenarios against a single in-process store, one per literal scenario in the
//! specification this crate implements.
use item_store::{ItemError, Store, StoreConfig, TestClock};

fn store() -> Store<TestClock> {
    Store::setup_with_clock(StoreConfig::default(), TestClock::new(0))
}

#[test]
fn basic_round_trip() {
    let mut s = store();
    s.set(b"foo", b"bar", 0).unwrap();
    let it = s.get(b"foo").unwrap();
    assert_eq!(s.value(it), b"bar");
    assert_eq!(s.cas_token(it), 1);
    s.release(it);

    s.delete(b"foo").unwrap();
    assert!(s.get(b"foo").is_none());
    assert_eq!(s.delete(b"foo").unwrap_err(), ItemError::NotFound);
}

#[test]
fn lazy_expiration() {
    let mut s = Store::setup_with_clock(StoreConfig::default(), TestClock::new(100));
    s.set(b"k", b"v", 105).unwrap();
    let it = s.get(b"k").unwrap();
    assert_eq!(s.value(it), b"v");
    s.release(it);

    s.clock().set(106);
    assert!(s.get(b"k").is_none());
    assert_eq!(s.metrics().item_curr, 0);
    assert!(s.get(b"k").is_none());
}

#[test]
fn cas_success_then_stale() {
    let mut s = store();
    s.set(b"k", b"v1", 0).unwrap();
    s.set(b"k", b"v2", 0).unwrap();

    assert_eq!(s.cas(b"k", b"v3", 0, 1).unwrap_err(), ItemError::CasMismatch);
    s.cas(b"k", b"v3", 0, 2).unwrap();

    let it = s.get(b"k").unwrap();
    assert_eq!(s.value(it), b"v3");
    s.release(it);
}

#[test]
fn append_in_place_fast_path() {
    let mut s = store();
    s.set(b"key", b"AAAA", 0).unwrap();
    s.annex(b"key", b"BBBB", true).unwrap();

    let it = s.get(b"key").unwrap();
    assert_eq!(s.value(it), b"AAAABBBB");
    assert!(!s.is_raligned(it));
    assert_eq!(s.cas_token(it), 2);
    s.release(it);
}

#[test]
fn prepend_triggers_realignment() {
    let mut s = store();
    s.set(b"key", b"AAAA", 0).unwrap();
    s.annex(b"key", b"BB", false).unwrap();
    s.annex(b"key", b"CC", false).unwrap();

    let it = s.get(b"key").unwrap();
    assert_eq!(s.value(it), b"CCBBAAAA");
    assert!(s.is_raligned(it));
    s.release(it);
}

#[test]
fn oversized_value_is_rejected_before_any_allocation() {
    let mut s = store();
    let huge = vec![b'x'; s.config().slab.chunk_size_max + 1];
    let err = s.set(b"k", &huge, 0).unwrap_err();
    assert_eq!(err, ItemError::Oversized);
    assert!(s.get(b"k").is_none());
    assert_eq!(s.metrics().item_req, 0);
}
