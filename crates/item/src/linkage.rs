use crate::handle::ItemRef;
use crate::header;
use crate::layout;
use crate::store::Store;
use crate::time::Clock;

impl<C: Clock> Store<C> {
    /// Publish `it` in the hash index under its own key, generating a fresh CAS token.
    pub(crate) fn link(&mut self, it: ItemRef) {
        let token = self.cas.next();
        self.link_with_token(it, token);
    }

    /// Like [Store::link], but the CAS token is supplied rather than freshly generated. Used by
    /// `cas` so the new item inherits the token the caller matched on (see the deviation noted
    /// against `link`'s usual behavior).
    pub(crate) fn link_with_token(&mut self, it: ItemRef, token: u64) {
        let mut h = self.header_of(it);
        assert!(
            !h.is_linked() && !h.in_freeq(),
            "link called on an already-linked or freed item"
        );
        h.set_flag(header::FLAG_IS_LINKED, true);
        self.write_header_of(it, &h);
        if h.has_cas() {
            layout::write_cas_bytes(self.slab.chunk_bytes_mut(it.0), token);
        }
        let key = layout::key_bytes(self.slab.chunk_bytes(it.0), &h).to_vec();
        self.assoc.put(&key, it);
        self.metrics.item_link += 1;
        self.metrics.item_curr += 1;
        self.metrics.item_keyval_byte += h.klen as i64 + h.vlen as i64;
        self.metrics.item_val_byte += h.vlen as i64;
        log::debug!("linked {:?}", it.0);
    }

    /// Withdraw `it` from the hash index. A no-op if it is already unlinked, so this is safe to
    /// call redundantly (the counter decrements are gated on `is_linked` for the same reason).
    pub(crate) fn unlink(&mut self, it: ItemRef) {
        let h = self.header_of(it);
        if !h.is_linked() {
            return;
        }
        let key = layout::key_bytes(self.slab.chunk_bytes(it.0), &h).to_vec();
        let mut h2 = h;
        h2.set_flag(header::FLAG_IS_LINKED, false);
        self.write_header_of(it, &h2);
        self.assoc.delete(&key);
        self.metrics.item_unlink += 1;
        self.metrics.item_curr -= 1;
        self.metrics.item_keyval_byte -= h.klen as i64 + h.vlen as i64;
        self.metrics.item_val_byte -= h.vlen as i64;
        log::debug!("unlinked {:?}", it.0);
        if h2.refcount == 0 {
            self.free_chunk(it);
        }
    }

    /// Atomically (from the caller's view) replace `old` with `new` under the same key, with a
    /// freshly generated CAS token.
    pub(crate) fn relink(&mut self, old: ItemRef, new: ItemRef) {
        self.unlink(old);
        self.link(new);
    }

    /// Like [Store::relink], but `new` is linked with the supplied CAS token rather than a fresh
    /// one (the `cas` operation's token-inheriting path).
    pub(crate) fn relink_with_token(&mut self, old: ItemRef, new: ItemRef, token: u64) {
        self.unlink(old);
        self.link_with_token(new, token);
    }

    /// Invoked when reclaiming a linked, refcount-0 chunk for a new allocation: withdraws it from
    /// the index without freeing (the slab layer immediately re-hands the chunk to the new
    /// allocation). No eviction policy in this workspace calls this automatically — see §10.1 —
    /// but the hook is implemented so a future eviction policy can.
    pub(crate) fn reuse(&mut self, it: ItemRef) {
        let h = self.header_of(it);
        assert_eq!(h.refcount, 0, "reuse called on a still-referenced item");
        assert!(h.is_linked(), "reuse called on an item that isn't linked");
        let key = layout::key_bytes(self.slab.chunk_bytes(it.0), &h).to_vec();
        let mut h2 = h;
        h2.set_flag(header::FLAG_IS_LINKED, false);
        self.write_header_of(it, &h2);
        self.assoc.delete(&key);
        self.metrics.item_unlink += 1;
        self.metrics.item_curr -= 1;
        self.metrics.item_keyval_byte -= h.klen as i64 + h.vlen as i64;
        self.metrics.item_val_byte -= h.vlen as i64;
        log::debug!("reused chunk {:?}, evicting linked item", it.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use crate::time::TestClock;

    #[test]
    fn reuse_withdraws_from_the_index_without_freeing() {
        let mut store = Store::setup_with_clock(StoreConfig::default(), TestClock::new(0));
        store.set(b"k", b"v", 0).unwrap();
        let it = *store.assoc.get(b"k").unwrap();
        store.reuse(it);
        assert!(store.assoc.get(b"k").is_none());
        assert_eq!(store.metrics().item_curr, 0);
        // Not freed: still not in the freelist, caller (the slab layer) owns what happens next.
        assert!(!store.header_of(it).in_freeq());
    }
}
