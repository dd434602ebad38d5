use bytemuck::Zeroable;

use crate::error::{ItemError, Result};
use crate::handle::ItemRef;
use crate::header::{self, RawHeader};
use crate::layout;
use crate::store::Store;
use crate::time::Clock;

impl<C: Clock> Store<C> {
    /// Allocate a fresh, unlinked item sized to hold `key` and a `vlen`-byte value.
    ///
    /// The returned item carries refcount 1, owned by the caller; the value bytes are *not*
    /// copied here (callers write the value after allocating, since `update`/`annex` need to
    /// control exactly where it lands). See the specification's allocation steps.
    pub(crate) fn alloc_item(&mut self, key: &[u8], exptime: u32, vlen: u32) -> Result<ItemRef> {
        assert!(key.len() <= u8::MAX as usize, "key exceeds 255 bytes");
        let klen = key.len() as u8;
        let has_cas = self.config.use_cas;
        let ntotal = layout::item_ntotal(klen, vlen, has_cas);

        let id = match self.slab.slab_id(ntotal) {
            Some(id) => id,
            None => return Err(ItemError::Oversized),
        };

        let chunk = match self.slab.get_item(id) {
            Ok(chunk) => chunk,
            Err(e) => {
                self.metrics.item_req_ex += 1;
                return Err(e.into());
            }
        };
        let it = ItemRef(chunk);

        let mut header = RawHeader::zeroed();
        header.magic = header::ITEM_MAGIC;
        header.exptime = exptime;
        header.vlen = vlen;
        header.offset = self.slab.chunk_offset(chunk) as u32;
        header.id = id;
        header.klen = klen;
        header.vtype = header::VTYPE_STR;
        header.set_flag(header::FLAG_HAS_CAS, has_cas);
        self.write_header_of(it, &header);

        let key_start = layout::key_offset(has_cas);
        let buf = self.slab.chunk_bytes_mut(chunk);
        buf[key_start..key_start + klen as usize].copy_from_slice(key);
        if has_cas {
            layout::write_cas_bytes(buf, 0);
        }

        self.acquire(it);
        self.metrics.item_req += 1;
        log::debug!(
            "allocated item {:?} class={} ntotal={}",
            chunk,
            id,
            ntotal
        );
        Ok(it)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use crate::time::TestClock;

    #[test]
    fn alloc_produces_a_refcounted_unlinked_item_with_the_key_written() {
        let mut store = Store::setup_with_clock(StoreConfig::default(), TestClock::new(0));
        let it = store.alloc_item(b"foo", 0, 3).unwrap();
        let h = store.header_of(it);
        assert_eq!(h.refcount, 1);
        assert!(!h.is_linked());
        assert_eq!(h.klen, 3);
        assert_eq!(layout::key_bytes(store.slab.chunk_bytes(it.0), &h), b"foo");
        assert_eq!(store.metrics().item_req, 1);
    }

    #[test]
    fn oversized_allocation_is_rejected_before_touching_the_slab() {
        let mut store = Store::setup_with_clock(StoreConfig::default(), TestClock::new(0));
        let huge = vec![0u8; store.config().slab.chunk_size_max + 1];
        let err = store.alloc_item(b"k", 0, huge.len() as u32).unwrap_err();
        assert_eq!(err, ItemError::Oversized);
        // Rejection is pre-slab: item_req_ex is only bumped on the out-of-memory path.
        assert_eq!(store.metrics().item_req_ex, 0);
        assert_eq!(store.metrics().item_req, 0);
    }
}
