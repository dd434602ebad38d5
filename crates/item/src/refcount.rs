use crate::handle::ItemRef;
use crate::header::{self, RawHeader};
use crate::store::Store;
use crate::time::Clock;

impl<C: Clock> Store<C> {
    pub(crate) fn header_of(&self, it: ItemRef) -> RawHeader {
        header::read_header(self.slab.chunk_bytes(it.0))
    }

    pub(crate) fn write_header_of(&mut self, it: ItemRef, header: &RawHeader) {
        header::write_header(self.slab.chunk_bytes_mut(it.0), header);
    }

    /// Increment the item's refcount and bridge the bump to its owning page.
    pub(crate) fn acquire(&mut self, it: ItemRef) {
        let mut h = self.header_of(it);
        h.refcount += 1;
        self.write_header_of(it, &h);
        self.slab.acquire_refcount(it.0);
        log::debug!("acquire {:?} -> refcount {}", it.0, h.refcount);
    }

    /// Decrement the item's refcount; free the chunk back to the slab allocator iff it reaches
    /// zero while unlinked. Freeing an item already in the freelist is a broken invariant.
    pub fn release(&mut self, it: ItemRef) {
        let mut h = self.header_of(it);
        assert!(
            !h.in_freeq(),
            "release called on a chunk already in the freelist"
        );
        if h.refcount == 0 {
            // Defensive guard mirroring the source: releasing an already-zero refcount is a
            // no-op rather than an underflow.
            return;
        }
        h.refcount -= 1;
        self.slab.release_refcount(it.0);
        let linked = h.is_linked();
        self.write_header_of(it, &h);
        log::debug!("release {:?} -> refcount {}", it.0, h.refcount);
        if h.refcount == 0 && !linked {
            self.free_chunk(it);
        }
    }

    pub(crate) fn free_chunk(&mut self, it: ItemRef) {
        let mut h = self.header_of(it);
        h.set_flag(header::FLAG_IN_FREEQ, true);
        self.write_header_of(it, &h);
        self.slab.put_item(it.0);
        self.metrics.item_remove += 1;
        log::debug!("freed chunk {:?} back to slab", it.0);
    }
}
