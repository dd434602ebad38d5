use crate::error::{ItemError, Result};
use crate::handle::ItemRef;
use crate::header::{self, RawHeader};
use crate::layout;
use crate::store::Store;
use crate::time::Clock;

impl<C: Clock> Store<C> {
    /// Look up `key`. Returns a refcounted handle the caller must [Store::release], or `None` if
    /// the key is absent or was found expired (and has just been lazily unlinked).
    pub fn get(&mut self, key: &[u8]) -> Option<ItemRef> {
        let it = *self.assoc.get(key)?;
        let h = self.header_of(it);
        if h.exptime != 0 && h.exptime <= self.clock.now() {
            log::debug!(
                "lazily expiring item (exptime {} <= now {})",
                h.exptime,
                self.clock.now()
            );
            self.unlink(it);
            return None;
        }
        self.acquire(it);
        Some(it)
    }

    /// Unconditional store. Replaces any existing value under `key`.
    pub fn set(&mut self, key: &[u8], val: &[u8], exptime: u32) -> Result<()> {
        let existing = self.get(key);
        let new = match self.alloc_item(key, exptime, val.len() as u32) {
            Ok(it) => it,
            Err(e) => {
                if let Some(old) = existing {
                    self.release(old);
                }
                return Err(e);
            }
        };
        self.write_value(new, val);
        self.classify(new);
        match existing {
            Some(old) => {
                self.relink(old, new);
                self.release(old);
            }
            None => self.link(new),
        }
        self.release(new);
        Ok(())
    }

    /// Conditional store: succeeds only if `token` matches the currently stored CAS token.
    pub fn cas(&mut self, key: &[u8], val: &[u8], exptime: u32, token: u64) -> Result<()> {
        let old = self.get(key).ok_or(ItemError::NotFound)?;
        if self.cas_token(old) != token {
            self.release(old);
            return Err(ItemError::CasMismatch);
        }
        let new = match self.alloc_item(key, exptime, val.len() as u32) {
            Ok(it) => it,
            Err(e) => {
                self.release(old);
                return Err(e);
            }
        };
        self.write_value(new, val);
        self.classify(new);
        // The new item inherits the caller's token rather than a freshly generated one.
        self.relink_with_token(old, new, token);
        self.release(old);
        self.release(new);
        Ok(())
    }

    /// Append (`append = true`) or prepend (`append = false`) `val` to the existing value under
    /// `key`, taking the in-place fast path when the resulting size still fits the current slab
    /// class and the current alignment matches the requested direction.
    pub fn annex(&mut self, key: &[u8], val: &[u8], append: bool) -> Result<()> {
        let old = self.get(key).ok_or(ItemError::NotFound)?;
        let h = self.header_of(old);
        let total = h.vlen as usize + val.len();

        let new_id = match self
            .slab
            .slab_id(layout::item_ntotal(h.klen, total as u32, h.has_cas()))
        {
            Some(id) => id,
            None => {
                self.release(old);
                return Err(ItemError::Oversized);
            }
        };

        let fast_path = new_id == h.id && h.is_raligned() != append;

        let result = if fast_path {
            self.annex_fast(old, &h, val, append, total as u32);
            Ok(())
        } else {
            self.annex_slow(old, &h, val, append, total as u32)
        };
        self.release(old);
        result
    }

    fn annex_fast(&mut self, it: ItemRef, old_header: &RawHeader, val: &[u8], append: bool, total: u32) {
        let chunk_len = self.slab.chunk_bytes(it.0).len();
        // Destination is computed from the *current* vlen, before vlen is updated to `total`.
        let dest = if append {
            layout::data_offset(chunk_len, old_header) + old_header.vlen as usize
        } else {
            layout::data_offset(chunk_len, old_header) - val.len()
        };
        let buf = self.slab.chunk_bytes_mut(it.0);
        buf[dest..dest + val.len()].copy_from_slice(val);

        let mut h = *old_header;
        h.vlen = total;
        self.write_header_of(it, &h);
        self.classify(it);

        let token = self.cas.next();
        if h.has_cas() {
            layout::write_cas_bytes(self.slab.chunk_bytes_mut(it.0), token);
        }
        log::debug!("annexed {:?} in place, vlen {} -> {}", it.0, old_header.vlen, total);
    }

    fn annex_slow(
        &mut self,
        old: ItemRef,
        old_header: &RawHeader,
        val: &[u8],
        append: bool,
        total: u32,
    ) -> Result<()> {
        let key = layout::key_bytes(self.slab.chunk_bytes(old.0), old_header).to_vec();
        let old_val = layout::value_bytes(self.slab.chunk_bytes(old.0), old_header).to_vec();

        let new = self.alloc_item(&key, old_header.exptime, total)?;
        let mut h = self.header_of(new);
        h.set_flag(header::FLAG_IS_RALIGNED, !append);
        self.write_header_of(new, &h);

        let combined: Vec<u8> = if append {
            old_val.iter().chain(val).copied().collect()
        } else {
            val.iter().chain(&old_val).copied().collect()
        };
        self.write_value(new, &combined);
        self.classify(new);
        self.relink(old, new);
        self.release(new);
        log::debug!("annexed {:?} via new allocation {:?}", old.0, new.0);
        Ok(())
    }

    /// Overwrite the value of an already-held item in place. Requires the new value still fits
    /// the item's current slab class; callers needing a larger class must use [Store::set].
    /// Does not touch the CAS token and does not relink.
    pub fn update(&mut self, it: ItemRef, val: &[u8]) -> Result<()> {
        let h = self.header_of(it);
        let fits = self
            .slab
            .slab_id(layout::item_ntotal(h.klen, val.len() as u32, h.has_cas()))
            == Some(h.id);
        if !fits {
            return Err(ItemError::Oversized);
        }
        let mut h2 = h;
        h2.vlen = val.len() as u32;
        self.write_header_of(it, &h2);
        self.write_value(it, val);
        self.classify(it);
        Ok(())
    }

    /// Remove `key`. The chunk frees as soon as refcount hits zero, typically immediately since
    /// `get` holds the only outstanding reference.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        let it = self.get(key).ok_or(ItemError::NotFound)?;
        self.unlink(it);
        self.release(it);
        Ok(())
    }

    pub fn value(&self, it: ItemRef) -> Vec<u8> {
        let h = self.header_of(it);
        layout::value_bytes(self.slab.chunk_bytes(it.0), &h).to_vec()
    }

    pub fn cas_token(&self, it: ItemRef) -> u64 {
        let h = self.header_of(it);
        if !h.has_cas() {
            return 0;
        }
        layout::cas_bytes(self.slab.chunk_bytes(it.0))
    }

    pub fn is_int(&self, it: ItemRef) -> bool {
        self.header_of(it).vtype == header::VTYPE_INT
    }

    pub fn is_raligned(&self, it: ItemRef) -> bool {
        self.header_of(it).is_raligned()
    }

    fn write_value(&mut self, it: ItemRef, val: &[u8]) {
        let h = self.header_of(it);
        let buf = self.slab.chunk_bytes_mut(it.0);
        let start = layout::data_offset(buf.len(), &h);
        buf[start..start + val.len()].copy_from_slice(val);
    }

    /// Classify the value as an integer or opaque string, advisory only (§4.12).
    fn classify(&mut self, it: ItemRef) {
        let h = self.header_of(it);
        let val = layout::value_bytes(self.slab.chunk_bytes(it.0), &h);
        let is_int = !val.is_empty()
            && std::str::from_utf8(val)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .is_some();
        let mut h2 = h;
        h2.vtype = if is_int { header::VTYPE_INT } else { header::VTYPE_STR };
        self.write_header_of(it, &h2);
    }
}
