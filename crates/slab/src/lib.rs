//! A slab allocator: fixed-size chunk pools grouped into geometrically-sized classes.
//!
//! This is the storage layer underneath the item layer in `item_store`. It owns no notion of
//! keys, values, or expiration; it only hands out and reclaims fixed-size byte chunks, grouped
//! by size class, and tracks a coarse per-page refcount that a (not implemented here) eviction
//! policy could consult before reclaiming a page.
#![allow(dead_code)]

mod class;
mod config;
mod error;
mod page;

pub use class::{ClassId, SlabClass, INVALID_ID, MAX_ID, MIN_ID};
pub use config::SlabConfig;
pub use error::{Result, SlabError};
pub use page::{ChunkId, SLAB_HDR_SIZE, SLAB_MAGIC};

/// A slab allocator: one [SlabClass] per size bucket, each backed by growable pages of
/// fixed-size chunks.
pub struct SlabAllocator {
    classes: Vec<SlabClass>,
    config: SlabConfig,
    bytes_used: usize,
}

impl SlabAllocator {
    pub fn new(config: SlabConfig) -> Self {
        let classes = class::build_classes(&config);
        log::info!(
            "slab allocator initialized with {} classes ({}..={} bytes)",
            classes.len(),
            config.chunk_size_min,
            config.chunk_size_max
        );
        SlabAllocator {
            classes,
            config,
            bytes_used: 0,
        }
    }

    /// Number of configured size classes.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// The chunk size (`slab_item_size`) for a given class.
    pub fn item_size(&self, id: ClassId) -> usize {
        self.classes[id as usize].chunk_size
    }

    /// The configured page size (`slab_size_setting`).
    pub fn slab_size_setting(&self) -> usize {
        self.config.page_size
    }

    /// Find the smallest class whose chunk size fits `nbytes`, or `None` if `nbytes` exceeds the
    /// largest class (the caller should treat this as "oversized").
    pub fn slab_id(&self, nbytes: usize) -> Option<ClassId> {
        self.classes
            .iter()
            .find(|c| c.chunk_size >= nbytes)
            .map(|c| c.id)
    }

    /// The byte offset of a chunk from the start of its enclosing page, for invariant checking.
    pub fn chunk_offset(&self, chunk: ChunkId) -> usize {
        self.classes[chunk.class as usize].chunk_offset(chunk.slot)
    }

    /// Obtain a free chunk from the given class, growing the class (allocating a new page) if
    /// its freelist is empty, subject to the allocator's memory budget.
    pub fn get_item(&mut self, id: ClassId) -> Result<ChunkId> {
        let class = &mut self.classes[id as usize];
        if let Some(chunk) = class.pop_free() {
            return Ok(chunk);
        }

        let page_bytes = self.config.page_size;
        if self.bytes_used + page_bytes > self.config.max_bytes {
            log::warn!(
                "slab class {} exhausted and out of memory budget ({} + {} > {})",
                id,
                self.bytes_used,
                page_bytes,
                self.config.max_bytes
            );
            return Err(SlabError::NoMemory);
        }

        class.grow();
        self.bytes_used += page_bytes;
        Ok(class
            .pop_free()
            .expect("freshly grown page must yield a chunk"))
    }

    /// Return a chunk to its class's freelist.
    pub fn put_item(&mut self, chunk: ChunkId) {
        self.classes[chunk.class as usize].push_free(chunk);
    }

    /// Bump the refcount of the page backing `chunk`. Bridges the item layer's per-item refcount
    /// to a page-granularity count.
    pub fn acquire_refcount(&mut self, chunk: ChunkId) {
        self.classes[chunk.class as usize]
            .page_mut(chunk.page)
            .refcount += 1;
    }

    /// Release a previously acquired page refcount.
    pub fn release_refcount(&mut self, chunk: ChunkId) {
        let page = self.classes[chunk.class as usize].page_mut(chunk.page);
        debug_assert!(page.refcount > 0);
        page.refcount = page.refcount.saturating_sub(1);
    }

    /// Immutable access to a chunk's bytes.
    pub fn chunk_bytes(&self, chunk: ChunkId) -> &[u8] {
        self.classes[chunk.class as usize].chunk_bytes(chunk)
    }

    /// Mutable access to a chunk's bytes.
    pub fn chunk_bytes_mut(&mut self, chunk: ChunkId) -> &mut [u8] {
        self.classes[chunk.class as usize].chunk_bytes_mut(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_cover_the_configured_range() {
        let alloc = SlabAllocator::new(SlabConfig::default());
        assert!(alloc.num_classes() > 1);
        assert_eq!(alloc.slab_id(1), Some(MIN_ID));
        assert_eq!(alloc.slab_id(usize::MAX), None);
    }

    #[test]
    fn get_item_then_put_item_reuses_the_chunk() {
        let mut alloc = SlabAllocator::new(SlabConfig::default());
        let id = alloc.slab_id(16).unwrap();
        let chunk = alloc.get_item(id).unwrap();
        alloc.put_item(chunk);
        let chunk2 = alloc.get_item(id).unwrap();
        assert_eq!(chunk, chunk2);
    }

    #[test]
    fn out_of_memory_is_reported_once_budget_is_exhausted() {
        let config = SlabConfig {
            chunk_size_min: 64,
            chunk_size_max: 64,
            growth_factor: 1.25,
            page_size: 128,
            max_bytes: 128, // exactly one page across all classes
        };
        let mut alloc = SlabAllocator::new(config);
        let id = MIN_ID;

        // Drain the single page we're allowed to allocate.
        let mut chunks = vec![];
        loop {
            match alloc.get_item(id) {
                Ok(c) => chunks.push(c),
                Err(SlabError::NoMemory) => break,
            }
        }
        assert!(!chunks.is_empty());
        assert!(matches!(alloc.get_item(id), Err(SlabError::NoMemory)));
    }

    #[test]
    fn refcounts_track_pages_not_chunks() {
        let mut alloc = SlabAllocator::new(SlabConfig::default());
        let id = alloc.slab_id(16).unwrap();
        let chunk = alloc.get_item(id).unwrap();
        alloc.acquire_refcount(chunk);
        alloc.acquire_refcount(chunk);
        alloc.release_refcount(chunk);
        alloc.release_refcount(chunk);
    }
}
