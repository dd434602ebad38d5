use crate::config::SlabConfig;
use crate::page::{ChunkId, Page};

/// A slab class id. `0` is [MIN_ID]; the largest configured class is [MAX_ID]. There is no
/// explicit `INVALID_ID` value in this rendering — callers get `None` from `slab_id` instead
/// (see [INVALID_ID] for the sentinel used where an `Option` isn't convenient, e.g. display).
pub type ClassId = u8;

pub const MIN_ID: ClassId = 0;
/// Placeholder "no such class" sentinel for contexts that want a concrete value rather than an
/// `Option<ClassId>` (logging, the CLI's `stats` output). `slab_id` and `get_item` never return
/// this; they return `None` / `Err` instead.
pub const INVALID_ID: ClassId = ClassId::MAX;

/// The largest class id configured on a given allocator is computed at construction time; this
/// constant instead documents the type-level ceiling enforced by [build_classes].
pub const MAX_ID: ClassId = ClassId::MAX - 1;

/// One size bucket: a fixed chunk size and the set of pages backing it.
pub struct SlabClass {
    pub(crate) id: ClassId,
    pub chunk_size: usize,
    page_size: usize,
    pages: Vec<Page>,
    free: Vec<ChunkId>,
}

impl SlabClass {
    fn new(id: ClassId, chunk_size: usize, page_size: usize) -> Self {
        SlabClass {
            id,
            chunk_size,
            page_size,
            pages: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn chunk_offset(&self, slot: u32) -> usize {
        crate::page::SLAB_HDR_SIZE + slot as usize * self.chunk_size
    }

    pub(crate) fn pop_free(&mut self) -> Option<ChunkId> {
        self.free.pop()
    }

    pub(crate) fn push_free(&mut self, chunk: ChunkId) {
        debug_assert_eq!(chunk.class, self.id);
        self.free.push(chunk);
    }

    /// Allocate a new page and queue all of its chunks onto the freelist.
    pub(crate) fn grow(&mut self) {
        let page = Page::new(self.page_size, self.chunk_size);
        let chunks_per_page = page.chunks_per_page();
        let page_idx = self.pages.len() as u32;
        self.pages.push(page);
        log::debug!(
            "slab class {} grew to {} pages ({} chunks/page)",
            self.id,
            self.pages.len(),
            chunks_per_page
        );
        for slot in (0..chunks_per_page as u32).rev() {
            self.free.push(ChunkId {
                class: self.id,
                page: page_idx,
                slot,
            });
        }
    }

    pub(crate) fn page_mut(&mut self, page: u32) -> &mut Page {
        &mut self.pages[page as usize]
    }

    pub(crate) fn chunk_bytes(&self, chunk: ChunkId) -> &[u8] {
        self.pages[chunk.page as usize].chunk_bytes(chunk.slot)
    }

    pub(crate) fn chunk_bytes_mut(&mut self, chunk: ChunkId) -> &mut [u8] {
        self.pages[chunk.page as usize].chunk_bytes_mut(chunk.slot)
    }
}

/// Build the geometric class table described by `config`.
pub(crate) fn build_classes(config: &SlabConfig) -> Vec<SlabClass> {
    assert!(config.growth_factor > 1.0, "growth_factor must exceed 1.0");
    assert!(config.chunk_size_min > crate::page::SLAB_HDR_SIZE);
    assert!(config.chunk_size_max >= config.chunk_size_min);
    assert!(
        config.page_size > config.chunk_size_max,
        "page_size must exceed chunk_size_max so every class fits at least one chunk per page"
    );

    let mut classes = Vec::new();
    let mut size = config.chunk_size_min as f64;
    loop {
        let chunk_size = (size.round() as usize).max(classes.len() + 1);
        let id = classes.len() as ClassId;
        classes.push(SlabClass::new(id, chunk_size, config.page_size));
        if chunk_size >= config.chunk_size_max {
            break;
        }
        size *= config.growth_factor;
        if size as usize >= config.chunk_size_max {
            size = config.chunk_size_max as f64;
        }
    }
    classes
}
