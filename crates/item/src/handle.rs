use slab_store::ChunkId;

/// Opaque handle to an item: cheap to copy, resolved through the store's slab allocator to reach
/// header, key, and value bytes. This is the Rust rendering of the source's `item*` pointer —
/// see [crate::layout] and the Design Notes in the specification this crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef(pub(crate) ChunkId);
