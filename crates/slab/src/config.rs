/// Configuration for a [crate::SlabAllocator].
///
/// Class sizes grow geometrically from `chunk_size_min` to `chunk_size_max` by `growth_factor`,
/// the same scheme classic memcached uses for its slab class table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct SlabConfig {
    /// Chunk size of the smallest class, in bytes.
    pub chunk_size_min: usize,

    /// Chunk size of the largest class, in bytes. Allocations larger than this are oversized.
    pub chunk_size_max: usize,

    /// Growth factor between consecutive classes. Must be `> 1.0`.
    pub growth_factor: f64,

    /// Size of a single page within a class, in bytes. Must be strictly greater than
    /// `chunk_size_max` so that even the largest class holds at least one chunk per page; this
    /// is asserted at page-construction time.
    pub page_size: usize,

    /// Total bytes the allocator may hand out across all classes before returning
    /// [crate::SlabError::NoMemory].
    pub max_bytes: usize,
}

impl Default for SlabConfig {
    fn default() -> Self {
        SlabConfig {
            chunk_size_min: 64,
            chunk_size_max: 512 << 10,
            growth_factor: 1.25,
            page_size: 1 << 20,
            max_bytes: 64 << 20,
        }
    }
}
