/// Failure modes the slab allocator itself can report.
///
/// Oversized requests never reach here: `slab_id` returning `None` is how the item layer learns a
/// request is oversized, before a chunk is ever requested.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SlabError {
    #[error("slab allocator out of memory (budget exhausted)")]
    NoMemory,
}

pub type Result<T, E = SlabError> = std::result::Result<T, E>;
