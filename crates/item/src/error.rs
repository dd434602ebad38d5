/// Failure modes the item layer's public operations can report.
///
/// Internal-assert failures (broken invariants) are not represented here; they use
/// `assert!`/`debug_assert!` and abort, matching the source's `ASSERT` macro.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("value would exceed the largest configured slab class")]
    Oversized,
    #[error("key not found")]
    NotFound,
    #[error("supplied cas token does not match the stored token")]
    CasMismatch,
    #[error("slab allocator out of memory")]
    NoMemory,
}

impl From<slab_store::SlabError> for ItemError {
    fn from(e: slab_store::SlabError) -> Self {
        match e {
            slab_store::SlabError::NoMemory => ItemError::NoMemory,
        }
    }
}

pub type Result<T, E = ItemError> = std::result::Result<T, E>;
