use crate::header::{self, RawHeader};

pub const ITEM_HDR_SIZE: usize = header::HEADER_SIZE;
pub const CAS_SIZE: usize = 8;

fn cas_region_size(has_cas: bool) -> usize {
    if has_cas {
        CAS_SIZE
    } else {
        0
    }
}

/// Total bytes a fully laid-out item occupies: `header + (cas?) + klen + vlen`. Used to pick a
/// slab class at allocation time and to decide whether an annex stays in its current class.
pub fn item_ntotal(klen: u8, vlen: u32, has_cas: bool) -> usize {
    ITEM_HDR_SIZE + cas_region_size(has_cas) + klen as usize + vlen as usize
}

pub fn cas_offset() -> usize {
    ITEM_HDR_SIZE
}

pub fn key_offset(has_cas: bool) -> usize {
    ITEM_HDR_SIZE + cas_region_size(has_cas)
}

/// Where the value starts when left-aligned (the default layout): immediately after the key.
pub fn left_data_offset(has_cas: bool, klen: u8) -> usize {
    key_offset(has_cas) + klen as usize
}

/// Where the value starts given the header's current layout, left- or right-aligned.
///
/// For a right-aligned item this depends on the *current* `vlen`; callers that are about to grow
/// `vlen` (the prepend fast path) must compute this before writing the new `vlen` back.
pub fn data_offset(chunk_size: usize, header: &RawHeader) -> usize {
    if header.is_raligned() {
        chunk_size - header.vlen as usize
    } else {
        left_data_offset(header.has_cas(), header.klen)
    }
}

pub fn cas_bytes(chunk: &[u8]) -> u64 {
    let start = cas_offset();
    u64::from_ne_bytes(chunk[start..start + CAS_SIZE].try_into().unwrap())
}

pub fn write_cas_bytes(chunk: &mut [u8], token: u64) {
    let start = cas_offset();
    chunk[start..start + CAS_SIZE].copy_from_slice(&token.to_ne_bytes());
}

pub fn key_bytes<'a>(chunk: &'a [u8], header: &RawHeader) -> &'a [u8] {
    let start = key_offset(header.has_cas());
    &chunk[start..start + header.klen as usize]
}

pub fn value_bytes<'a>(chunk: &'a [u8], header: &RawHeader) -> &'a [u8] {
    let start = data_offset(chunk.len(), header);
    &chunk[start..start + header.vlen as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    #[test]
    fn ntotal_accounts_for_the_cas_region_only_when_present() {
        let without = item_ntotal(3, 4, false);
        let with = item_ntotal(3, 4, true);
        assert_eq!(with - without, CAS_SIZE);
    }

    #[test]
    fn left_aligned_value_follows_key_and_cas_region() {
        let mut h = RawHeader::zeroed();
        h.klen = 3;
        h.vlen = 4;
        h.set_flag(header::FLAG_HAS_CAS, true);
        let offset = data_offset(128, &h);
        assert_eq!(offset, ITEM_HDR_SIZE + CAS_SIZE + 3);
    }

    #[test]
    fn raligned_value_occupies_the_chunk_tail() {
        let mut h = RawHeader::zeroed();
        h.klen = 3;
        h.vlen = 4;
        h.set_flag(header::FLAG_IS_RALIGNED, true);
        let offset = data_offset(128, &h);
        assert_eq!(offset, 128 - 4);
    }
}
