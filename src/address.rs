//! Splitting a raw address into block offset, set index and tag.
//!
//! From the least significant bit upward an address holds `b` offset bits,
//! then `s` set-index bits; everything above is the tag. When `s + b` covers
//! the whole word the tag collapses to zero.

use crate::utils::low_mask;

/// The three fields of an address under a given geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub offset: u64,
    pub set_index: u64,
    pub tag: u64,
}

pub fn decompose(address: u64, set_bits: u32, block_bits: u32) -> Fields {
    Fields {
        offset: address & low_mask(block_bits),
        set_index: address.checked_shr(block_bits).unwrap_or(0) & low_mask(set_bits),
        tag: address.checked_shr(set_bits.saturating_add(block_bits)).unwrap_or(0),
    }
}

/// Inverse of [`decompose`]. Bits outside each field's width are discarded.
pub fn compose(fields: Fields, set_bits: u32, block_bits: u32) -> u64 {
    let tag = fields.tag.checked_shl(set_bits.saturating_add(block_bits)).unwrap_or(0);
    let set = (fields.set_index & low_mask(set_bits))
        .checked_shl(block_bits)
        .unwrap_or(0);
    tag | set | (fields.offset & low_mask(block_bits))
}
