/// Width of a trace address in bits.
pub const ADDRESS_BITS: u32 = u64::BITS;

/// Mask with the low `bits` bits set. Saturates at a full word.
pub fn low_mask(bits: u32) -> u64 {
    match bits {
        0 => 0,
        b if b >= ADDRESS_BITS => u64::MAX,
        b => (1u64 << b) - 1,
    }
}

/// Number of sets addressed by `set_bits` index bits, if the host can index them.
pub fn calculate_num_sets(set_bits: u32) -> Option<usize> {
    1usize.checked_shl(set_bits)
}

/// Total line slots for the cache, if the product fits in `usize`.
pub fn calculate_num_lines(num_sets: usize, num_ways: usize) -> Option<usize> {
    num_sets.checked_mul(num_ways)
}
