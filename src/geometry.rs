use crate::error::{Error, Result};
use crate::utils::{ADDRESS_BITS, calculate_num_lines, calculate_num_sets};

/// Validated cache shape: `2^set_bits` sets of `ways` lines, `2^block_bits`-byte blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    set_bits: u32,
    ways: usize,
    block_bits: u32,
}

impl Geometry {
    pub fn new(set_bits: u32, ways: usize, block_bits: u32) -> Result<Self> {
        if ways == 0 {
            return Err(Error::geometry("associativity must be at least 1"));
        }
        match set_bits.checked_add(block_bits) {
            Some(width) if width <= ADDRESS_BITS => {}
            _ => {
                return Err(Error::geometry(format!(
                    "set bits ({set_bits}) + block bits ({block_bits}) exceed the {ADDRESS_BITS}-bit address"
                )));
            }
        }
        let num_sets = calculate_num_sets(set_bits).ok_or_else(|| {
            Error::geometry(format!("2^{set_bits} sets cannot be addressed on this host"))
        })?;
        if calculate_num_lines(num_sets, ways).is_none() {
            return Err(Error::geometry(format!(
                "{num_sets} sets x {ways} ways overflows the line count"
            )));
        }

        Ok(Self {
            set_bits,
            ways,
            block_bits,
        })
    }

    pub fn set_bits(&self) -> u32 {
        self.set_bits
    }

    pub fn block_bits(&self) -> u32 {
        self.block_bits
    }

    /// Associativity, `E`.
    pub fn ways(&self) -> usize {
        self.ways
    }

    pub fn num_sets(&self) -> usize {
        1usize << self.set_bits
    }
}
