//! Fixed-size bit array
//!
//! Out-of-range indices and size-mismatched operations are programming errors
//! and panic.

use bit_vec::BitVec;

/// A fixed-length set of bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    bits: BitVec,
}

impl BitSet {
    /// All bits set
    #[must_use]
    pub fn full(len: usize) -> Self {
        Self {
            bits: BitVec::from_elem(len, true),
        }
    }

    /// All bits clear
    #[must_use]
    pub fn empty(len: usize) -> Self {
        Self {
            bits: BitVec::from_elem(len, false),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline]
    fn check(&self, index: usize) {
        assert!(
            index < self.bits.len(),
            "bit index {index} out of range for bitset of length {}",
            self.bits.len()
        );
    }

    /// # Panics
    /// Panics if `index >= len`
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        self.check(index);
        self.bits.get(index).unwrap_or(false)
    }

    /// # Panics
    /// Panics if `index >= len`
    #[inline]
    pub fn set(&mut self, index: usize) {
        self.check(index);
        self.bits.set(index, true);
    }

    /// # Panics
    /// Panics if `index >= len`
    #[inline]
    pub fn clear(&mut self, index: usize) {
        self.check(index);
        self.bits.set(index, false);
    }

    /// In-place AND with another set of the same length
    ///
    /// # Panics
    /// Panics if the lengths differ
    pub fn and_assign(&mut self, other: &Self) {
        assert_eq!(
            self.bits.len(),
            other.bits.len(),
            "bitset length mismatch in AND: {} vs {}",
            self.bits.len(),
            other.bits.len()
        );
        self.bits.and(&other.bits);
    }

    /// Population count
    #[must_use]
    pub fn count_ones(&self) -> usize {
        // Bits past `len` in the last block are always zero
        self.bits.blocks().map(|b| b.count_ones() as usize).sum()
    }

    /// Indices of set bits, ascending
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, bit)| bit.then_some(i))
    }
}
