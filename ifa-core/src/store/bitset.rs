//! Liveness Bitset
//!
//! One bit per arena slot, set while the slot holds a live entity. The set
//! bits live in a compressed [`RoaringBitmap`]; `len` tracks how many slot
//! indices are addressable.

use roaring::RoaringBitmap;

/// Convert a slot index to a bitmap key.
///
/// # Panics
///
/// Panics if the index does not fit in `u32`.
fn key(index: usize) -> u32 {
    match u32::try_from(index) {
        Ok(key) => key,
        Err(_) => panic!("slot index {index} exceeds the liveness bitmap range"),
    }
}

/// A growable bitset with a "next set bit" scan.
#[derive(Debug, Clone, Default)]
pub struct LivenessBitset {
    bits: RoaringBitmap,
    len: usize,
}

impl LivenessBitset {
    /// Create an empty bitset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of addressable bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the bitset has no addressable bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Make at least `len` bits addressable. New bits start clear.
    /// Never shrinks.
    pub fn grow(&mut self, len: usize) {
        self.len = self.len.max(len);
    }

    /// Read bit `index`. Bits past the end read as clear.
    pub fn get(&self, index: usize) -> bool {
        index < self.len && self.bits.contains(key(index))
    }

    /// Write bit `index`, growing the bitset if needed.
    pub fn set(&mut self, index: usize, value: bool) {
        let key = key(index);
        self.grow(index + 1);
        if value {
            self.bits.insert(key);
        } else {
            self.bits.remove(key);
        }
    }

    /// Index of the first set bit at or after `from`, if any.
    pub fn next_set_from(&self, from: usize) -> Option<usize> {
        if from >= self.len {
            return None;
        }
        // Bits strictly below `from` are skipped by rank; select finds the next one.
        let below = match from {
            0 => 0,
            _ => self.bits.rank(key(from - 1)),
        };
        let below = u32::try_from(below).ok()?;
        self.bits.select(below).map(|bit| bit as usize)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.len() as usize
    }
}
