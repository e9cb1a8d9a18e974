//! Fixed-width parameter bitset.
//!
//! Turns "is parameter P allowed here" into a single bit test. Indices come
//! from [`ParamIndex`](crate::index::ParamIndex); anything at or beyond
//! [`BITSET_CAPACITY`] is silently ignored, never an error.

use std::fmt;

/// Number of distinct parameter indices a bitset can hold.
pub const BITSET_CAPACITY: usize = 128;

const WORDS: usize = BITSET_CAPACITY / 32;

/// 128-bit set of small integers, stored as four 32-bit words.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ParamBitset {
    words: [u32; WORDS],
}

impl ParamBitset {
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        let mut set = Self::new();
        for i in indices {
            set.set(i);
        }
        set
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        if index < BITSET_CAPACITY {
            self.words[index / 32] |= 1 << (index % 32);
        }
    }

    #[inline]
    pub fn clear(&mut self, index: usize) {
        if index < BITSET_CAPACITY {
            self.words[index / 32] &= !(1 << (index % 32));
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        index < BITSET_CAPACITY && self.words[index / 32] & (1 << (index % 32)) != 0
    }

    pub fn union(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a | b)
    }

    pub fn intersect(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & b)
    }

    /// Bits in `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & !b)
    }

    /// True when every bit of `other` is also set in `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == *b)
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Set indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..BITSET_CAPACITY).filter(move |i| self.get(*i))
    }

    #[inline]
    fn zip_with(&self, other: &Self, f: impl Fn(u32, u32) -> u32) -> Self {
        let mut words = [0; WORDS];
        for (i, w) in words.iter_mut().enumerate() {
            *w = f(self.words[i], other.words[i]);
        }
        Self { words }
    }
}

impl fmt::Debug for ParamBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.indices()).finish()
    }
}
