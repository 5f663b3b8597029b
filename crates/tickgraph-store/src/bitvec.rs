//! Dense bit-vectors over 64-bit words with a cached population count.
//!
//! Every subject set in the store (`P[p]`, `O[o]`, query results) is a
//! `BitVector`. Bit `i` lives at `words[i / 64] & (1 << (i % 64))`.
//!
//! Invariant: `count == Σ popcount(words[k])` after every mutator returns.
//! Vectors grow (zero-filled) but never shrink.

use std::fmt;
use std::ops::{BitAnd, BitOr};

const WORD_BITS: usize = 64;

#[inline]
fn words_for_bits(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

/// A growable set of non-negative integers backed by 64-bit words.
#[derive(Clone, Default)]
pub struct BitVector {
    words: Vec<u64>,
    count: u64,
}

impl BitVector {
    /// An empty vector with no allocated words.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty vector with room for at least `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0; words_for_bits(bits)],
            count: 0,
        }
    }

    /// Build a vector with exactly the given bits set.
    pub fn from_ids(ids: impl IntoIterator<Item = usize>) -> Self {
        let mut out = Self::new();
        for id in ids {
            out.set(id);
        }
        out
    }

    /// Number of allocated 64-bit words.
    #[inline]
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    /// Number of addressable bits without growing.
    #[inline]
    pub fn bit_capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    /// Raw word view (read-only).
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Cached number of set bits, O(1).
    #[inline]
    pub fn popcount(&self) -> u64 {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Set bit `i`. Setting an already-set bit is a no-op.
    ///
    /// Growth: when `i` falls past the last word, the word array is resized to
    /// at least `max(i/64 + 1, 2·i/64 + 1, 2·len)` words, zero-filled.
    #[inline]
    pub fn set(&mut self, i: usize) {
        let word = i / WORD_BITS;
        if word >= self.words.len() {
            self.grow_to_include(i);
        }
        let mask = 1u64 << (i % WORD_BITS);
        let slot = &mut self.words[word];
        // Branch-free count update: adds 1 only when the bit was clear.
        let was_clear = ((*slot & mask) == 0) as u64;
        *slot |= mask;
        self.count += was_clear;
    }

    #[cold]
    fn grow_to_include(&mut self, i: usize) {
        let needed = i / WORD_BITS + 1;
        let doubled = (2 * i) / WORD_BITS + 1;
        let new_len = needed.max(doubled).max(self.words.len() * 2);
        self.words.resize(new_len, 0);
    }

    /// Whether bit `i` is set. Bits past the current capacity read as unset.
    #[inline]
    pub fn test(&self, i: usize) -> bool {
        match self.words.get(i / WORD_BITS) {
            Some(word) => (word >> (i % WORD_BITS)) & 1 == 1,
            None => false,
        }
    }

    /// Word-wise intersection. The result has `min(len(a), len(b))` words.
    pub fn and(&self, other: &BitVector) -> BitVector {
        let mut count = 0u64;
        let words: Vec<u64> = self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| {
                let w = a & b;
                count += u64::from(w.count_ones());
                w
            })
            .collect();
        BitVector { words, count }
    }

    /// Word-wise union. The result has `max(len(a), len(b))` words; the tail
    /// of the longer operand is copied verbatim.
    pub fn or(&self, other: &BitVector) -> BitVector {
        let (long, short) = if self.words.len() >= other.words.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut words = long.words.clone();
        for (w, s) in words.iter_mut().zip(short.words.iter()) {
            *w |= s;
        }
        let count = words.iter().map(|w| u64::from(w.count_ones())).sum();
        BitVector { words, count }
    }

    /// `popcount(self AND other)` without materializing the intersection.
    pub fn and_count(&self, other: &BitVector) -> u64 {
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| u64::from((a & b).count_ones()))
            .sum()
    }

    /// Recompute the population count from the words.
    ///
    /// Always equals `popcount()`; exposed so tests can check the invariant.
    pub fn popcount_from_words(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Ascending iterator over set bits (count-trailing-zeros enumeration).
    pub fn iter_ones(&self) -> Ones<'_> {
        Ones {
            words: &self.words,
            index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

/// Iterator over the set bits of a [`BitVector`], ascending.
pub struct Ones<'a> {
    words: &'a [u64],
    index: usize,
    current: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.index += 1;
            if self.index >= self.words.len() {
                return None;
            }
            self.current = self.words[self.index];
        }
        let tz = self.current.trailing_zeros() as usize;
        // Clear lowest set bit.
        self.current &= self.current - 1;
        Some(self.index * WORD_BITS + tz)
    }
}

/// Two vectors are equal when they hold the same bits, regardless of how many
/// trailing zero words either has allocated.
impl PartialEq for BitVector {
    fn eq(&self, other: &Self) -> bool {
        if self.count != other.count {
            return false;
        }
        let (long, short) = if self.words.len() >= other.words.len() {
            (&self.words, &other.words)
        } else {
            (&other.words, &self.words)
        };
        long[..short.len()] == short[..] && long[short.len()..].iter().all(|&w| w == 0)
    }
}

impl Eq for BitVector {}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitVector")
            .field("count", &self.count)
            .field("words", &self.words.len())
            .field("bits", &self.iter_ones().take(32).collect::<Vec<_>>())
            .finish()
    }
}

impl BitAnd for &BitVector {
    type Output = BitVector;

    fn bitand(self, rhs: &BitVector) -> BitVector {
        self.and(rhs)
    }
}

impl BitOr for &BitVector {
    type Output = BitVector;

    fn bitor(self, rhs: &BitVector) -> BitVector {
        self.or(rhs)
    }
}

impl FromIterator<usize> for BitVector {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}
