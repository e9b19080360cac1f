//! Fixed-width bit vectors indexed by definition number.
//!
//! Every reaching-definitions annotation (IN, OUT, KILL) is a [`BitVector`] whose width is the
//! number of definitions `N` enumerated by the catalog of the current run. Vectors of different
//! widths never meet: combining them is a programming error and panics, the same way an
//! out-of-range index does.
//!
//! # Example
//!
//! ```rust
//! use hlsflow::utils::BitVector;
//!
//! let mut reaching = BitVector::new(8);
//! reaching.mark(1);
//! reaching.mark(5);
//!
//! let mut killed = BitVector::new(8);
//! killed.mark(5);
//!
//! reaching.subtract(&killed);
//! assert_eq!(reaching.iter().collect::<Vec<_>>(), vec![1]);
//! ```

use std::fmt;

const WORD_BITS: usize = 64;

/// A fixed-length boolean array stored as packed 64-bit words.
///
/// The width is fixed at construction. Bits past the width are kept clear so that equality,
/// hashing and [`BitVector::count`] only ever see meaningful positions.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitVector {
    words: Vec<u64>,
    width: usize,
}

impl BitVector {
    /// Creates an all-clear vector of the given width.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            words: vec![0; width.div_ceil(WORD_BITS)],
            width,
        }
    }

    /// Creates a vector of the given width with exactly the listed positions marked.
    ///
    /// # Panics
    ///
    /// Panics if any index is `>= width`.
    #[must_use]
    pub fn from_indices<I>(width: usize, indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut vector = Self::new(width);
        for index in indices {
            vector.mark(index);
        }
        vector
    }

    /// Returns the width of this vector.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.width
    }

    /// Returns `true` if no position is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Marks the position at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn mark(&mut self, index: usize) {
        assert!(index < self.width, "bit index {index} out of bounds");
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Clears the position at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn unmark(&mut self, index: usize) {
        assert!(index < self.width, "bit index {index} out of bounds");
        self.words[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
    }

    /// Returns `true` if the position at `index` is marked.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn is_marked(&self, index: usize) -> bool {
        assert!(index < self.width, "bit index {index} out of bounds");
        (self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS))) != 0
    }

    /// Returns the number of marked positions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Clears every position.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Unions `other` into `self`.
    ///
    /// Returns `true` if `self` changed.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn merge(&mut self, other: &Self) -> bool {
        self.combine(other, |a, b| a | b)
    }

    /// Intersects `self` with `other`.
    ///
    /// Returns `true` if `self` changed.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn intersect(&mut self, other: &Self) -> bool {
        self.combine(other, |a, b| a & b)
    }

    /// Clears from `self` every position marked in `other`.
    ///
    /// Returns `true` if `self` changed.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn subtract(&mut self, other: &Self) -> bool {
        self.combine(other, |a, b| a & !b)
    }

    /// Overwrites `self` with the contents of `other`.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(self.width, other.width, "bit vector widths differ");
        self.words.copy_from_slice(&other.words);
    }

    /// Returns an iterator over the marked positions in ascending order.
    pub fn iter(&self) -> Marked<'_> {
        Marked {
            words: &self.words,
            word: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    fn combine(&mut self, other: &Self, op: impl Fn(u64, u64) -> u64) -> bool {
        assert_eq!(self.width, other.width, "bit vector widths differ");
        let mut changed = false;
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            let next = op(*a, b);
            changed |= next != *a;
            *a = next;
        }
        changed
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Renders the vector as a string of `0`/`1` characters, position 0 first.
impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.width {
            f.write_str(if self.is_marked(index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a BitVector {
    type Item = usize;
    type IntoIter = Marked<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the marked positions of a [`BitVector`].
pub struct Marked<'a> {
    words: &'a [u64],
    word: usize,
    current: u64,
}

impl Iterator for Marked<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word * WORD_BITS + bit);
            }
            self.word += 1;
            self.current = *self.words.get(self.word)?;
        }
    }
}
