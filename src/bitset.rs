//! Compact variable sets for the solver's adjacency rows.
//!
//! Each row of the `==` / `!=` graphs is a [`VarSet`]: one bit per declared variable,
//! packed into `u64` words. Cloning a row is a single `Vec` copy, which keeps the
//! per-branch state copies of the backtracking search cheap.

use crate::types::VarId;

/// A set of [`VarId`]s backed by a vector of u64 words.
///
/// The set grows automatically when inserting indices beyond its current capacity.
#[derive(Debug, Clone, Default)]
pub struct VarSet {
    /// Storage: each u64 holds 64 bits
    words: Vec<u64>,
    /// Number of set bits (cached for O(1) len())
    count: usize,
}

impl VarSet {
    /// Number of bits per word.
    const BITS_PER_WORD: usize = 64;

    /// Creates a new empty set able to hold `capacity` variables without growing.
    pub fn new(capacity: usize) -> Self {
        let num_words = capacity.div_ceil(Self::BITS_PER_WORD);
        Self {
            words: vec![0; num_words],
            count: 0,
        }
    }

    /// Returns the number of variables in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    fn word_and_bit(var: VarId) -> (usize, usize) {
        let index = var.index();
        (index / Self::BITS_PER_WORD, index % Self::BITS_PER_WORD)
    }

    #[inline]
    pub fn contains(&self, var: VarId) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(var);
        match self.words.get(word_idx) {
            Some(word) => word & (1u64 << bit_idx) != 0,
            None => false,
        }
    }

    /// Adds the variable. Returns true if it was not present before.
    #[inline]
    pub fn insert(&mut self, var: VarId) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(var);

        if word_idx >= self.words.len() {
            self.words.resize(word_idx + 1, 0);
        }

        let mask = 1u64 << bit_idx;
        let was_clear = self.words[word_idx] & mask == 0;
        if was_clear {
            self.words[word_idx] |= mask;
            self.count += 1;
        }
        was_clear
    }

    /// Removes the variable. Returns true if it was present before.
    #[inline]
    pub fn remove(&mut self, var: VarId) -> bool {
        let (word_idx, bit_idx) = Self::word_and_bit(var);

        if word_idx >= self.words.len() {
            return false;
        }

        let mask = 1u64 << bit_idx;
        let was_set = self.words[word_idx] & mask != 0;
        if was_set {
            self.words[word_idx] &= !mask;
            self.count -= 1;
        }
        was_set
    }

    /// Adds every variable of `other`.
    pub fn union_with(&mut self, other: &VarSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (word, &rhs) in self.words.iter_mut().zip(&other.words) {
            *word |= rhs;
        }
        self.recount();
    }

    fn recount(&mut self) {
        self.count = self.words.iter().map(|w| w.count_ones() as usize).sum();
    }

    /// Returns an iterator over the variables in ascending index order.
    pub fn iter(&self) -> VarSetIter<'_> {
        VarSetIter {
            set: self,
            word_idx: 0,
            current_word: self.words.first().copied().unwrap_or(0),
        }
    }
}

impl PartialEq for VarSet {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.iter().eq(other.iter())
    }
}

impl Eq for VarSet {}

impl Extend<VarId> for VarSet {
    fn extend<I: IntoIterator<Item = VarId>>(&mut self, iter: I) {
        for var in iter {
            self.insert(var);
        }
    }
}

impl FromIterator<VarId> for VarSet {
    fn from_iter<I: IntoIterator<Item = VarId>>(iter: I) -> Self {
        let mut set = VarSet::default();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a VarSet {
    type Item = VarId;
    type IntoIter = VarSetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the variables of a [`VarSet`].
#[derive(Debug)]
pub struct VarSetIter<'a> {
    set: &'a VarSet,
    word_idx: usize,
    current_word: u64,
}

impl Iterator for VarSetIter<'_> {
    type Item = VarId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let bit_idx = self.current_word.trailing_zeros() as usize;
                self.current_word &= self.current_word - 1; // Clear lowest set bit
                return Some(VarId::new(self.word_idx * VarSet::BITS_PER_WORD + bit_idx));
            }

            self.word_idx += 1;
            if self.word_idx >= self.set.words.len() {
                return None;
            }
            self.current_word = self.set.words[self.word_idx];
        }
    }
}
