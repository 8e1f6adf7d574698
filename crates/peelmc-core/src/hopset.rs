//! Fixed-capacity bit-vector over universe indices.
//!
//! Index `i` lives at bit `i % 64` of word `i / 64`. Bits at or above the
//! capacity are always zero, so word-wise popcounts never over-count.

use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HopSet {
    words: Vec<u64>,
    capacity: usize,
}

impl HopSet {
    /// Empty set able to hold indices `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64)],
            capacity,
        }
    }

    /// Set containing every index `0..capacity`.
    pub fn full(capacity: usize) -> Self {
        let mut set = Self {
            words: vec![u64::MAX; capacity.div_ceil(64)],
            capacity,
        };
        set.mask_tail();
        set
    }

    pub fn from_hops<I>(capacity: usize, hops: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut set = Self::new(capacity);
        for hop in hops {
            if hop >= capacity {
                return Err(Error::HopOutOfRange { hop, capacity });
            }
            set.insert(hop);
        }
        Ok(set)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Adds `hop`, returning whether it was newly inserted.
    ///
    /// # Panics
    /// Panics if `hop >= capacity`.
    pub fn insert(&mut self, hop: usize) -> bool {
        assert!(hop < self.capacity, "hop {hop} outside capacity {}", self.capacity);
        let (word, bit) = (hop / 64, 1u64 << (hop % 64));
        let fresh = self.words[word] & bit == 0;
        self.words[word] |= bit;
        fresh
    }

    /// Removes `hop`, returning whether it was present.
    pub fn remove(&mut self, hop: usize) -> bool {
        if hop >= self.capacity {
            return false;
        }
        let (word, bit) = (hop / 64, 1u64 << (hop % 64));
        let present = self.words[word] & bit != 0;
        self.words[word] &= !bit;
        present
    }

    pub fn contains(&self, hop: usize) -> bool {
        hop < self.capacity && self.words[hop / 64] & (1u64 << (hop % 64)) != 0
    }

    /// Popcount.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Resets to the full set without reallocating.
    pub fn fill(&mut self) {
        self.words.fill(u64::MAX);
        self.mask_tail();
    }

    /// `popcount(self & other)` without materializing the intersection.
    pub fn intersection_count(&self, other: &HopSet) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    pub fn intersection(&self, other: &HopSet) -> HopSet {
        let words = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| a & b)
            .collect();
        HopSet {
            words,
            capacity: self.capacity.min(other.capacity),
        }
    }

    /// Lowest index present in both sets.
    pub fn first_common(&self, other: &HopSet) -> Option<usize> {
        self.words
            .iter()
            .zip(&other.words)
            .enumerate()
            .find_map(|(i, (a, b))| {
                let w = a & b;
                (w != 0).then(|| i * 64 + w.trailing_zeros() as usize)
            })
    }

    /// `self &= !other`.
    pub fn difference_with(&mut self, other: &HopSet) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !b;
        }
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> Ones<'_> {
        Ones {
            words: &self.words,
            index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    fn mask_tail(&mut self) {
        let rem = self.capacity % 64;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }
}

impl<'a> IntoIterator for &'a HopSet {
    type Item = usize;
    type IntoIter = Ones<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over set indices, lowest first.
pub struct Ones<'a> {
    words: &'a [u64],
    index: usize,
    current: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.index += 1;
            self.current = *self.words.get(self.index)?;
        }
        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some(self.index * 64 + bit)
    }
}
