use super::{ArrayContainer, RunContainer};

pub const BITMAP_WORDS: usize = 1024;

/// A fixed 2^16-bit set with a cached population count
#[derive(Clone, PartialEq, Eq)]
pub struct BitmapContainer {
    words: Box<[u64; BITMAP_WORDS]>,
    cardinality: usize,
}

impl std::fmt::Debug for BitmapContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapContainer")
            .field("cardinality", &self.cardinality)
            .finish_non_exhaustive()
    }
}

impl Default for BitmapContainer {
    fn default() -> Self {
        Self::new()
    }
}

/// Mask selecting bits `lo..=hi` of a word
#[inline]
fn word_mask(lo: u32, hi: u32) -> u64 {
    (u64::MAX << lo) & (u64::MAX >> (63 - hi))
}

impl BitmapContainer {
    #[inline]
    pub fn new() -> Self {
        Self {
            words: Box::new([0; BITMAP_WORDS]),
            cardinality: 0,
        }
    }

    /// Build from raw words, recounting the population
    pub fn from_words(words: Box<[u64; BITMAP_WORDS]>) -> Self {
        let cardinality = words.iter().map(|w| w.count_ones() as usize).sum();
        Self { words, cardinality }
    }

    #[inline]
    pub fn words(&self) -> &[u64; BITMAP_WORDS] {
        &self.words
    }

    #[inline]
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        let value = usize::from(value);
        self.words[value / 64] & (1 << (value % 64)) != 0
    }

    #[inline]
    pub fn add(&mut self, value: u16) -> bool {
        let value = usize::from(value);
        let word = &mut self.words[value / 64];
        let before = *word;
        *word |= 1 << (value % 64);
        let added = *word != before;
        self.cardinality += usize::from(added);
        added
    }

    #[inline]
    pub fn remove(&mut self, value: u16) -> bool {
        let value = usize::from(value);
        let word = &mut self.words[value / 64];
        let before = *word;
        *word &= !(1 << (value % 64));
        let removed = *word != before;
        self.cardinality -= usize::from(removed);
        removed
    }

    #[inline]
    pub fn flip(&mut self, value: u16) {
        if !self.remove(value) {
            self.add(value);
        }
    }

    fn apply_range(&mut self, start: u16, end: u16, op: impl Fn(u64, u64) -> u64) {
        let (start, end) = (u32::from(start), u32::from(end));
        let (first, last) = (start / 64, end / 64);
        for i in first..=last {
            let lo = if i == first { start % 64 } else { 0 };
            let hi = if i == last { end % 64 } else { 63 };
            let word = &mut self.words[i as usize];
            let old = *word;
            *word = op(old, word_mask(lo, hi));
            self.cardinality = self.cardinality + word.count_ones() as usize
                - old.count_ones() as usize;
        }
    }

    /// Set every bit of `start..=end`
    pub fn set_range(&mut self, start: u16, end: u16) {
        self.apply_range(start, end, |word, mask| word | mask);
    }

    /// Clear every bit of `start..=end`
    pub fn clear_range(&mut self, start: u16, end: u16) {
        self.apply_range(start, end, |word, mask| word & !mask);
    }

    /// Toggle every bit of `start..=end`
    pub fn flip_range(&mut self, start: u16, end: u16) {
        self.apply_range(start, end, |word, mask| word ^ mask);
    }

    pub fn contains_range(&self, start: u16, end: u16) -> bool {
        let (start, end) = (u32::from(start), u32::from(end));
        let (first, last) = (start / 64, end / 64);
        (first..=last).all(|i| {
            let lo = if i == first { start % 64 } else { 0 };
            let hi = if i == last { end % 64 } else { 63 };
            let mask = word_mask(lo, hi);
            self.words[i as usize] & mask == mask
        })
    }

    pub fn minimum(&self) -> Option<u16> {
        self.words
            .iter()
            .position(|&w| w != 0)
            .map(|i| (i * 64 + self.words[i].trailing_zeros() as usize) as u16)
    }

    pub fn maximum(&self) -> Option<u16> {
        self.words
            .iter()
            .rposition(|&w| w != 0)
            .map(|i| (i * 64 + 63 - self.words[i].leading_zeros() as usize) as u16)
    }

    /// Number of values `<= value`
    pub fn rank(&self, value: u16) -> usize {
        let value = usize::from(value);
        let (index, bit) = (value / 64, value % 64);
        let before: usize = self.words[..index]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();
        before + (self.words[index] & (u64::MAX >> (63 - bit))).count_ones() as usize
    }

    pub fn select(&self, n: usize) -> Option<u16> {
        if n >= self.cardinality {
            return None;
        }
        let mut remaining = n;
        for (i, &word) in self.words.iter().enumerate() {
            let ones = word.count_ones() as usize;
            if remaining < ones {
                let mut word = word;
                for _ in 0..remaining {
                    word &= word - 1;
                }
                return Some((i * 64 + word.trailing_zeros() as usize) as u16);
            }
            remaining -= ones;
        }
        None
    }

    /// Number of maximal runs of set bits
    pub fn number_of_runs(&self) -> usize {
        let mut carry = 0;
        let mut runs = 0;
        for &word in self.words.iter() {
            // A run starts at every set bit whose lower neighbour is clear
            runs += (word & !((word << 1) | carry)).count_ones() as usize;
            carry = word >> 63;
        }
        runs
    }

    fn combine(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        let mut words = Box::new([0u64; BITMAP_WORDS]);
        let mut cardinality = 0;
        for ((out, &a), &b) in words.iter_mut().zip(self.words.iter()).zip(other.words.iter()) {
            *out = op(a, b);
            cardinality += out.count_ones() as usize;
        }
        Self { words, cardinality }
    }

    fn combine_inplace(&mut self, other: &Self, op: impl Fn(u64, u64) -> u64) {
        let mut cardinality = 0;
        for (word, &b) in self.words.iter_mut().zip(other.words.iter()) {
            *word = op(*word, b);
            cardinality += word.count_ones() as usize;
        }
        self.cardinality = cardinality;
    }

    pub fn and(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a & b)
    }

    pub fn or(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a ^ b)
    }

    pub fn andnot(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a & !b)
    }

    pub fn and_inplace(&mut self, other: &Self) {
        self.combine_inplace(other, |a, b| a & b);
    }

    pub fn or_inplace(&mut self, other: &Self) {
        self.combine_inplace(other, |a, b| a | b);
    }

    pub fn xor_inplace(&mut self, other: &Self) {
        self.combine_inplace(other, |a, b| a ^ b);
    }

    pub fn andnot_inplace(&mut self, other: &Self) {
        self.combine_inplace(other, |a, b| a & !b);
    }

    pub fn intersection_len(&self, other: &Self) -> usize {
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.cardinality <= other.cardinality
            && self
                .words
                .iter()
                .zip(other.words.iter())
                .all(|(a, b)| a & !b == 0)
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    #[inline]
    pub fn iter(&self) -> super::ContainerIter<'_> {
        super::ContainerIter::bitmap(self, 0)
    }
}

impl From<&ArrayContainer> for BitmapContainer {
    fn from(array: &ArrayContainer) -> Self {
        let mut bitmap = Self::new();
        for &value in array.values() {
            let value = usize::from(value);
            bitmap.words[value / 64] |= 1 << (value % 64);
        }
        bitmap.cardinality = array.cardinality();
        bitmap
    }
}

impl From<&RunContainer> for BitmapContainer {
    fn from(runs: &RunContainer) -> Self {
        let mut bitmap = Self::new();
        for run in runs.runs() {
            bitmap.set_range(run.value, run.end());
        }
        bitmap
    }
}
