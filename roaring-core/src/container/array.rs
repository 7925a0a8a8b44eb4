use std::cmp::Ordering;

use super::{BitmapContainer, RunContainer};

/// A sorted, duplicate-free list of values
///
/// Cardinality is the length of the list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArrayContainer {
    values: Vec<u16>,
}

impl ArrayContainer {
    #[inline]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Wrap values that are already sorted and distinct
    #[inline]
    pub(crate) fn from_sorted_vec(values: Vec<u16>) -> Self {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        Self { values }
    }

    #[inline]
    pub fn cardinality(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[u16] {
        &self.values
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    /// Insert `value`, returning whether it was absent
    #[inline]
    pub fn add(&mut self, value: u16) -> bool {
        match self.values.binary_search(&value) {
            Ok(_) => false,
            Err(index) => {
                self.values.insert(index, value);
                true
            }
        }
    }

    /// Remove `value`, returning whether it was present
    #[inline]
    pub fn remove(&mut self, value: u16) -> bool {
        match self.values.binary_search(&value) {
            Ok(index) => {
                self.values.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Insert every value of `start..=end`
    pub fn add_range(&mut self, start: u16, end: u16) {
        let lo = self.values.partition_point(|&v| v < start);
        let hi = self.values.partition_point(|&v| v <= end);
        self.values.splice(lo..hi, start..=end);
    }

    /// Remove every value of `start..=end`
    pub fn remove_range(&mut self, start: u16, end: u16) {
        let lo = self.values.partition_point(|&v| v < start);
        let hi = self.values.partition_point(|&v| v <= end);
        self.values.drain(lo..hi);
    }

    pub fn contains_range(&self, start: u16, end: u16) -> bool {
        let lo = self.values.partition_point(|&v| v < start);
        let hi = self.values.partition_point(|&v| v <= end);
        hi - lo == usize::from(end - start) + 1
    }

    #[inline]
    pub fn retain(&mut self, f: impl FnMut(&u16) -> bool) {
        self.values.retain(f);
    }

    #[inline]
    pub fn minimum(&self) -> Option<u16> {
        self.values.first().copied()
    }

    #[inline]
    pub fn maximum(&self) -> Option<u16> {
        self.values.last().copied()
    }

    /// Number of values `<= value`
    #[inline]
    pub fn rank(&self, value: u16) -> usize {
        self.values.partition_point(|&v| v <= value)
    }

    #[inline]
    pub fn select(&self, n: usize) -> Option<u16> {
        self.values.get(n).copied()
    }

    /// Number of maximal runs of consecutive values
    pub fn number_of_runs(&self) -> usize {
        match self.values.first() {
            None => 0,
            Some(_) => {
                1 + self
                    .values
                    .windows(2)
                    .filter(|w| w[1] != w[0] + 1)
                    .count()
            }
        }
    }

    /// Values for which `keep` returns true
    #[inline]
    pub(crate) fn filter(&self, mut keep: impl FnMut(u16) -> bool) -> Self {
        Self {
            values: self.values.iter().copied().filter(|&v| keep(v)).collect(),
        }
    }

    pub fn intersect(&self, other: &Self) -> Self {
        let (small, large) = if self.values.len() <= other.values.len() {
            (&self.values, &other.values)
        } else {
            (&other.values, &self.values)
        };

        // Very skewed sizes are cheaper to probe than to merge
        if small.len() * 64 < large.len() {
            return Self {
                values: small
                    .iter()
                    .copied()
                    .filter(|v| large.binary_search(v).is_ok())
                    .collect(),
            };
        }

        let mut values = Vec::with_capacity(small.len());
        let (mut i, mut j) = (0, 0);
        while i < small.len() && j < large.len() {
            match small[i].cmp(&large[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    values.push(small[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        Self { values }
    }

    pub fn intersection_len(&self, other: &Self) -> usize {
        let (mut i, mut j, mut count) = (0, 0, 0);
        while i < self.values.len() && j < other.values.len() {
            match self.values[i].cmp(&other.values[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    count += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        count
    }

    /// Sorted union, which may be longer than an array container is allowed to be
    pub fn union(&self, other: &Self) -> Self {
        let (a, b) = (&self.values, &other.values);
        let mut values = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    values.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    values.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    values.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        values.extend_from_slice(&a[i..]);
        values.extend_from_slice(&b[j..]);
        Self { values }
    }

    pub fn difference(&self, other: &Self) -> Self {
        let (a, b) = (&self.values, &other.values);
        let mut values = Vec::with_capacity(a.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    values.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        values.extend_from_slice(&a[i..]);
        Self { values }
    }

    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let (a, b) = (&self.values, &other.values);
        let mut values = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    values.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    values.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        values.extend_from_slice(&a[i..]);
        values.extend_from_slice(&b[j..]);
        Self { values }
    }

    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.values.shrink_to_fit();
    }
}

impl From<&BitmapContainer> for ArrayContainer {
    fn from(bitmap: &BitmapContainer) -> Self {
        let mut values = Vec::with_capacity(bitmap.cardinality());
        values.extend(bitmap.iter());
        Self { values }
    }
}

impl From<&RunContainer> for ArrayContainer {
    fn from(runs: &RunContainer) -> Self {
        let mut values = Vec::with_capacity(runs.cardinality());
        for run in runs.runs() {
            values.extend(run.value..=run.end());
        }
        Self { values }
    }
}

impl FromIterator<u16> for ArrayContainer {
    /// Collect arbitrary values, sorting and removing duplicates
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let mut values: Vec<u16> = iter.into_iter().collect();
        values.sort_unstable();
        values.dedup();
        Self { values }
    }
}
