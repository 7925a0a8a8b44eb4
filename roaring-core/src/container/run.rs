use super::{ArrayContainer, BitmapContainer};

/// One interval of consecutive values: `value..=value + length`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rle16 {
    pub value: u16,
    pub length: u16,
}

impl Rle16 {
    #[inline]
    pub const fn new(value: u16, length: u16) -> Self {
        Rle16 { value, length }
    }

    /// The last value in the run
    #[inline]
    pub const fn end(&self) -> u16 {
        self.value + self.length
    }

    #[inline]
    pub const fn cardinality(&self) -> usize {
        self.length as usize + 1
    }

    #[inline]
    fn end_exclusive(&self) -> u32 {
        self.value as u32 + self.length as u32 + 1
    }
}

/// Sorted, non-overlapping, non-adjacent runs with a cached cardinality
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunContainer {
    runs: Vec<Rle16>,
    cardinality: usize,
}

impl RunContainer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single run covering `start..=end`
    #[inline]
    pub fn from_range(start: u16, end: u16) -> Self {
        let run = Rle16::new(start, end - start);
        Self {
            runs: vec![run],
            cardinality: run.cardinality(),
        }
    }

    #[inline]
    pub fn runs(&self) -> &[Rle16] {
        &self.runs
    }

    #[inline]
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.cardinality == 1 << 16
    }

    #[inline]
    pub fn number_of_runs(&self) -> usize {
        self.runs.len()
    }

    /// Append `start..=end` after every existing run, coalescing when adjacent
    pub(crate) fn push_run(&mut self, start: u32, end: u32) {
        debug_assert!(start <= end && end <= u32::from(u16::MAX));
        self.cardinality += (end - start + 1) as usize;
        if let Some(last) = self.runs.last_mut() {
            debug_assert!(u32::from(last.end()) < start);
            if last.end_exclusive() == start {
                last.length = (end - u32::from(last.value)) as u16;
                return;
            }
        }
        self.runs.push(Rle16::new(start as u16, (end - start) as u16));
    }

    /// Index of the run containing `value`, or the insertion point as `Err`
    fn find(&self, value: u16) -> Result<usize, usize> {
        let index = self.runs.partition_point(|r| r.value <= value);
        match index.checked_sub(1) {
            Some(i) if self.runs[i].end() >= value => Ok(i),
            _ => Err(index),
        }
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        self.find(value).is_ok()
    }

    pub fn add(&mut self, value: u16) -> bool {
        let index = match self.find(value) {
            Ok(_) => return false,
            Err(index) => index,
        };
        self.cardinality += 1;

        let joins_prev = index > 0 && u32::from(self.runs[index - 1].end()) + 1 == u32::from(value);
        let joins_next = index < self.runs.len() && u32::from(self.runs[index].value) == u32::from(value) + 1;
        match (joins_prev, joins_next) {
            (true, true) => {
                let next = self.runs.remove(index);
                let prev = &mut self.runs[index - 1];
                prev.length = next.end() - prev.value;
            }
            (true, false) => self.runs[index - 1].length += 1,
            (false, true) => {
                let run = &mut self.runs[index];
                run.value = value;
                run.length += 1;
            }
            (false, false) => self.runs.insert(index, Rle16::new(value, 0)),
        }
        true
    }

    pub fn remove(&mut self, value: u16) -> bool {
        let index = match self.find(value) {
            Ok(index) => index,
            Err(_) => return false,
        };
        self.cardinality -= 1;

        let run = self.runs[index];
        if run.length == 0 {
            self.runs.remove(index);
        } else if value == run.value {
            self.runs[index] = Rle16::new(value + 1, run.length - 1);
        } else if value == run.end() {
            self.runs[index].length -= 1;
        } else {
            self.runs[index].length = value - run.value - 1;
            self.runs
                .insert(index + 1, Rle16::new(value + 1, run.end() - value - 1));
        }
        true
    }

    /// Insert every value of `start..=end`
    pub fn add_range(&mut self, start: u16, end: u16) {
        let (start32, end32) = (u32::from(start), u32::from(end));
        // Runs touching or overlapping the range are absorbed into it
        let lo = self.runs.partition_point(|r| r.end_exclusive() < start32);
        let hi = self.runs.partition_point(|r| u32::from(r.value) <= end32 + 1);

        let mut merged_start = start;
        let mut merged_end = end;
        let mut absorbed = 0;
        for run in &self.runs[lo..hi] {
            merged_start = merged_start.min(run.value);
            merged_end = merged_end.max(run.end());
            absorbed += run.cardinality();
        }
        let merged = Rle16::new(merged_start, merged_end - merged_start);
        self.cardinality = self.cardinality - absorbed + merged.cardinality();
        self.runs.splice(lo..hi, [merged]);
    }

    /// Remove every value of `start..=end`
    pub fn remove_range(&mut self, start: u16, end: u16) {
        let lo = self.runs.partition_point(|r| r.end() < start);
        let hi = self.runs.partition_point(|r| r.value <= end);
        if lo >= hi {
            return;
        }

        let mut pieces = Vec::with_capacity(2);
        let first = self.runs[lo];
        let last = self.runs[hi - 1];
        if first.value < start {
            pieces.push(Rle16::new(first.value, start - 1 - first.value));
        }
        if last.end() > end {
            pieces.push(Rle16::new(end + 1, last.end() - end - 1));
        }

        let removed: usize = self.runs[lo..hi].iter().map(Rle16::cardinality).sum();
        let kept: usize = pieces.iter().map(Rle16::cardinality).sum();
        self.cardinality = self.cardinality - removed + kept;
        self.runs.splice(lo..hi, pieces);
    }

    pub fn contains_range(&self, start: u16, end: u16) -> bool {
        match self.find(start) {
            Ok(index) => self.runs[index].end() >= end,
            Err(_) => false,
        }
    }

    #[inline]
    pub fn minimum(&self) -> Option<u16> {
        self.runs.first().map(|r| r.value)
    }

    #[inline]
    pub fn maximum(&self) -> Option<u16> {
        self.runs.last().map(Rle16::end)
    }

    /// Number of values `<= value`
    pub fn rank(&self, value: u16) -> usize {
        let mut rank = 0;
        for run in &self.runs {
            if value < run.value {
                break;
            }
            if value <= run.end() {
                return rank + usize::from(value - run.value) + 1;
            }
            rank += run.cardinality();
        }
        rank
    }

    pub fn select(&self, n: usize) -> Option<u16> {
        let mut remaining = n;
        for run in &self.runs {
            if remaining < run.cardinality() {
                return Some(run.value + remaining as u16);
            }
            remaining -= run.cardinality();
        }
        None
    }

    /// Sweep the boundaries of two run lists, keeping the stretches where `keep` holds
    ///
    /// `keep(false, false)` must be false.
    pub fn combine(&self, other: &Self, keep: impl Fn(bool, bool) -> bool) -> Self {
        debug_assert!(!keep(false, false));
        fn boundaries(runs: &[Rle16]) -> impl Iterator<Item = u32> + '_ {
            runs.iter()
                .flat_map(|r| [u32::from(r.value), r.end_exclusive()])
        }

        let mut a = boundaries(&self.runs).peekable();
        let mut b = boundaries(&other.runs).peekable();
        let (mut in_a, mut in_b) = (false, false);
        let mut open = None;
        let mut result = Self::new();
        loop {
            let next = match (a.peek(), b.peek()) {
                (None, None) => break,
                (Some(&x), None) => x,
                (None, Some(&y)) => y,
                (Some(&x), Some(&y)) => x.min(y),
            };
            if a.next_if_eq(&next).is_some() {
                in_a = !in_a;
            }
            if b.next_if_eq(&next).is_some() {
                in_b = !in_b;
            }
            match (open, keep(in_a, in_b)) {
                (None, true) => open = Some(next),
                (Some(start), false) => {
                    result.push_run(start, next - 1);
                    open = None;
                }
                _ => {}
            }
        }
        result
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.cardinality <= other.cardinality
            && self
                .runs
                .iter()
                .all(|run| other.contains_range(run.value, run.end()))
    }

    #[inline]
    pub fn iter(&self) -> super::ContainerIter<'_> {
        super::ContainerIter::run(self, 0)
    }
}

impl From<&ArrayContainer> for RunContainer {
    fn from(array: &ArrayContainer) -> Self {
        let mut runs = Self::new();
        for &value in array.values() {
            runs.push_run(u32::from(value), u32::from(value));
        }
        runs
    }
}

impl From<&BitmapContainer> for RunContainer {
    fn from(bitmap: &BitmapContainer) -> Self {
        let words = bitmap.words();
        let mut runs = Self::new();
        let mut index = 0;
        let mut word = words[0];
        loop {
            while word == 0 && index + 1 < words.len() {
                index += 1;
                word = words[index];
            }
            if word == 0 {
                break;
            }
            let start = (index * 64) as u32 + word.trailing_zeros();
            // Fill in the zeros below the run so the run's end is the first zero
            let mut filled = word | (word - 1);
            while filled == u64::MAX && index + 1 < words.len() {
                index += 1;
                filled = words[index];
            }
            if filled == u64::MAX {
                runs.push_run(start, u32::from(u16::MAX));
                break;
            }
            let end = (index * 64) as u32 + (!filled).trailing_zeros();
            runs.push_run(start, end - 1);
            word = filled & (filled + 1);
        }
        runs
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn runs(container: &RunContainer) -> Vec<(u16, u16)> {
        container.runs().iter().map(|r| (r.value, r.end())).collect()
    }

    #[test]
    fn add_merges_neighbours() {
        let mut container = RunContainer::new();
        assert!(container.add(5));
        assert!(container.add(7));
        assert_eq!(runs(&container), [(5, 5), (7, 7)]);
        assert!(container.add(6));
        assert_eq!(runs(&container), [(5, 7)]);
        assert!(container.add(4));
        assert!(container.add(8));
        assert!(!container.add(6));
        assert_eq!(runs(&container), [(4, 8)]);
        assert_eq!(container.cardinality(), 5);
    }

    #[test]
    fn remove_splits() {
        let mut container = RunContainer::from_range(10, 20);
        assert!(container.remove(15));
        assert_eq!(runs(&container), [(10, 14), (16, 20)]);
        assert!(container.remove(10));
        assert!(container.remove(20));
        assert!(!container.remove(20));
        assert_eq!(runs(&container), [(11, 14), (16, 19)]);
        assert_eq!(container.cardinality(), 8);
    }

    #[test]
    fn ranges() {
        let mut container = RunContainer::new();
        container.add_range(10, 20);
        container.add_range(30, 40);
        container.add_range(21, 29);
        assert_eq!(runs(&container), [(10, 40)]);
        assert_eq!(container.cardinality(), 31);
        assert!(container.contains_range(12, 40));

        container.remove_range(15, 35);
        assert_eq!(runs(&container), [(10, 14), (36, 40)]);
        assert_eq!(container.cardinality(), 10);
        assert!(!container.contains_range(12, 40));

        container.remove_range(0, u16::MAX);
        assert!(container.is_empty());
        assert_eq!(container.cardinality(), 0);
    }

    #[test]
    fn full_range_edges() {
        let mut container = RunContainer::from_range(0, u16::MAX);
        assert!(container.is_full());
        assert_eq!(container.rank(u16::MAX), 65536);
        assert!(container.remove(u16::MAX));
        assert!(container.add(u16::MAX));
        assert!(container.is_full());
        assert_eq!(container.number_of_runs(), 1);
    }

    #[test]
    fn combine_sweeps() {
        let mut a = RunContainer::new();
        a.add_range(0, 9);
        a.add_range(20, 29);
        let b = RunContainer::from_range(5, 24);

        assert_eq!(runs(&a.combine(&b, |x, y| x && y)), [(5, 9), (20, 24)]);
        assert_eq!(runs(&a.combine(&b, |x, y| x || y)), [(0, 29)]);
        assert_eq!(runs(&a.combine(&b, |x, y| x != y)), [(0, 4), (10, 19), (25, 29)]);
        assert_eq!(runs(&a.combine(&b, |x, y| x && !y)), [(0, 4), (25, 29)]);
    }

    #[test]
    fn from_bitmap() {
        let mut bitmap = BitmapContainer::new();
        bitmap.set_range(3, 70);
        bitmap.set_range(128, 191);
        bitmap.set_range(65000, u16::MAX);
        let container = RunContainer::from(&bitmap);
        assert_eq!(runs(&container), [(3, 70), (128, 191), (65000, u16::MAX)]);
        assert_eq!(container.cardinality(), bitmap.cardinality());
    }

    #[test]
    fn rank_select() {
        let mut container = RunContainer::from_range(10, 12);
        container.add_range(100, 101);
        assert_eq!(container.rank(9), 0);
        assert_eq!(container.rank(11), 2);
        assert_eq!(container.rank(50), 3);
        assert_eq!(container.rank(101), 5);
        assert_eq!(container.select(3), Some(100));
        assert_eq!(container.select(5), None);
    }
}
