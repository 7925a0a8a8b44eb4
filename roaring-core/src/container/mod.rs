//! The three 16-bit container representations and the operations between them.
//!
//! A [`Container`] stores the low 16 bits of every value that shares a 16-bit key within
//! a [`Bitmap`](crate::Bitmap). Outside of a run-optimized container, the representation
//! is fully determined by the cardinality: at most [`ARRAY_MAX_CARDINALITY`] values are
//! stored as a sorted array, anything larger as a 2^16-bit bitmap.

use std::mem;

mod array;
mod bitmap;
mod codec;
mod iter;
mod ops;
mod run;

pub use self::array::ArrayContainer;
pub use self::bitmap::{BitmapContainer, BITMAP_WORDS};
pub use self::iter::ContainerIter;
pub use self::run::{Rle16, RunContainer};

/// Largest cardinality an array container may hold
pub const ARRAY_MAX_CARDINALITY: usize = 4096;

/// Serialized size of a bitmap container body
pub const BITMAP_SIZE_IN_BYTES: usize = BITMAP_WORDS * 8;

/// Which representation a [`Container`] currently uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Array,
    Bitmap,
    Run,
}

#[derive(Clone, Debug)]
pub enum Container {
    Array(ArrayContainer),
    Bitmap(BitmapContainer),
    Run(RunContainer),
}

impl Default for Container {
    fn default() -> Self {
        Container::new()
    }
}

impl Container {
    /// An empty array container
    #[inline]
    pub fn new() -> Self {
        Container::Array(ArrayContainer::new())
    }

    /// A container holding exactly `start..=end`, in its smallest representation
    pub fn from_range(start: u16, end: u16) -> Self {
        Container::Run(RunContainer::from_range(start, end)).into_efficient()
    }

    #[inline]
    pub fn kind(&self) -> ContainerKind {
        match self {
            Container::Array(_) => ContainerKind::Array,
            Container::Bitmap(_) => ContainerKind::Bitmap,
            Container::Run(_) => ContainerKind::Run,
        }
    }

    #[inline]
    pub fn cardinality(&self) -> usize {
        match self {
            Container::Array(c) => c.cardinality(),
            Container::Bitmap(c) => c.cardinality(),
            Container::Run(c) => c.cardinality(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cardinality() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.cardinality() == 1 << 16
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        match self {
            Container::Array(c) => c.contains(value),
            Container::Bitmap(c) => c.contains(value),
            Container::Run(c) => c.contains(value),
        }
    }

    /// Whether every value of `start..=end` is present
    pub fn contains_range(&self, start: u16, end: u16) -> bool {
        match self {
            Container::Array(c) => c.contains_range(start, end),
            Container::Bitmap(c) => c.contains_range(start, end),
            Container::Run(c) => c.contains_range(start, end),
        }
    }

    /// Insert `value`, returning whether it was absent
    pub fn add(&mut self, value: u16) -> bool {
        match self {
            Container::Array(c) if c.cardinality() >= ARRAY_MAX_CARDINALITY => {
                if c.contains(value) {
                    return false;
                }
                let mut bitmap = BitmapContainer::from(&*c);
                bitmap.add(value);
                *self = Container::Bitmap(bitmap);
                true
            }
            Container::Array(c) => c.add(value),
            Container::Bitmap(c) => c.add(value),
            Container::Run(c) => c.add(value),
        }
    }

    /// Remove `value`, returning whether it was present
    pub fn remove(&mut self, value: u16) -> bool {
        let removed = match self {
            Container::Array(c) => c.remove(value),
            Container::Bitmap(c) => c.remove(value),
            Container::Run(c) => c.remove(value),
        };
        if removed {
            self.repair();
        }
        removed
    }

    /// Insert every value of `start..=end`
    pub fn add_range(&mut self, start: u16, end: u16) {
        match self {
            Container::Array(c)
                if c.cardinality() + usize::from(end - start) + 1 > ARRAY_MAX_CARDINALITY =>
            {
                let mut bitmap = BitmapContainer::from(&*c);
                bitmap.set_range(start, end);
                *self = Container::Bitmap(bitmap);
            }
            Container::Array(c) => c.add_range(start, end),
            Container::Bitmap(c) => c.set_range(start, end),
            Container::Run(c) => c.add_range(start, end),
        }
        self.repair();
    }

    /// Remove every value of `start..=end`
    pub fn remove_range(&mut self, start: u16, end: u16) {
        match self {
            Container::Array(c) => c.remove_range(start, end),
            Container::Bitmap(c) => c.clear_range(start, end),
            Container::Run(c) => c.remove_range(start, end),
        }
        self.repair();
    }

    #[inline]
    pub fn minimum(&self) -> Option<u16> {
        match self {
            Container::Array(c) => c.minimum(),
            Container::Bitmap(c) => c.minimum(),
            Container::Run(c) => c.minimum(),
        }
    }

    #[inline]
    pub fn maximum(&self) -> Option<u16> {
        match self {
            Container::Array(c) => c.maximum(),
            Container::Bitmap(c) => c.maximum(),
            Container::Run(c) => c.maximum(),
        }
    }

    /// Number of values `<= value`
    #[inline]
    pub fn rank(&self, value: u16) -> usize {
        match self {
            Container::Array(c) => c.rank(value),
            Container::Bitmap(c) => c.rank(value),
            Container::Run(c) => c.rank(value),
        }
    }

    /// The `n`th smallest value, counting from zero
    #[inline]
    pub fn select(&self, n: usize) -> Option<u16> {
        match self {
            Container::Array(c) => c.select(n),
            Container::Bitmap(c) => c.select(n),
            Container::Run(c) => c.select(n),
        }
    }

    /// Number of maximal runs of consecutive values
    pub fn number_of_runs(&self) -> usize {
        match self {
            Container::Array(c) => c.number_of_runs(),
            Container::Bitmap(c) => c.number_of_runs(),
            Container::Run(c) => c.number_of_runs(),
        }
    }

    /// Restore the array/bitmap threshold after a mutation
    ///
    /// Run containers are left alone.
    pub(crate) fn repair(&mut self) {
        match self {
            Container::Array(c) if c.cardinality() > ARRAY_MAX_CARDINALITY => {
                *self = Container::Bitmap(BitmapContainer::from(&*c));
            }
            Container::Bitmap(c) if c.cardinality() <= ARRAY_MAX_CARDINALITY => {
                *self = Container::Array(ArrayContainer::from(&*c));
            }
            _ => {}
        }
    }

    #[inline]
    pub(crate) fn repaired(mut self) -> Self {
        self.repair();
        self
    }

    /// Pick the smallest representation, preferring runs on ties
    pub fn into_efficient(self) -> Self {
        let card = self.cardinality();
        let run_size = run_size_in_bytes(self.number_of_runs());
        let other_size = (2 * card).min(BITMAP_SIZE_IN_BYTES);
        if run_size <= other_size {
            match self {
                Container::Run(c) => Container::Run(c),
                Container::Array(c) => Container::Run(RunContainer::from(&c)),
                Container::Bitmap(c) => Container::Run(RunContainer::from(&c)),
            }
        } else {
            self.without_runs()
        }
    }

    /// The same values in array or bitmap form
    pub fn without_runs(self) -> Self {
        match self {
            Container::Run(c) if c.cardinality() <= ARRAY_MAX_CARDINALITY => {
                Container::Array(ArrayContainer::from(&c))
            }
            Container::Run(c) => Container::Bitmap(BitmapContainer::from(&c)),
            other => other.repaired(),
        }
    }

    /// Convert to a run container if it is strictly smaller, or away from one if it is not
    /// the smallest form
    ///
    /// Returns whether the representation changed.
    pub fn run_optimize(&mut self) -> bool {
        let before = self.kind();
        let optimized = match mem::take(self) {
            run @ Container::Run(_) => run.into_efficient(),
            other => {
                let run_size = run_size_in_bytes(other.number_of_runs());
                if run_size < other.serialized_size_in_bytes() {
                    match other {
                        Container::Array(c) => Container::Run(RunContainer::from(&c)),
                        Container::Bitmap(c) => Container::Run(RunContainer::from(&c)),
                        run @ Container::Run(_) => run,
                    }
                } else {
                    other
                }
            }
        };
        *self = optimized;
        self.kind() != before
    }

    /// Convert a run container back to array or bitmap form
    ///
    /// Returns whether anything changed.
    pub fn remove_run_compression(&mut self) -> bool {
        if self.kind() != ContainerKind::Run {
            return false;
        }
        *self = mem::take(self).without_runs();
        true
    }

    pub fn shrink_to_fit(&mut self) {
        if let Container::Array(c) = self {
            c.shrink_to_fit();
        }
    }

    /// Check the representation invariants, describing the first one violated
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Container::Array(c) => {
                if c.is_empty() {
                    return Err("empty array container");
                }
                if c.cardinality() > ARRAY_MAX_CARDINALITY {
                    return Err("array container above the array threshold");
                }
                if !c.values().windows(2).all(|w| w[0] < w[1]) {
                    return Err("array container values are not strictly ascending");
                }
            }
            Container::Bitmap(c) => {
                if c.cardinality() <= ARRAY_MAX_CARDINALITY {
                    return Err("bitmap container at or below the array threshold");
                }
                let popcount: usize = c.words().iter().map(|w| w.count_ones() as usize).sum();
                if popcount != c.cardinality() {
                    return Err("bitmap container cardinality is stale");
                }
            }
            Container::Run(c) => {
                if c.is_empty() {
                    return Err("empty run container");
                }
                let runs = c.runs();
                if runs
                    .iter()
                    .any(|r| u32::from(r.value) + u32::from(r.length) > u32::from(u16::MAX))
                {
                    return Err("run extends past the container");
                }
                if !runs
                    .windows(2)
                    .all(|w| u32::from(w[0].end()) + 1 < u32::from(w[1].value))
                {
                    return Err("runs overlap, touch, or are out of order");
                }
                if runs.iter().map(Rle16::cardinality).sum::<usize>() != c.cardinality() {
                    return Err("run container cardinality is stale");
                }
            }
        }
        Ok(())
    }
}

#[inline]
pub(crate) const fn run_size_in_bytes(runs: usize) -> usize {
    2 + 4 * runs
}

impl PartialEq for Container {
    /// Containers are equal when they hold the same values, whatever their representation
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Container::Array(a), Container::Array(b)) => a == b,
            (Container::Bitmap(a), Container::Bitmap(b)) => a == b,
            (Container::Run(a), Container::Run(b)) => a == b,
            _ => self.cardinality() == other.cardinality() && self.iter().eq(other.iter()),
        }
    }
}

impl Eq for Container {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn array_grows_into_bitmap() {
        let mut container = Container::new();
        for v in 0..ARRAY_MAX_CARDINALITY as u16 {
            assert!(container.add(v * 2));
        }
        assert_eq!(container.kind(), ContainerKind::Array);
        assert!(!container.add(0));
        assert_eq!(container.kind(), ContainerKind::Array);

        assert!(container.add(1));
        assert_eq!(container.kind(), ContainerKind::Bitmap);
        assert_eq!(container.cardinality(), ARRAY_MAX_CARDINALITY + 1);

        assert!(container.remove(1));
        assert_eq!(container.kind(), ContainerKind::Array);
        assert_eq!(container.cardinality(), ARRAY_MAX_CARDINALITY);
    }

    #[test]
    fn ranges_respect_threshold() {
        let mut container = Container::new();
        container.add_range(0, 4095);
        assert_eq!(container.kind(), ContainerKind::Array);
        container.add_range(4096, 4096);
        assert_eq!(container.kind(), ContainerKind::Bitmap);
        container.remove_range(100, 4096);
        assert_eq!(container.kind(), ContainerKind::Array);
        assert_eq!(container.cardinality(), 100);

        // Overlapping range that never exceeds the threshold
        let mut container = Container::new();
        container.add_range(0, 4000);
        container.add_range(0, 4000);
        assert_eq!(container.kind(), ContainerKind::Array);
        assert_eq!(container.cardinality(), 4001);
    }

    #[test]
    fn from_range_picks_smallest() {
        assert_eq!(Container::from_range(5, 5).kind(), ContainerKind::Array);
        assert_eq!(Container::from_range(0, 9).kind(), ContainerKind::Run);
        assert_eq!(Container::from_range(0, u16::MAX).kind(), ContainerKind::Run);
        assert!(Container::from_range(0, u16::MAX).is_full());
    }

    #[test]
    fn run_optimize_is_idempotent() {
        let mut container = Container::new();
        container.add_range(0, 9999);
        assert_eq!(container.kind(), ContainerKind::Bitmap);
        assert!(container.run_optimize());
        assert_eq!(container.serialized_size_in_bytes(), 6);
        assert!(!container.run_optimize());
        assert_eq!(container.kind(), ContainerKind::Run);

        let mut sparse = Container::new();
        for v in [1u16, 3, 5, 7] {
            sparse.add(v);
        }
        assert!(!sparse.run_optimize());
        assert_eq!(sparse.kind(), ContainerKind::Array);
    }

    #[test]
    fn run_optimize_leaves_poor_runs() {
        let mut runs = RunContainer::new();
        for v in [1u16, 3, 5, 7, 9] {
            runs.add(v);
        }
        let mut container = Container::Run(runs);
        assert!(container.run_optimize());
        assert_eq!(container.kind(), ContainerKind::Array);
        assert!(!container.run_optimize());
        assert_eq!(container.kind(), ContainerKind::Array);
    }

    #[test]
    fn remove_run_compression_restores_threshold() {
        let mut container = Container::Run(RunContainer::from_range(0, 5000));
        assert!(container.remove_run_compression());
        assert_eq!(container.kind(), ContainerKind::Bitmap);
        assert!(!container.remove_run_compression());

        let mut container = Container::Run(RunContainer::from_range(0, 50));
        assert!(container.remove_run_compression());
        assert_eq!(container.kind(), ContainerKind::Array);
    }

    #[test]
    fn equality_ignores_representation() {
        let array = Container::from_range(5, 5);
        let mut runs = RunContainer::new();
        runs.add(5);
        assert_eq!(array, Container::Run(runs));
        assert_ne!(array, Container::from_range(5, 6));
    }

    #[test]
    fn validate_detects_stale_state() {
        assert!(Container::from_range(0, 10).validate().is_ok());
        assert!(Container::new().validate().is_err());
        let mut bitmap = BitmapContainer::new();
        bitmap.add(1);
        assert!(Container::Bitmap(bitmap).validate().is_err());
    }
}
