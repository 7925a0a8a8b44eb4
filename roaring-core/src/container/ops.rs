use super::{ArrayContainer, BitmapContainer, Container, RunContainer, ARRAY_MAX_CARDINALITY};

use Container::{Array, Bitmap, Run};

impl Container {
    /// Values present in both containers
    pub fn and(&self, other: &Self) -> Self {
        match (self, other) {
            (Array(a), Array(b)) => Array(a.intersect(b)),
            (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => Array(a.filter(|v| b.contains(v))),
            (Array(a), Run(r)) | (Run(r), Array(a)) => {
                if r.is_full() {
                    Array(a.clone())
                } else {
                    Array(a.filter(|v| r.contains(v)))
                }
            }
            (Bitmap(a), Bitmap(b)) => Bitmap(a.and(b)).repaired(),
            (Bitmap(b), Run(r)) | (Run(r), Bitmap(b)) => {
                if r.is_full() {
                    Bitmap(b.clone()).repaired()
                } else {
                    Bitmap(b.and(&BitmapContainer::from(r))).repaired()
                }
            }
            (Run(a), Run(b)) => Run(a.combine(b, |x, y| x && y)).into_efficient(),
        }
    }

    /// Values present in either container
    pub fn or(&self, other: &Self) -> Self {
        match (self, other) {
            (Array(a), Array(b)) => {
                if a.cardinality() + b.cardinality() <= ARRAY_MAX_CARDINALITY {
                    Array(a.union(b))
                } else {
                    let mut bitmap = BitmapContainer::from(a);
                    for &v in b.values() {
                        bitmap.add(v);
                    }
                    Bitmap(bitmap).repaired()
                }
            }
            (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
                let mut bitmap = b.clone();
                for &v in a.values() {
                    bitmap.add(v);
                }
                Bitmap(bitmap).repaired()
            }
            (Array(a), Run(r)) | (Run(r), Array(a)) => {
                if r.is_full() {
                    Run(r.clone())
                } else {
                    Run(r.combine(&RunContainer::from(a), |x, y| x || y)).into_efficient()
                }
            }
            (Bitmap(a), Bitmap(b)) => Bitmap(a.or(b)).repaired(),
            (Bitmap(b), Run(r)) | (Run(r), Bitmap(b)) => {
                if r.is_full() {
                    Run(r.clone())
                } else {
                    let mut bitmap = b.clone();
                    for run in r.runs() {
                        bitmap.set_range(run.value, run.end());
                    }
                    Bitmap(bitmap).repaired()
                }
            }
            (Run(a), Run(b)) => Run(a.combine(b, |x, y| x || y)).into_efficient(),
        }
    }

    /// Values present in exactly one container
    pub fn xor(&self, other: &Self) -> Self {
        match (self, other) {
            (Array(a), Array(b)) => Array(a.symmetric_difference(b)).repaired(),
            (Array(a), Bitmap(b)) | (Bitmap(b), Array(a)) => {
                let mut bitmap = b.clone();
                for &v in a.values() {
                    bitmap.flip(v);
                }
                Bitmap(bitmap).repaired()
            }
            (Array(a), Run(r)) | (Run(r), Array(a)) => {
                Run(r.combine(&RunContainer::from(a), |x, y| x != y)).into_efficient()
            }
            (Bitmap(a), Bitmap(b)) => Bitmap(a.xor(b)).repaired(),
            (Bitmap(b), Run(r)) | (Run(r), Bitmap(b)) => {
                let mut bitmap = b.clone();
                for run in r.runs() {
                    bitmap.flip_range(run.value, run.end());
                }
                Bitmap(bitmap).repaired()
            }
            (Run(a), Run(b)) => Run(a.combine(b, |x, y| x != y)).into_efficient(),
        }
    }

    /// Values present in `self` but not in `other`
    pub fn andnot(&self, other: &Self) -> Self {
        match (self, other) {
            (Array(a), Array(b)) => Array(a.difference(b)),
            (Array(a), Bitmap(b)) => Array(a.filter(|v| !b.contains(v))),
            (Array(a), Run(r)) => Array(a.filter(|v| !r.contains(v))),
            (Bitmap(a), Array(b)) => {
                let mut bitmap = a.clone();
                for &v in b.values() {
                    bitmap.remove(v);
                }
                Bitmap(bitmap).repaired()
            }
            (Bitmap(a), Bitmap(b)) => Bitmap(a.andnot(b)).repaired(),
            (Bitmap(a), Run(r)) => {
                let mut bitmap = a.clone();
                for run in r.runs() {
                    bitmap.clear_range(run.value, run.end());
                }
                Bitmap(bitmap).repaired()
            }
            (Run(r), Array(a)) => {
                Run(r.combine(&RunContainer::from(a), |x, y| x && !y)).into_efficient()
            }
            (Run(r), Bitmap(b)) => Bitmap(BitmapContainer::from(r).andnot(b)).into_efficient(),
            (Run(a), Run(b)) => Run(a.combine(b, |x, y| x && !y)).into_efficient(),
        }
    }

    /// In-place [`Container::and`]
    pub fn and_inplace(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Array(a), _) => a.retain(|&v| other.contains(v)),
            (Bitmap(a), Bitmap(b)) => {
                a.and_inplace(b);
                self.repair();
            }
            (_, Run(r)) if r.is_full() => self.repair(),
            _ => *self = self.and(other),
        }
    }

    /// In-place [`Container::or`]
    pub fn or_inplace(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Bitmap(a), Bitmap(b)) => a.or_inplace(b),
            (Bitmap(a), Array(b)) => {
                for &v in b.values() {
                    a.add(v);
                }
            }
            (Bitmap(a), Run(r)) if !r.is_full() => {
                for run in r.runs() {
                    a.set_range(run.value, run.end());
                }
            }
            (Run(r), _) if r.is_full() => return,
            _ => {
                *self = self.or(other);
                return;
            }
        }
        self.repair();
    }

    /// In-place [`Container::xor`]
    pub fn xor_inplace(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Bitmap(a), Bitmap(b)) => a.xor_inplace(b),
            (Bitmap(a), Array(b)) => {
                for &v in b.values() {
                    a.flip(v);
                }
            }
            _ => {
                *self = self.xor(other);
                return;
            }
        }
        self.repair();
    }

    /// In-place [`Container::andnot`]
    pub fn andnot_inplace(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Array(a), _) => a.retain(|&v| !other.contains(v)),
            (Bitmap(a), Bitmap(b)) => {
                a.andnot_inplace(b);
                self.repair();
            }
            (Bitmap(a), Array(b)) => {
                for &v in b.values() {
                    a.remove(v);
                }
                self.repair();
            }
            _ => *self = self.andnot(other),
        }
    }

    /// Cardinality of [`Container::and`] without building it where possible
    pub fn and_cardinality(&self, other: &Self) -> usize {
        match (self, other) {
            (Array(a), Array(b)) => a.intersection_len(b),
            (Array(a), _) => a.values().iter().filter(|&&v| other.contains(v)).count(),
            (_, Array(b)) => b.values().iter().filter(|&&v| self.contains(v)).count(),
            (Bitmap(a), Bitmap(b)) => a.intersection_len(b),
            _ => self.and(other).cardinality(),
        }
    }

    /// Whether the containers share at least one value
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Array(a), _) => a.values().iter().any(|&v| other.contains(v)),
            (_, Array(b)) => b.values().iter().any(|&v| self.contains(v)),
            (Bitmap(a), Bitmap(b)) => a.intersects(b),
            _ => !self.and(other).is_empty(),
        }
    }

    /// Whether every value of `self` is in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        if self.cardinality() > other.cardinality() {
            return false;
        }
        match (self, other) {
            (Bitmap(a), Bitmap(b)) => a.is_subset(b),
            (Run(a), Run(b)) => a.is_subset(b),
            (Run(a), _) => a
                .runs()
                .iter()
                .all(|run| other.contains_range(run.value, run.end())),
            _ => self.iter().all(|v| other.contains(v)),
        }
    }
}

impl From<ArrayContainer> for Container {
    fn from(array: ArrayContainer) -> Self {
        Array(array).repaired()
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    use super::*;
    use crate::container::ContainerKind;

    /// The threshold-determined form and the run form of the same values
    fn containers(values: &BTreeSet<u16>) -> [Container; 2] {
        let array = ArrayContainer::from_sorted_vec(values.iter().copied().collect());
        let runs = RunContainer::from(&array);
        [Container::from(array), Run(runs)]
    }

    fn values(container: &Container) -> BTreeSet<u16> {
        container.iter().collect()
    }

    fn check_shape(container: &Container) {
        match container {
            Array(c) => assert!(c.cardinality() <= ARRAY_MAX_CARDINALITY),
            Bitmap(c) => assert!(c.cardinality() > ARRAY_MAX_CARDINALITY),
            Run(c) => assert!(!c.is_empty() || container.is_empty()),
        }
        let popcount = container.iter().count();
        assert_eq!(popcount, container.cardinality());
    }

    fn value_set() -> impl Strategy<Value = BTreeSet<u16>> {
        prop_oneof![
            prop::collection::btree_set(any::<u16>(), 0..200),
            (0u16..1000, 4097u16..6000).prop_map(|(offset, n)| {
                (0..n).map(|i| offset + i * 2).collect::<BTreeSet<u16>>()
            }),
            (0u16..30000, 0u16..20000)
                .prop_map(|(start, len)| (start..start + len).collect::<BTreeSet<u16>>()),
        ]
    }

    proptest! {
        #[test]
        fn nine_way_matrix_matches_sets(a in value_set(), b in value_set()) {
            let and: BTreeSet<u16> = a.intersection(&b).copied().collect();
            let or: BTreeSet<u16> = a.union(&b).copied().collect();
            let xor: BTreeSet<u16> = a.symmetric_difference(&b).copied().collect();
            let andnot: BTreeSet<u16> = a.difference(&b).copied().collect();

            for x in containers(&a).iter() {
                for y in containers(&b).iter() {
                    for (result, expected) in [
                        (x.and(y), &and),
                        (x.or(y), &or),
                        (x.xor(y), &xor),
                        (x.andnot(y), &andnot),
                    ] {
                        check_shape(&result);
                        prop_assert_eq!(&values(&result), expected);
                    }

                    let mut inplace = x.clone();
                    inplace.and_inplace(y);
                    check_shape(&inplace);
                    prop_assert_eq!(&values(&inplace), &and);

                    let mut inplace = x.clone();
                    inplace.or_inplace(y);
                    check_shape(&inplace);
                    prop_assert_eq!(&values(&inplace), &or);

                    let mut inplace = x.clone();
                    inplace.xor_inplace(y);
                    check_shape(&inplace);
                    prop_assert_eq!(&values(&inplace), &xor);

                    let mut inplace = x.clone();
                    inplace.andnot_inplace(y);
                    check_shape(&inplace);
                    prop_assert_eq!(&values(&inplace), &andnot);

                    prop_assert_eq!(x.and_cardinality(y), and.len());
                    prop_assert_eq!(x.intersects(y), !and.is_empty());
                    prop_assert_eq!(x.is_subset(y), a.is_subset(&b));
                }
            }
        }
    }

    #[test]
    fn full_run_shortcuts() {
        let full = Container::from_range(0, u16::MAX);
        let sparse = Container::from(ArrayContainer::from_iter([1u16, 9, 300]));

        assert_eq!(full.and(&sparse), sparse);
        assert_eq!(sparse.and(&full).kind(), ContainerKind::Array);
        assert!(full.or(&sparse).is_full());
        assert_eq!(full.or(&sparse).kind(), ContainerKind::Run);
        assert_eq!(full.andnot(&sparse).cardinality(), 65533);

        let mut inplace = sparse.clone();
        inplace.or_inplace(&full);
        assert!(inplace.is_full());
    }

    #[test]
    fn union_of_arrays_crosses_threshold() {
        let a = Container::from(ArrayContainer::from_iter((0..3000u16).map(|v| v * 2)));
        let b = Container::from(ArrayContainer::from_iter((0..3000u16).map(|v| v * 2 + 1)));
        let union = a.or(&b);
        assert_eq!(union.kind(), ContainerKind::Bitmap);
        assert_eq!(union.cardinality(), 6000);

        // Heavily overlapping inputs stay an array
        let union = a.or(&a);
        assert_eq!(union.kind(), ContainerKind::Array);
        assert_eq!(union.cardinality(), 3000);
    }
}
