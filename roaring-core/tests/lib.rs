use proptest::prelude::*;
use roaring_core::container::ContainerKind;
use roaring_core::serialization::{SERIAL_COOKIE, SERIAL_COOKIE_NO_RUNCONTAINER};
use roaring_core::{Bitmap, Portable};

// borrowed and adapted from https://github.com/Nemo157/roaring-rs/blob/5089f180ca7e17db25f5c58023f4460d973e747f/tests/lib.rs#L7-L37
#[test]
fn smoke1() {
    let mut bitmap = Bitmap::create();
    assert_eq!(bitmap.cardinality(), 0);
    assert!(bitmap.is_empty());
    bitmap.remove(0);
    assert_eq!(bitmap.cardinality(), 0);
    assert!(bitmap.is_empty());
    bitmap.add(1);
    assert!(bitmap.contains(1));
    assert_eq!(bitmap.cardinality(), 1);
    assert!(!bitmap.is_empty());
    bitmap.add(u32::MAX - 2);
    assert!(bitmap.contains(u32::MAX - 2));
    assert_eq!(bitmap.cardinality(), 2);
    bitmap.add(u32::MAX);
    assert!(bitmap.contains(u32::MAX));
    assert_eq!(bitmap.cardinality(), 3);
    bitmap.add(2);
    assert!(bitmap.contains(2));
    assert_eq!(bitmap.cardinality(), 4);
    bitmap.remove(2);
    assert!(!bitmap.contains(2));
    assert_eq!(bitmap.cardinality(), 3);
    assert!(!bitmap.contains(0));
    assert!(bitmap.contains(1));
    assert!(!bitmap.contains(100));
    assert!(bitmap.contains(u32::MAX - 2));
    assert!(!bitmap.contains(u32::MAX - 1));
    assert!(bitmap.contains(u32::MAX));
    bitmap.clear();
    assert_eq!(bitmap.cardinality(), 0);
    assert!(bitmap.is_empty());
}

#[test]
fn smoke2() {
    let mut rb1 = Bitmap::create();
    rb1.add(1);
    rb1.add(2);
    rb1.add(3);
    rb1.add(4);
    rb1.add(5);
    rb1.add(100);
    rb1.add(1000);
    rb1.run_optimize();

    let mut rb2 = Bitmap::create();
    rb2.add(3);
    rb2.add(4);
    rb2.add(1000);
    rb2.run_optimize();

    let mut rb3 = Bitmap::create();

    assert_eq!(rb1.cardinality(), 7);
    assert!(rb1.contains(3));

    rb1.and_inplace(&rb2);
    rb3.add(5);
    rb3.or_inplace(&rb1);

    let rb4 = Bitmap::fast_or(&[&rb1, &rb2, &rb3]);

    assert_eq!(rb1.to_vec(), [3, 4, 1000]);
    assert_eq!(rb3.to_vec(), [3, 4, 5, 1000]);
    assert_eq!(rb4, rb3);
    println!("{:?}", rb4);
}

#[test]
fn adjacent_arrays_union_into_bitmap() {
    let a: Bitmap = (0..4096).collect();
    let b: Bitmap = (4096..8192).collect();
    assert_eq!(a.containers()[0].1.kind(), ContainerKind::Array);
    assert_eq!(b.containers()[0].1.kind(), ContainerKind::Array);

    let mut union = a.or(&b);
    assert_eq!(union.cardinality(), 8192);
    assert_eq!(union.to_vec(), (0..8192).collect::<Vec<_>>());
    assert_eq!(union.containers()[0].1.kind(), ContainerKind::Bitmap);

    let bytes = union.serialize::<Portable>();
    assert_eq!(bytes[..4], SERIAL_COOKIE_NO_RUNCONTAINER.to_le_bytes());
    assert_eq!(bytes.len(), 8 + 4 + 4 + 8192);

    assert!(union.run_optimize());
    let bytes = union.serialize::<Portable>();
    assert_eq!(bytes[..4], SERIAL_COOKIE.to_le_bytes());
    assert_eq!(
        bytes,
        [
            0x3b, 0x30, 0, 0, // cookie, one container
            0b1, // run flags
            0, 0, 0xff, 0x1f, // key 0, 8192 values
            1, 0, 0, 0, 0xff, 0x1f, // one run: 0, length 8191
        ]
    );
    assert_eq!(Bitmap::try_deserialize::<Portable>(&bytes).unwrap(), a.or(&b));
}

#[test]
fn removals_shrink_bitmaps_into_arrays() {
    let mut bitmap: Bitmap = (0..5000).collect();
    assert_eq!(bitmap.containers()[0].1.kind(), ContainerKind::Bitmap);
    bitmap.remove_range(0..904);
    assert_eq!(bitmap.cardinality(), 4096);
    assert_eq!(bitmap.containers()[0].1.kind(), ContainerKind::Array);
    assert_eq!(bitmap.internal_validate(), Ok(()));

    bitmap.add(0);
    assert_eq!(bitmap.containers()[0].1.kind(), ContainerKind::Bitmap);
    assert!(bitmap.remove_checked(0));
    assert_eq!(bitmap.containers()[0].1.kind(), ContainerKind::Array);
}

#[test]
fn full_container_shortcuts() {
    let mut full = Bitmap::new();
    full.add_range(0..=0xFFFF);
    assert_eq!(full.containers()[0].1.kind(), ContainerKind::Run);

    let sparse = Bitmap::of(&[1, 10, 100]);
    assert_eq!(full.and(&sparse), sparse);
    assert_eq!(full.or(&sparse), full);
    assert_eq!(full.xor(&sparse).cardinality(), 65536 - 3);
    assert!(sparse.andnot(&full).is_empty());
    assert!(sparse.is_subset(&full));
    assert_eq!(full.and_cardinality(&sparse), 3);

    let mut inplace = sparse.clone();
    inplace.or_inplace(&full);
    assert_eq!(inplace, full);
    assert_eq!(inplace.internal_validate(), Ok(()));
}

#[test]
fn run_optimize_is_idempotent() {
    let mut bitmap: Bitmap = (0..300_000).filter(|&v| v % 7 != 0 || v > 200_000).collect();
    bitmap.add_range(1_000_000..1_000_010);
    bitmap.add_many(&[5_000_000, 5_000_002]);

    bitmap.run_optimize();
    let first = bitmap.serialize::<Portable>();
    bitmap.run_optimize();
    let second = bitmap.serialize::<Portable>();
    assert_eq!(first, second);
    assert_eq!(bitmap.internal_validate(), Ok(()));
}

#[test]
fn rank_select_across_containers() {
    let bitmap = Bitmap::of(&[1, 65_536, 65_537, 1 << 20, u32::MAX]);
    assert_eq!(bitmap.rank(0), 0);
    assert_eq!(bitmap.rank(65_536), 2);
    assert_eq!(bitmap.rank(u32::MAX), 5);
    assert_eq!(bitmap.select(2), Some(65_537));
    assert_eq!(bitmap.select(4), Some(u32::MAX));
    assert_eq!(bitmap.select(5), None);
    assert_eq!(bitmap.range_cardinality(65_536..), 4);
    assert_eq!(bitmap.range_cardinality(..), 5);
}

#[derive(Debug, Clone)]
enum Op {
    Add(u32),
    Remove(u32),
    AddRange(u32, u32),
    RemoveRange(u32, u32),
    RunOptimize,
    RemoveRunCompression,
}

const DOMAIN: u32 = 3 << 16;

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..DOMAIN).prop_map(Op::Add),
        2 => (0..DOMAIN).prop_map(Op::Remove),
        2 => (0..DOMAIN, 0u32..10_000).prop_map(|(start, len)| Op::AddRange(start, len)),
        2 => (0..DOMAIN, 0u32..10_000).prop_map(|(start, len)| Op::RemoveRange(start, len)),
        1 => Just(Op::RunOptimize),
        1 => Just(Op::RemoveRunCompression),
    ]
}

fn bitmap_strategy() -> impl Strategy<Value = Bitmap> {
    (
        prop::collection::vec(0u32..200_000, 0..6000),
        prop::collection::vec((0u32..200_000, 0u32..20_000), 0..4),
        any::<bool>(),
    )
        .prop_map(|(values, ranges, optimize)| {
            let mut bitmap = Bitmap::of(&values);
            for (start, len) in ranges {
                bitmap.add_range(start..start.saturating_add(len));
            }
            if optimize {
                bitmap.run_optimize();
            }
            bitmap
        })
}

fn assert_consistent(bitmap: &Bitmap) {
    assert_eq!(bitmap.internal_validate(), Ok(()));
    assert_eq!(bitmap.iter().count() as u64, bitmap.cardinality());
}

proptest! {
    #[test]
    fn bitmap_cardinality_roundtrip(
        indices in prop::collection::vec(proptest::num::u32::ANY, 1..3000)
    ) {
        let original = Bitmap::of(&indices);
        let mut a = indices;
        a.sort_unstable();
        a.dedup();
        prop_assert_eq!(a.len(), original.cardinality() as usize);
        prop_assert_eq!(original.to_vec(), a);
    }

    #[test]
    fn algebra_laws(a in bitmap_strategy(), b in bitmap_strategy(), c in bitmap_strategy()) {
        prop_assert_eq!(a.and(&b), b.and(&a));
        prop_assert_eq!(a.or(&b), b.or(&a));
        prop_assert_eq!(a.and(&b).and(&c), a.and(&b.and(&c)));
        prop_assert_eq!(a.or(&b).or(&c), a.or(&b.or(&c)));
        prop_assert_eq!(a.and(&b).or(&a.xor(&b)), a.or(&b));
        prop_assert_eq!(a.and(&a), a.clone());
        prop_assert_eq!(a.or(&a), a.clone());
        prop_assert!(a.andnot(&a).is_empty());
        prop_assert!(a.xor(&a).is_empty());

        prop_assert_eq!(a.and_cardinality(&b), a.and(&b).cardinality());
        prop_assert_eq!(a.or_cardinality(&b), a.or(&b).cardinality());
        prop_assert_eq!(a.xor_cardinality(&b), a.xor(&b).cardinality());
        prop_assert_eq!(a.andnot_cardinality(&b), a.andnot(&b).cardinality());
        prop_assert_eq!(a.intersect(&b), !a.and(&b).is_empty());
        prop_assert!(a.and(&b).is_subset(&a));
    }

    #[test]
    fn inplace_matches_allocating(a in bitmap_strategy(), b in bitmap_strategy()) {
        let results = [
            (a.and(&b), { let mut x = a.clone(); x &= &b; x }),
            (a.or(&b), { let mut x = a.clone(); x |= &b; x }),
            (a.xor(&b), { let mut x = a.clone(); x ^= &b; x }),
            (a.andnot(&b), { let mut x = a.clone(); x -= &b; x }),
        ];
        for (allocated, inplace) in &results {
            assert_consistent(allocated);
            assert_consistent(inplace);
            prop_assert_eq!(allocated, inplace);
        }
    }

    #[test]
    fn run_optimize_preserves_values(a in bitmap_strategy()) {
        let mut optimized = a.clone();
        optimized.run_optimize();
        assert_consistent(&optimized);
        prop_assert_eq!(&optimized, &a);
        let bytes = optimized.serialize::<Portable>();
        optimized.run_optimize();
        prop_assert_eq!(optimized.serialize::<Portable>(), bytes);

        let mut plain = optimized.clone();
        plain.remove_run_compression();
        assert_consistent(&plain);
        prop_assert!(!plain.has_run_compression());
        prop_assert_eq!(plain, a);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matches_oracle_bitset(ops in prop::collection::vec(op(), 1..60)) {
        let mut oracle = vec![false; DOMAIN as usize];
        let mut bitmap = Bitmap::new();
        for op in ops {
            match op {
                Op::Add(v) => {
                    bitmap.add(v);
                    oracle[v as usize] = true;
                }
                Op::Remove(v) => {
                    bitmap.remove(v);
                    oracle[v as usize] = false;
                }
                Op::AddRange(start, len) => {
                    let end = (start + len).min(DOMAIN);
                    bitmap.add_range(start..end);
                    oracle[start as usize..end as usize].fill(true);
                }
                Op::RemoveRange(start, len) => {
                    let end = (start + len).min(DOMAIN);
                    bitmap.remove_range(start..end);
                    oracle[start as usize..end as usize].fill(false);
                }
                Op::RunOptimize => {
                    bitmap.run_optimize();
                }
                Op::RemoveRunCompression => {
                    bitmap.remove_run_compression();
                    prop_assert!(!bitmap.has_run_compression());
                }
            }
            assert_consistent(&bitmap);
            prop_assert_eq!(
                bitmap.cardinality(),
                oracle.iter().filter(|&&b| b).count() as u64
            );
        }
        let expected: Vec<u32> = (0..DOMAIN).filter(|&v| oracle[v as usize]).collect();
        prop_assert_eq!(bitmap.to_vec(), expected);
    }
}
