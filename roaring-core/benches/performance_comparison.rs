use roaring::RoaringBitmap;
use roaring_core::{Bitmap, Portable};

use criterion::measurement::Measurement;
use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkGroup, BenchmarkId, Criterion,
};

/// Run the same workload against this crate and against `roaring`
fn compare<Prep1, Prep2, Bench1, Bench2, In1, In2, Out1, Out2, M>(
    group: &mut BenchmarkGroup<'_, M>,
    mut prep1: Prep1,
    mut prep2: Prep2,
    mut bench1: Bench1,
    mut bench2: Bench2,
) where
    Prep1: FnMut() -> In1,
    Prep2: FnMut() -> In2,
    Bench1: FnMut(In1) -> Out1,
    Bench2: FnMut(In2) -> Out2,
    M: Measurement,
{
    group.bench_function("roaring-core", |b| {
        b.iter_batched(&mut prep1, &mut bench1, BatchSize::SmallInput);
    });
    group.bench_function("roaring-rs", |b| {
        b.iter_batched(&mut prep2, &mut bench2, BatchSize::SmallInput);
    });
}

const SIMPLE_ITEMS: &[u32] = &[1, 10, 100, 1_000, 10_000, 100_000, 1_000_000];

fn add(c: &mut Criterion) {
    compare(
        &mut c.benchmark_group("add_several"),
        Bitmap::new,
        RoaringBitmap::new,
        |mut bitmap: Bitmap| {
            for &item in SIMPLE_ITEMS {
                bitmap.add(black_box(item));
            }
            bitmap
        },
        |mut bitmap: RoaringBitmap| {
            for &item in SIMPLE_ITEMS {
                bitmap.insert(black_box(item));
            }
            bitmap
        },
    );
}

fn contains(c: &mut Criterion) {
    compare(
        &mut c.benchmark_group("contains"),
        || Bitmap::of(SIMPLE_ITEMS),
        || SIMPLE_ITEMS.iter().copied().collect::<RoaringBitmap>(),
        |bitmap: Bitmap| bitmap.contains(black_box(100_000)),
        |bitmap: RoaringBitmap| bitmap.contains(black_box(100_000)),
    )
}

fn binops(c: &mut Criterion) {
    let range1 = 1..100_000;
    let range2 = 50_000..200_000;

    let gen_ours = || {
        (
            Bitmap::from_iter(range1.clone()),
            Bitmap::from_iter(range2.clone()),
        )
    };
    let gen_theirs = || {
        (
            RoaringBitmap::from_iter(range1.clone()),
            RoaringBitmap::from_iter(range2.clone()),
        )
    };

    macro_rules! comp_op {
        ($new1:ident, $inplace1:ident, $new2:expr, $inplace2:expr $(,)?) => {{
            compare(
                &mut c.benchmark_group(concat!(stringify!($new1), "_new")),
                gen_ours,
                gen_theirs,
                |(bm1, bm2)| bm1.$new1(&bm2),
                |(bm1, bm2)| $new2(&bm1, &bm2),
            );
            compare(
                &mut c.benchmark_group(concat!(stringify!($new1), "_inplace")),
                gen_ours,
                gen_theirs,
                |(mut bm1, bm2)| bm1.$inplace1(&bm2),
                |(mut bm1, bm2)| $inplace2(&mut bm1, &bm2),
            );
        }};
    }

    comp_op!(
        and,
        and_inplace,
        std::ops::BitAnd::bitand,
        std::ops::BitAndAssign::bitand_assign,
    );
    comp_op!(
        or,
        or_inplace,
        std::ops::BitOr::bitor,
        std::ops::BitOrAssign::bitor_assign,
    );
    comp_op!(
        xor,
        xor_inplace,
        std::ops::BitXor::bitxor,
        std::ops::BitXorAssign::bitxor_assign,
    );
}

fn iter(c: &mut Criterion) {
    compare(
        &mut c.benchmark_group("iter"),
        || Bitmap::from_iter(1..10_000),
        || RoaringBitmap::from_iter(1..10_000),
        |bitmap: Bitmap| assert_eq!(bitmap.iter().fold(0, |a, b| a + b), 49995000),
        |bitmap: RoaringBitmap| assert_eq!(bitmap.iter().fold(0, |a, b| a + b), 49995000),
    );
}

fn serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");
    for &size in &[10_000u32, 1_000_000] {
        let ours: Bitmap = (0..size).step_by(3).collect();
        let theirs: RoaringBitmap = (0..size).step_by(3).collect();
        let bytes = ours.serialize::<Portable>();

        group.bench_with_input(BenchmarkId::new("serialize/roaring-core", size), &ours, |b, bm| {
            b.iter(|| bm.serialize::<Portable>());
        });
        group.bench_with_input(BenchmarkId::new("serialize/roaring-rs", size), &theirs, |b, bm| {
            b.iter(|| {
                let mut out = Vec::with_capacity(bm.serialized_size());
                bm.serialize_into(&mut out).map(|()| out)
            });
        });
        group.bench_with_input(BenchmarkId::new("deserialize/roaring-core", size), &bytes, |b, bytes| {
            b.iter(|| Bitmap::try_deserialize::<Portable>(bytes));
        });
        group.bench_with_input(BenchmarkId::new("deserialize/roaring-rs", size), &bytes, |b, bytes| {
            b.iter(|| RoaringBitmap::deserialize_from(&bytes[..]));
        });
    }
}

criterion_group!(benches, add, contains, binops, iter, serialization);
criterion_main!(benches);
