use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};

use roaring_core::io::{ByteBuffer, StreamSink, StreamSource};
use roaring_core::{Bitmap, BitmapView, Portable};

/// Bitmaps whose containers are mostly of one kind
fn shaped() -> [(&'static str, Bitmap); 3] {
    let sparse: Bitmap = (0..1_000_000).step_by(97).collect();
    let dense: Bitmap = (0..1_000_000).filter(|v| v % 5 != 0).collect();
    let mut runs: Bitmap = (0..1_000_000).filter(|v| v % 1000 < 900).collect();
    runs.run_optimize();
    [("sparse", sparse), ("dense", dense), ("runs", runs)]
}

fn add(c: &mut Criterion) {
    c.bench_function("add", |b| {
        let mut bitmap = Bitmap::new();

        b.iter(|| bitmap.add(10000));
    });
}

fn add_many(c: &mut Criterion) {
    c.bench_function("add_many", |b| {
        let mut bitmap = Bitmap::new();
        let int_slice = &[10, 100, 10_000, 1_000_000, 10_000_000];

        b.iter(|| bitmap.add_many(black_box(int_slice)));
    });
}

fn add_range(c: &mut Criterion) {
    c.bench_function("add_range", |b| {
        b.iter_batched(
            Bitmap::new,
            |mut bitmap| bitmap.add_range(black_box(1_000..2_000_000)),
            BatchSize::SmallInput,
        );
    });
}

fn contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains");
    for (name, bitmap) in shaped() {
        group.bench_function(name, |b| {
            b.iter(|| bitmap.contains(black_box(500_001)));
        });
    }
}

fn cardinality(c: &mut Criterion) {
    let mut group = c.benchmark_group("cardinality");

    for &size in &[100_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let bitmap: Bitmap = (0..size).collect();

            b.iter(|| bitmap.cardinality());
        });
    }
}

fn binops(c: &mut Criterion) {
    let [(_, bitmap1), (_, bitmap2), (_, bitmap3)] = shaped();

    macro_rules! bench_op {
        ($new:ident, $inplace:ident) => {{
            let mut group = c.benchmark_group(stringify!($new));

            for (name, other) in [("bitmap", &bitmap2), ("run", &bitmap3)] {
                group.bench_function(BenchmarkId::new("new", name), |b| {
                    b.iter(|| bitmap1.$new(other));
                });
                group.bench_function(BenchmarkId::new("inplace", name), |b| {
                    b.iter_batched(
                        || bitmap1.clone(),
                        |mut dst_bitmap| dst_bitmap.$inplace(other),
                        BatchSize::LargeInput,
                    );
                });
            }

            group
        }};
        ($new:ident, $inplace:ident, $fast:ident) => {{
            let mut group = bench_op!($new, $inplace);

            group.bench_function("fast", |b| {
                b.iter(|| Bitmap::$fast(&[&bitmap1, &bitmap2, &bitmap3]));
            });

            group
        }};
    }

    bench_op!(and, and_inplace);
    bench_op!(or, or_inplace, fast_or);
    bench_op!(xor, xor_inplace, fast_xor);
    bench_op!(andnot, andnot_inplace);
}

fn run_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_optimize");
    for (name, bitmap) in shaped() {
        group.bench_function(name, |b| {
            b.iter_batched(
                || bitmap.clone(),
                |mut bitmap| bitmap.run_optimize(),
                BatchSize::LargeInput,
            );
        });
    }
}

fn iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("iter");
    for (name, bitmap) in shaped() {
        group.throughput(Throughput::Elements(bitmap.cardinality()));
        group.bench_function(name, |b| {
            b.iter(|| bitmap.iter().fold(0u64, |acc, v| acc + u64::from(v)));
        });
    }
}

fn to_vec(c: &mut Criterion) {
    c.bench_function("to_vec", |b| {
        let bitmap = Bitmap::of(&[1, 2, 3]);
        b.iter(|| bitmap.to_vec());
    });
}

fn get_serialized_size_in_bytes(c: &mut Criterion) {
    c.bench_function("get_serialized_size_in_bytes", |b| {
        let bitmap = Bitmap::of(&[1, 2, 3]);
        b.iter(|| bitmap.get_serialized_size_in_bytes::<Portable>());
    });
}

fn of(c: &mut Criterion) {
    c.bench_function("of", |b| {
        b.iter(|| Bitmap::of(black_box(&[10, 20, 30, 40])));
    });
}

fn serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    for (name, bitmap) in shaped() {
        let size = bitmap.get_serialized_size_in_bytes::<Portable>();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(BenchmarkId::new("vec", name), |b| {
            b.iter(|| bitmap.serialize::<Portable>());
        });
        group.bench_function(BenchmarkId::new("buffer", name), |b| {
            b.iter_batched(
                || ByteBuffer::allocate(size),
                |mut buffer| bitmap.serialize_into::<Portable>(&mut buffer),
                BatchSize::LargeInput,
            );
        });
        group.bench_function(BenchmarkId::new("stream", name), |b| {
            b.iter(|| {
                let mut sink = StreamSink::new(Vec::new());
                bitmap.serialize_into::<Portable>(&mut sink)
            });
        });
    }
}

fn deserialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize");
    for (name, bitmap) in shaped() {
        let serialized_buffer = bitmap.serialize::<Portable>();
        group.throughput(Throughput::Bytes(serialized_buffer.len() as u64));
        group.bench_function(BenchmarkId::new("slice", name), |b| {
            b.iter(|| Bitmap::try_deserialize::<Portable>(&serialized_buffer));
        });
        group.bench_function(BenchmarkId::new("stream", name), |b| {
            b.iter(|| {
                Bitmap::deserialize_from::<Portable>(StreamSource::new(&serialized_buffer[..]))
            });
        });
    }
}

fn view(c: &mut Criterion) {
    let mut group = c.benchmark_group("view");
    for (name, bitmap) in shaped() {
        let data = bitmap.serialize::<Portable>();
        group.bench_function(BenchmarkId::new("open", name), |b| {
            b.iter(|| BitmapView::deserialize::<Portable>(&data));
        });
        let view = BitmapView::deserialize::<Portable>(&data).unwrap();
        group.bench_function(BenchmarkId::new("contains", name), |b| {
            b.iter(|| view.contains(black_box(500_001)));
        });
    }
}

criterion_group!(
    benches,
    add,
    add_many,
    add_range,
    contains,
    cardinality,
    binops,
    run_optimize,
    iter,
    to_vec,
    get_serialized_size_in_bytes,
    of,
    serialize,
    deserialize,
    view,
);
criterion_main!(benches);
