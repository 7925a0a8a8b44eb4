#![no_main]

use crate::arbitrary_ops::*;
use libfuzzer_sys::arbitrary;
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use roaring_core::{Bitmap, BitmapView, Portable};

mod arbitrary_ops;

fuzz_target!(|input: FuzzInput| {
    let mut lhs = Bitmap::create();
    let mut rhs = Bitmap::create();

    for op in &input.lhs_ops {
        op.on_roaring(&mut lhs);
    }
    for op in &input.rhs_ops {
        op.on_roaring(&mut rhs);
    }

    for op in &input.comp_ops {
        op.on_roaring(&mut lhs, &rhs);
    }

    for op in &input.view_ops {
        op.on_roaring(&rhs);
        op.on_roaring(&lhs);
    }

    let to_compare = lhs.clone();
    check_serialized(&mut lhs, &to_compare, &input);
    check_serialized(&mut lhs, &rhs, &input);
});

fn check_serialized(lhs: &mut Bitmap, to_compare: &Bitmap, input: &FuzzInput) {
    let data = to_compare.serialize::<Portable>();
    assert_eq!(data.len(), to_compare.get_serialized_size_in_bytes::<Portable>());

    let view = BitmapView::deserialize::<Portable>(&data).unwrap();
    assert_eq!(view.cardinality(), to_compare.cardinality());
    assert_eq!(view.serialized_size_in_bytes(), data.len());
    for value in to_compare.iter().step_by(101) {
        assert!(view.contains(value).unwrap());
    }

    let decoded = view.to_bitmap().unwrap();
    assert_eq!(decoded, *to_compare);
    decoded.internal_validate().unwrap();

    for op in &input.view_ops {
        op.on_roaring(&decoded);
    }
    for op in &input.comp_ops {
        op.on_roaring(lhs, &decoded);
    }
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    lhs_ops: Vec<MutableBitmapOperation>,
    rhs_ops: Vec<MutableBitmapOperation>,
    comp_ops: Vec<BitmapCompOperation>,
    view_ops: Vec<ReadBitmapOp>,
}

impl ReadBitmapOp {
    pub fn on_roaring(&self, b: &Bitmap) {
        match *self {
            ReadBitmapOp::ContainsRange(ref r) => {
                b.contains_range(r.start().0..=r.end().0);
            }
            ReadBitmapOp::Contains(i) => {
                b.contains(i.0);
            }
            ReadBitmapOp::RangeCardinality(ref r) => {
                b.range_cardinality(r.start().0..=r.end().0);
            }
            ReadBitmapOp::Cardinality => {
                b.cardinality();
            }
            ReadBitmapOp::ToVec => {
                assert_eq!(b.to_vec().len() as u64, b.cardinality());
            }
            ReadBitmapOp::GetSerializedSizeInBytes => {
                b.get_serialized_size_in_bytes::<Portable>();
            }
            ReadBitmapOp::IsEmpty => {
                assert_eq!(b.is_empty(), b.cardinality() == 0);
            }
            ReadBitmapOp::Minimum => {
                assert_eq!(b.minimum(), b.iter().next());
            }
            ReadBitmapOp::Maximum => {
                b.maximum();
            }
            ReadBitmapOp::Rank(i) => {
                b.rank(i.0);
            }
            ReadBitmapOp::Select(i) => {
                if let Some(value) = b.select(i.0) {
                    assert_eq!(b.rank(value), u64::from(i.0) + 1);
                }
            }
            ReadBitmapOp::Statistics => {
                let stats = b.statistics();
                assert_eq!(stats.cardinality, b.cardinality());
            }
            ReadBitmapOp::Clone => {
                drop(b.clone());
            }
            ReadBitmapOp::Debug => {
                use std::io::Write;
                write!(std::io::sink(), "{:?}", b).unwrap();
            }
            ReadBitmapOp::WithIter(ref iter_ops) => {
                let mut iter = b.iter();
                for op in iter_ops {
                    match *op {
                        IterOperation::ResetAtOrAfter(i) => {
                            iter.reset_at_or_after(i);
                        }
                        IterOperation::ReadNext => {
                            iter.next();
                        }
                        IterOperation::NextMany(n) => {
                            let mut v = vec![0; n as usize];
                            assert!(iter.next_many(&mut v) <= n as usize);
                        }
                    }
                }
            }
        }
    }
}
