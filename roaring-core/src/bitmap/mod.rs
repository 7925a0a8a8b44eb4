//! A compressed bitmap of `u32` values
//!
//! # Example
//!
//! ```rust
//! use roaring_core::Bitmap;
//!
//! let mut rb1 = Bitmap::new();
//! rb1.add(1);
//! rb1.add(2);
//! rb1.add(3);
//! rb1.add(4);
//! rb1.add(5);
//! rb1.add(100);
//! rb1.add(1000);
//! rb1.run_optimize();
//!
//! let mut rb2 = Bitmap::new();
//! rb2.add(3);
//! rb2.add(4);
//! rb2.add(1000);
//! rb2.run_optimize();
//!
//! let mut rb3 = Bitmap::new();
//!
//! assert_eq!(rb1.cardinality(), 7);
//! assert!(rb1.contains(3));
//!
//! rb1.and_inplace(&rb2);
//! rb3.add(5);
//! rb3.or_inplace(&rb1);
//!
//! let rb4 = Bitmap::fast_or(&[&rb1, &rb2, &rb3]);
//!
//! assert_eq!(rb1.to_vec(), [3, 4, 1000]);
//! assert_eq!(rb3.to_vec(), [3, 4, 5, 1000]);
//! assert_eq!(rb4, rb3);
//! println!("{:?}", rb4);
//! ```

use crate::container::Container;
use crate::serialization::Header;

/// A compressed bitmap
///
/// Values are partitioned by their high 16 bits; each partition is stored in a
/// [`Container`]. Entries are kept in ascending key order and are never empty.
#[derive(Clone, Default)]
pub struct Bitmap {
    containers: Vec<(u16, Container)>,
}

/// A read-only view of a serialized bitmap, backed by a byte slice
///
/// Container bodies are decoded on demand, one per query.
pub struct BitmapView<'a> {
    data: &'a [u8],
    header: Header,
    offsets: Vec<u32>,
    len: usize,
}

/// Detailed statistics on the composition of a bitmap
///
/// Byte counts are the sizes of the container bodies in the portable format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub n_containers: u32,
    pub n_array_containers: u32,
    pub n_run_containers: u32,
    pub n_bitset_containers: u32,
    pub n_values_array_containers: u32,
    pub n_values_run_containers: u32,
    pub n_values_bitset_containers: u32,
    pub n_bytes_array_containers: u32,
    pub n_bytes_run_containers: u32,
    pub n_bytes_bitset_containers: u32,
    pub max_value: u32,
    pub min_value: u32,
    pub sum_value: u64,
    pub cardinality: u64,
}

mod imp;
mod iter;
mod ops;
mod serialization;
mod view;

pub use self::iter::BitmapIterator;
pub use self::serialization::{Deserializer, Serializer, ViewDeserializer};

#[inline]
const fn split(value: u32) -> (u16, u16) {
    ((value >> 16) as u16, value as u16)
}

#[inline]
const fn join(key: u16, low: u16) -> u32 {
    (key as u32) << 16 | low as u32
}
