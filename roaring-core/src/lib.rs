//! Compressed bitmaps of `u32` values, readable and writable in the portable roaring format.
//!
//! ```
//! use roaring_core::{Bitmap, Portable};
//!
//! let mut bitmap: Bitmap = (0..4096).collect();
//! bitmap.add_range(1 << 20..1 << 21);
//!
//! let bytes = bitmap.serialize::<Portable>();
//! let decoded = Bitmap::try_deserialize::<Portable>(&bytes).unwrap();
//! assert_eq!(decoded, bitmap);
//! ```

pub mod bitmap;
pub mod container;
mod error;
pub mod io;
pub mod serialization;

pub use bitmap::{Bitmap, BitmapIterator, BitmapView, Statistics};
pub use bitmap::{Deserializer, Serializer, ViewDeserializer};
pub use error::{Error, Result};
pub use serialization::Portable;
