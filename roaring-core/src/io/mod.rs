//! Byte sinks and sources the portable format is read from and written to.
//!
//! Three backings share the same contract:
//!
//! * growable streams: `Vec<u8>`, [`StreamSink`] and [`StreamSource`]
//! * fixed-capacity in-memory regions: [`ByteBuffer`]
//! * memory-mapped files: [`MappedRegion`] (with the `mmap` feature)
//!
//! Integer accessors take the byte order as a type parameter, so callers decide the order
//! per field rather than per stream.

use byteorder::ByteOrder;

use crate::Result;

mod buffer;
#[cfg(feature = "mmap")]
mod mapped;
mod stream;

pub use self::buffer::ByteBuffer;
#[cfg(feature = "mmap")]
pub use self::mapped::MappedRegion;
pub use self::stream::{StreamSink, StreamSource};

/// Byte order configured on a [`ByteBuffer`] for its own typed accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    Big,
    #[default]
    Little,
}

impl Endianness {
    /// The byte order of the target platform
    #[inline]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    /// The opposite byte order
    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            Endianness::Big => Endianness::Little,
            Endianness::Little => Endianness::Big,
        }
    }
}

/// A sequential destination for bytes
pub trait ByteSink {
    /// Append all of `bytes`
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    #[inline]
    fn write_u16<E: ByteOrder>(&mut self, value: u16) -> Result<()> {
        let mut buf = [0; 2];
        E::write_u16(&mut buf, value);
        self.write_bytes(&buf)
    }

    #[inline]
    fn write_u32<E: ByteOrder>(&mut self, value: u32) -> Result<()> {
        let mut buf = [0; 4];
        E::write_u32(&mut buf, value);
        self.write_bytes(&buf)
    }

    #[inline]
    fn write_u64<E: ByteOrder>(&mut self, value: u64) -> Result<()> {
        let mut buf = [0; 8];
        E::write_u64(&mut buf, value);
        self.write_bytes(&buf)
    }
}

/// A sequential, seekable origin of bytes
///
/// Offsets are relative to the source's own window: offset 0 is the first byte the source
/// exposes, which is not necessarily the first byte of the underlying storage.
pub trait ByteSource {
    /// Fill `dst` completely, or fail with [`Error::TruncatedInput`](crate::Error::TruncatedInput)
    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()>;

    /// The offset of the next byte to be read
    fn position(&self) -> u64;

    /// Move the read position to `offset`
    fn position_at(&mut self, offset: u64) -> Result<()>;

    #[inline]
    fn read_u16<E: ByteOrder>(&mut self) -> Result<u16> {
        let mut buf = [0; 2];
        self.read_bytes(&mut buf)?;
        Ok(E::read_u16(&buf))
    }

    #[inline]
    fn read_u32<E: ByteOrder>(&mut self) -> Result<u32> {
        let mut buf = [0; 4];
        self.read_bytes(&mut buf)?;
        Ok(E::read_u32(&buf))
    }

    #[inline]
    fn read_u64<E: ByteOrder>(&mut self) -> Result<u64> {
        let mut buf = [0; 8];
        self.read_bytes(&mut buf)?;
        Ok(E::read_u64(&buf))
    }
}

impl ByteSink for Vec<u8> {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<T: ByteSink> ByteSink for &mut T {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }
}

impl<T: ByteSource> ByteSource for &mut T {
    #[inline]
    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        (**self).read_bytes(dst)
    }

    #[inline]
    fn position(&self) -> u64 {
        (**self).position()
    }

    #[inline]
    fn position_at(&mut self, offset: u64) -> Result<()> {
        (**self).position_at(offset)
    }
}
