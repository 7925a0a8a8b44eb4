use std::io;

use byteorder::{BigEndian, LittleEndian};

use super::{ByteSink, ByteSource, Endianness};
use crate::{Error, Result};

/// A fixed-capacity byte region with a read/write cursor
///
/// Reads and writes happen between the current position and the limit. The configured
/// [`Endianness`] applies to the `get_*`/`put_*` accessors only; the [`ByteSink`] and
/// [`ByteSource`] methods take their byte order as a type parameter.
///
/// # Examples
///
/// ```
/// use roaring_core::io::{ByteBuffer, Endianness};
///
/// let mut buffer = ByteBuffer::allocate(6).with_order(Endianness::Big);
/// buffer.put_u16(0x0102).unwrap();
/// buffer.put_u32(0x03040506).unwrap();
/// assert_eq!(buffer.remaining(), 0);
///
/// buffer.flip();
/// assert_eq!(buffer.get_u16().unwrap(), 0x0102);
/// assert_eq!(buffer.get_u32().unwrap(), 0x03040506);
/// assert_eq!(buffer.get_ref(), &[1, 2, 3, 4, 5, 6]);
/// ```
#[derive(Debug, Clone)]
pub struct ByteBuffer<B> {
    data: B,
    position: usize,
    limit: usize,
    order: Endianness,
}

impl ByteBuffer<Vec<u8>> {
    /// Allocate a zeroed buffer of `capacity` bytes
    #[inline]
    pub fn allocate(capacity: usize) -> Self {
        Self::new(vec![0; capacity])
    }
}

impl<B: AsRef<[u8]>> ByteBuffer<B> {
    /// Wrap `data`, positioned at its start with the limit at its end
    #[inline]
    pub fn new(data: B) -> Self {
        let limit = data.as_ref().len();
        ByteBuffer {
            data,
            position: 0,
            limit,
            order: Endianness::default(),
        }
    }

    /// Set the byte order used by the typed accessors
    #[inline]
    #[must_use]
    pub fn with_order(mut self, order: Endianness) -> Self {
        self.order = order;
        self
    }

    #[inline]
    pub fn order(&self) -> Endianness {
        self.order
    }

    #[inline]
    pub fn set_order(&mut self, order: Endianness) {
        self.order = order;
    }

    /// Total size of the underlying region
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.as_ref().len()
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Set the limit, clamping the position to it
    ///
    /// # Panics
    ///
    /// Panics if `limit` is larger than the capacity
    pub fn set_limit(&mut self, limit: usize) {
        assert!(limit <= self.capacity(), "limit {limit} beyond capacity");
        self.limit = limit;
        self.position = self.position.min(limit);
    }

    /// Number of bytes between the position and the limit
    #[inline]
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// Prepare for reading back what was just written: the limit becomes the position
    /// and the position returns to zero
    #[inline]
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// Return the position to zero, keeping the limit
    #[inline]
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// A read-only window over the bytes between the position and the limit
    ///
    /// Offset 0 of the returned buffer is the current position of this one.
    #[inline]
    pub fn slice(&self) -> ByteBuffer<&[u8]> {
        ByteBuffer::new(&self.data.as_ref()[self.position..self.limit]).with_order(self.order)
    }

    #[inline]
    pub fn get_ref(&self) -> &B {
        &self.data
    }

    #[inline]
    pub fn into_inner(self) -> B {
        self.data
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        match self.order {
            Endianness::Big => self.read_u16::<BigEndian>(),
            Endianness::Little => self.read_u16::<LittleEndian>(),
        }
    }

    pub fn get_u32(&mut self) -> Result<u32> {
        match self.order {
            Endianness::Big => self.read_u32::<BigEndian>(),
            Endianness::Little => self.read_u32::<LittleEndian>(),
        }
    }

    pub fn get_u64(&mut self) -> Result<u64> {
        match self.order {
            Endianness::Big => self.read_u64::<BigEndian>(),
            Endianness::Little => self.read_u64::<LittleEndian>(),
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteBuffer<B> {
    #[inline]
    pub fn get_mut(&mut self) -> &mut B {
        &mut self.data
    }

    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        match self.order {
            Endianness::Big => self.write_u16::<BigEndian>(value),
            Endianness::Little => self.write_u16::<LittleEndian>(value),
        }
    }

    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        match self.order {
            Endianness::Big => self.write_u32::<BigEndian>(value),
            Endianness::Little => self.write_u32::<LittleEndian>(value),
        }
    }

    pub fn put_u64(&mut self, value: u64) -> Result<()> {
        match self.order {
            Endianness::Big => self.write_u64::<BigEndian>(value),
            Endianness::Little => self.write_u64::<LittleEndian>(value),
        }
    }
}

impl<B: AsRef<[u8]>> ByteSource for ByteBuffer<B> {
    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        if dst.len() > self.remaining() {
            return Err(Error::TruncatedInput {
                offset: self.position as u64,
                requested: dst.len(),
            });
        }
        let end = self.position + dst.len();
        dst.copy_from_slice(&self.data.as_ref()[self.position..end]);
        self.position = end;
        Ok(())
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position as u64
    }

    fn position_at(&mut self, offset: u64) -> Result<()> {
        match usize::try_from(offset) {
            Ok(offset) if offset <= self.limit => {
                self.position = offset;
                Ok(())
            }
            _ => Err(Error::TruncatedInput {
                offset,
                requested: 0,
            }),
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteSink for ByteBuffer<B> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.remaining() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!(
                    "{} bytes do not fit in the {} remaining",
                    bytes.len(),
                    self.remaining()
                ),
            )
            .into());
        }
        let end = self.position + bytes.len();
        self.data.as_mut()[self.position..end].copy_from_slice(bytes);
        self.position = end;
        Ok(())
    }
}
