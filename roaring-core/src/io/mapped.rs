use std::fs::File;

use memmap2::{Mmap, MmapMut, MmapOptions};

use super::{ByteBuffer, ByteSink, ByteSource, Endianness};
use crate::Result;

/// A memory-mapped file region used as a byte source or sink
///
/// `MappedRegion<MmapMut>` is writable, `MappedRegion<Mmap>` is read-only. Both behave
/// like a [`ByteBuffer`] over the mapped bytes.
#[derive(Debug)]
pub struct MappedRegion<M> {
    buffer: ByteBuffer<M>,
}

impl MappedRegion<MmapMut> {
    /// Map the first `len` bytes of `file` for writing, growing the file if it is shorter
    pub fn create(file: &File, len: usize) -> Result<Self> {
        if file.metadata()?.len() < len as u64 {
            file.set_len(len as u64)?;
        }
        // The mapping stays valid only while no other process truncates the file.
        let map = unsafe { MmapOptions::new().len(len).map_mut(file)? };
        Ok(MappedRegion {
            buffer: ByteBuffer::new(map),
        })
    }

    /// Flush written bytes back to the file
    pub fn flush(&self) -> Result<()> {
        self.buffer.get_ref().flush()?;
        Ok(())
    }
}

impl MappedRegion<Mmap> {
    /// Map the whole of `file` for reading
    pub fn open(file: &File) -> Result<Self> {
        let map = unsafe { Mmap::map(file)? };
        Ok(MappedRegion {
            buffer: ByteBuffer::new(map),
        })
    }
}

impl<M: AsRef<[u8]>> MappedRegion<M> {
    #[inline]
    #[must_use]
    pub fn with_order(self, order: Endianness) -> Self {
        MappedRegion {
            buffer: self.buffer.with_order(order),
        }
    }

    #[inline]
    pub fn buffer(&self) -> &ByteBuffer<M> {
        &self.buffer
    }

    #[inline]
    pub fn buffer_mut(&mut self) -> &mut ByteBuffer<M> {
        &mut self.buffer
    }
}

impl<M: AsRef<[u8]>> ByteSource for MappedRegion<M> {
    #[inline]
    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        self.buffer.read_bytes(dst)
    }

    #[inline]
    fn position(&self) -> u64 {
        self.buffer.position()
    }

    #[inline]
    fn position_at(&mut self, offset: u64) -> Result<()> {
        self.buffer.position_at(offset)
    }
}

impl<M: AsRef<[u8]> + AsMut<[u8]>> ByteSink for MappedRegion<M> {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.write_bytes(bytes)
    }
}
