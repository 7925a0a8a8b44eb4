use std::io::{self, Read, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt};

use super::{ByteSink, ByteSource};
use crate::{Error, Result};

/// Adapts any [`Write`] into a [`ByteSink`]
#[derive(Debug)]
pub struct StreamSink<W> {
    inner: W,
    written: u64,
}

impl<W: Write> StreamSink<W> {
    #[inline]
    pub fn new(inner: W) -> Self {
        StreamSink { inner, written: 0 }
    }

    /// Number of bytes written through this sink so far
    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for StreamSink<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn write_u16<E: ByteOrder>(&mut self, value: u16) -> Result<()> {
        WriteBytesExt::write_u16::<E>(&mut self.inner, value)?;
        self.written += 2;
        Ok(())
    }

    fn write_u32<E: ByteOrder>(&mut self, value: u32) -> Result<()> {
        WriteBytesExt::write_u32::<E>(&mut self.inner, value)?;
        self.written += 4;
        Ok(())
    }
}

/// Adapts any [`Read`] into a [`ByteSource`]
///
/// Streams cannot rewind: [`ByteSource::position_at`] only moves forwards, discarding
/// the skipped bytes.
#[derive(Debug)]
pub struct StreamSource<R> {
    inner: R,
    position: u64,
}

impl<R: Read> StreamSource<R> {
    #[inline]
    pub fn new(inner: R) -> Self {
        StreamSource { inner, position: 0 }
    }

    #[inline]
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn truncation(&self, err: io::Error, requested: usize) -> Error {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::TruncatedInput {
                offset: self.position,
                requested,
            }
        } else {
            Error::Io(err)
        }
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        self.inner
            .read_exact(dst)
            .map_err(|e| self.truncation(e, dst.len()))?;
        self.position += dst.len() as u64;
        Ok(())
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position
    }

    fn position_at(&mut self, offset: u64) -> Result<()> {
        if offset < self.position {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "cannot seek backwards in a stream",
            )
            .into());
        }
        let wanted = offset - self.position;
        let skipped = io::copy(&mut (&mut self.inner).take(wanted), &mut io::sink())?;
        self.position += skipped;
        if skipped < wanted {
            return Err(Error::TruncatedInput {
                offset: self.position,
                requested: (wanted - skipped) as usize,
            });
        }
        Ok(())
    }

    fn read_u16<E: ByteOrder>(&mut self) -> Result<u16> {
        let value = ReadBytesExt::read_u16::<E>(&mut self.inner).map_err(|e| self.truncation(e, 2))?;
        self.position += 2;
        Ok(value)
    }

    fn read_u32<E: ByteOrder>(&mut self) -> Result<u32> {
        let value = ReadBytesExt::read_u32::<E>(&mut self.inner).map_err(|e| self.truncation(e, 4))?;
        self.position += 4;
        Ok(value)
    }
}

#[cfg(test)]
mod test {
    use byteorder::LittleEndian;
    use std::io::Cursor;

    use super::*;

    #[test]
    fn eof_is_truncation() {
        let mut source = StreamSource::new(Cursor::new(vec![1u8, 0, 0]));
        assert_eq!(source.read_u16::<LittleEndian>().unwrap(), 1);
        match source.read_u32::<LittleEndian>() {
            Err(Error::TruncatedInput { offset, requested }) => {
                assert_eq!(offset, 2);
                assert_eq!(requested, 4);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn seeks_forward_only() {
        let mut source = StreamSource::new(Cursor::new(vec![0u8, 1, 2, 3, 4]));
        source.position_at(3).unwrap();
        let mut byte = [0];
        source.read_bytes(&mut byte).unwrap();
        assert_eq!(byte, [3]);
        assert!(source.position_at(1).is_err());
        assert!(matches!(
            source.position_at(10),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn sink_counts_bytes() {
        let mut sink = StreamSink::new(Vec::new());
        sink.write_u32::<LittleEndian>(12346).unwrap();
        sink.write_bytes(&[1, 2]).unwrap();
        assert_eq!(sink.bytes_written(), 6);
        assert_eq!(sink.into_inner(), vec![0x3a, 0x30, 0, 0, 1, 2]);
    }
}
