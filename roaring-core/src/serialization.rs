//! Layout of the portable format header.
//!
//! ```text
//! cookie        u32   12346, followed by a u32 container count
//!                     or 12347 | (count - 1) << 16, followed by a run bitset
//! run bitset    (count + 7) / 8 bytes, bit i set when container i is a run container
//! descriptors   count * (u16 key, u16 cardinality - 1)
//! offsets       count * u32, absent when runs are present and count < 4
//! bodies        one per container, in key order
//! ```
//!
//! Every multi-byte field is little-endian regardless of how the bytes are stored.

use byteorder::LittleEndian;

use crate::io::{ByteSink, ByteSource};
use crate::{Error, Result};

/// Cookie of a blob without run containers
pub const SERIAL_COOKIE_NO_RUNCONTAINER: u32 = 12346;

/// Cookie of a blob with at least one run container, in the low 16 bits
pub const SERIAL_COOKIE: u32 = 12347;

/// Run-format blobs with fewer containers than this omit the offset table
pub const NO_OFFSET_THRESHOLD: usize = 4;

/// There is at most one container per 16-bit key
pub const MAX_CONTAINERS: usize = 1 << 16;

/// The `Portable` format is meant to be compatible with other roaring bitmap libraries, such as Go or Java.
///
/// It's defined here: <https://github.com/RoaringBitmap/RoaringFormatSpec>
pub enum Portable {}

/// Which of the two header layouts a blob uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// Cookie 12346: no run containers, always with an offset table
    NoRuns,
    /// Cookie 12347: a run bitset, and offsets only for four containers or more
    WithRuns,
}

impl FormatVersion {
    #[inline]
    pub fn has_offsets(self, containers: usize) -> bool {
        match self {
            FormatVersion::NoRuns => true,
            FormatVersion::WithRuns => containers >= NO_OFFSET_THRESHOLD,
        }
    }

    /// Bytes taken by everything before the first container body
    pub fn header_size(self, containers: usize) -> usize {
        let prefix = match self {
            FormatVersion::NoRuns => 8,
            FormatVersion::WithRuns => 4 + (containers + 7) / 8,
        };
        let offsets = if self.has_offsets(containers) {
            4 * containers
        } else {
            0
        };
        prefix + 4 * containers + offsets
    }
}

/// One entry of the descriptor table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Descriptor {
    pub key: u16,
    pub cardinality: u32,
    pub is_run: bool,
}

/// The decoded header of a portable blob
#[derive(Debug, Clone)]
pub(crate) struct Header {
    pub version: FormatVersion,
    pub descriptors: Vec<Descriptor>,
    /// Body offsets relative to the start of the blob, when the blob stores them
    pub offsets: Option<Vec<u32>>,
}

impl Header {
    /// Read a header, leaving `source` at the first container body
    pub fn read<S: ByteSource>(source: &mut S) -> Result<Self> {
        let cookie = source.read_u32::<LittleEndian>()?;
        let (version, count) = if cookie == SERIAL_COOKIE_NO_RUNCONTAINER {
            let count = source.read_u32::<LittleEndian>()? as usize;
            if count > MAX_CONTAINERS {
                return Err(Error::UnsupportedLayout(
                    "container count exceeds the 16-bit key space",
                ));
            }
            (FormatVersion::NoRuns, count)
        } else if cookie & 0xFFFF == SERIAL_COOKIE {
            (FormatVersion::WithRuns, (cookie >> 16) as usize + 1)
        } else if cookie & 0xFFFF == SERIAL_COOKIE_NO_RUNCONTAINER {
            return Err(Error::UnsupportedLayout(
                "no-run cookie with a non-zero upper half",
            ));
        } else {
            return Err(Error::MalformedHeader { cookie });
        };

        let mut run_flags = vec![0; if version == FormatVersion::WithRuns { (count + 7) / 8 } else { 0 }];
        source.read_bytes(&mut run_flags)?;

        let mut raw = vec![0; 4 * count];
        source.read_bytes(&mut raw)?;
        let mut descriptors = Vec::with_capacity(count);
        for (i, chunk) in raw.chunks_exact(4).enumerate() {
            let key = u16::from_le_bytes([chunk[0], chunk[1]]);
            let cardinality = u32::from(u16::from_le_bytes([chunk[2], chunk[3]])) + 1;
            if let Some(prev) = descriptors.last().map(|d: &Descriptor| d.key) {
                if key <= prev {
                    return Err(Error::InvalidContainer("keys are not strictly ascending"));
                }
            }
            descriptors.push(Descriptor {
                key,
                cardinality,
                is_run: run_flags.get(i / 8).map_or(false, |b| b & (1 << (i % 8)) != 0),
            });
        }

        let offsets = if version.has_offsets(count) {
            let mut offsets = Vec::with_capacity(count);
            for _ in 0..count {
                offsets.push(source.read_u32::<LittleEndian>()?);
            }
            Some(offsets)
        } else {
            None
        };

        Ok(Header {
            version,
            descriptors,
            offsets,
        })
    }

    /// Write a header for containers described by `descriptors` whose bodies have the given
    /// sizes
    pub fn write<S: ByteSink>(
        sink: &mut S,
        descriptors: &[Descriptor],
        body_sizes: impl Iterator<Item = usize>,
    ) -> Result<()> {
        let count = descriptors.len();
        let version = if descriptors.iter().any(|d| d.is_run) {
            FormatVersion::WithRuns
        } else {
            FormatVersion::NoRuns
        };

        match version {
            FormatVersion::NoRuns => {
                sink.write_u32::<LittleEndian>(SERIAL_COOKIE_NO_RUNCONTAINER)?;
                sink.write_u32::<LittleEndian>(count as u32)?;
            }
            FormatVersion::WithRuns => {
                sink.write_u32::<LittleEndian>(SERIAL_COOKIE | ((count as u32 - 1) << 16))?;
                let mut run_flags = vec![0u8; (count + 7) / 8];
                for (i, d) in descriptors.iter().enumerate() {
                    if d.is_run {
                        run_flags[i / 8] |= 1 << (i % 8);
                    }
                }
                sink.write_bytes(&run_flags)?;
            }
        }

        let mut raw = Vec::with_capacity(4 * count);
        for d in descriptors {
            raw.extend_from_slice(&d.key.to_le_bytes());
            raw.extend_from_slice(&((d.cardinality - 1) as u16).to_le_bytes());
        }
        sink.write_bytes(&raw)?;

        if version.has_offsets(count) {
            let mut offset = version.header_size(count);
            let mut raw = Vec::with_capacity(4 * count);
            for size in body_sizes {
                raw.extend_from_slice(&(offset as u32).to_le_bytes());
                offset += size;
            }
            sink.write_bytes(&raw)?;
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::ByteBuffer;

    fn descriptor(key: u16, cardinality: u32, is_run: bool) -> Descriptor {
        Descriptor {
            key,
            cardinality,
            is_run,
        }
    }

    #[test]
    fn header_sizes() {
        assert_eq!(FormatVersion::NoRuns.header_size(0), 8);
        assert_eq!(FormatVersion::NoRuns.header_size(1), 16);
        assert_eq!(FormatVersion::WithRuns.header_size(1), 9);
        assert_eq!(FormatVersion::WithRuns.header_size(3), 4 + 1 + 12);
        assert_eq!(FormatVersion::WithRuns.header_size(4), 4 + 1 + 16 + 16);
        assert_eq!(FormatVersion::WithRuns.header_size(9), 4 + 2 + 36 + 36);
    }

    #[test]
    fn no_run_header() {
        let descriptors = [descriptor(0, 3, false), descriptor(7, 4097, false)];
        let mut bytes = Vec::new();
        Header::write(&mut bytes, &descriptors, [6, 8192].into_iter()).unwrap();
        assert_eq!(
            bytes,
            [
                0x3a, 0x30, 0, 0, 2, 0, 0, 0, // cookie, count
                0, 0, 2, 0, 7, 0, 0, 0x10, // descriptors
                24, 0, 0, 0, 30, 0, 0, 0, // offsets
            ]
        );

        let header = Header::read(&mut ByteBuffer::new(&bytes)).unwrap();
        assert_eq!(header.version, FormatVersion::NoRuns);
        assert_eq!(header.descriptors, descriptors);
        assert_eq!(header.offsets, Some(vec![24, 30]));
    }

    #[test]
    fn run_header_without_offsets() {
        let descriptors = [descriptor(1, 10, true), descriptor(2, 1, false)];
        let mut bytes = Vec::new();
        Header::write(&mut bytes, &descriptors, [6, 2].into_iter()).unwrap();
        assert_eq!(
            bytes,
            [0x3b, 0x30, 1, 0, 0b01, 1, 0, 9, 0, 2, 0, 0, 0]
        );

        let header = Header::read(&mut ByteBuffer::new(&bytes)).unwrap();
        assert_eq!(header.version, FormatVersion::WithRuns);
        assert_eq!(header.descriptors, descriptors);
        assert_eq!(header.offsets, None);
    }

    #[test]
    fn rejects_unknown_cookies() {
        let bytes = 0xdead_beef_u32.to_le_bytes();
        assert!(matches!(
            Header::read(&mut ByteBuffer::new(&bytes)),
            Err(Error::MalformedHeader { cookie: 0xdead_beef })
        ));

        let bytes = (SERIAL_COOKIE_NO_RUNCONTAINER | 1 << 16).to_le_bytes();
        assert!(matches!(
            Header::read(&mut ByteBuffer::new(&bytes)),
            Err(Error::UnsupportedLayout(_))
        ));
    }

    #[test]
    fn rejects_oversized_count() {
        let mut bytes = SERIAL_COOKIE_NO_RUNCONTAINER.to_le_bytes().to_vec();
        bytes.extend_from_slice(&(MAX_CONTAINERS as u32 + 1).to_le_bytes());
        assert!(matches!(
            Header::read(&mut ByteBuffer::new(&bytes)),
            Err(Error::UnsupportedLayout(_))
        ));
    }

    #[test]
    fn rejects_unsorted_keys() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&SERIAL_COOKIE_NO_RUNCONTAINER.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[5, 0, 0, 0, 5, 0, 0, 0]);
        assert!(matches!(
            Header::read(&mut ByteBuffer::new(&bytes)),
            Err(Error::InvalidContainer(_))
        ));
    }
}
