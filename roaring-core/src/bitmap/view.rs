use std::fmt;

use tracing::trace;

use super::serialization::ViewDeserializer;
use super::{split, Bitmap, BitmapView};
use crate::container::Container;
use crate::io::{ByteBuffer, ByteSource};
use crate::serialization::Header;
use crate::{Error, Result};

impl<'a> BitmapView<'a> {
    /// Read the header of `data` and locate every container body
    ///
    /// Bodies are located through the offset table when the blob has one, and by walking
    /// the bodies in order otherwise. Every body must lie within `data`.
    pub(crate) fn parse(data: &'a [u8]) -> Result<Self> {
        let mut source = ByteBuffer::new(data);
        let header = Header::read(&mut source)?;

        let mut offsets = Vec::with_capacity(header.len());
        let mut next = source.position();
        let mut len = next;
        for (i, descriptor) in header.descriptors.iter().enumerate() {
            let offset = match &header.offsets {
                Some(table) => u64::from(table[i]),
                None => next,
            };
            source.position_at(offset)?;
            let size = Container::body_size(&mut source, descriptor.is_run, descriptor.cardinality)?;
            let end = offset + size as u64;
            if end > data.len() as u64 {
                return Err(Error::TruncatedInput {
                    offset,
                    requested: size,
                });
            }
            offsets.push(offset as u32);
            next = end;
            len = len.max(end);
        }
        trace!(containers = header.len(), bytes = len, "parsed bitmap view");

        Ok(BitmapView {
            data,
            header,
            offsets,
            len: len as usize,
        })
    }

    /// Create a bitmap view of a slice of data without copying
    ///
    /// Only the header is decoded up front; container bodies are decoded when queried.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::{Bitmap, BitmapView, Portable};
    /// let orig_bitmap = Bitmap::of(&[1, 2, 3, 4]);
    /// let data: Vec<u8> = orig_bitmap.serialize::<Portable>();
    /// let view = BitmapView::deserialize::<Portable>(&data).unwrap();
    /// assert_eq!(view.cardinality(), 4);
    /// assert!(view.contains(3).unwrap());
    /// assert_eq!(view.to_bitmap().unwrap(), orig_bitmap);
    /// ```
    pub fn deserialize<S: ViewDeserializer>(data: &'a [u8]) -> Result<Self> {
        S::deserialize_view(data)
    }

    /// Number of values, read from the container descriptors
    #[inline]
    pub fn cardinality(&self) -> u64 {
        self.header
            .descriptors
            .iter()
            .map(|d| u64::from(d.cardinality))
            .sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.header.descriptors.is_empty()
    }

    /// Length of the serialized bitmap within the viewed data
    #[inline]
    pub fn serialized_size_in_bytes(&self) -> usize {
        self.len
    }

    /// The keys of the stored containers, ascending
    pub fn keys(&self) -> impl Iterator<Item = u16> + '_ {
        self.header.descriptors.iter().map(|d| d.key)
    }

    /// Decode the container stored for `key`, if any
    pub fn container(&self, key: u16) -> Result<Option<Container>> {
        match self
            .header
            .descriptors
            .binary_search_by_key(&key, |d| d.key)
        {
            Ok(index) => self.decode(index).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn decode(&self, index: usize) -> Result<Container> {
        let descriptor = &self.header.descriptors[index];
        let mut source = ByteBuffer::new(self.data);
        source.position_at(u64::from(self.offsets[index]))?;
        trace!(key = descriptor.key, "decoding container from view");
        Container::decode(&mut source, descriptor.is_run, descriptor.cardinality)
    }

    /// Returns true if the value is present, decoding at most one container
    ///
    /// ```
    /// use roaring_core::{Bitmap, BitmapView, Portable};
    ///
    /// let data = Bitmap::of(&[5, 70_000]).serialize::<Portable>();
    /// let view = BitmapView::deserialize::<Portable>(&data).unwrap();
    ///
    /// assert!(view.contains(70_000).unwrap());
    /// assert!(!view.contains(70_001).unwrap());
    /// assert!(!view.contains(1 << 20).unwrap());
    /// ```
    pub fn contains(&self, value: u32) -> Result<bool> {
        let (key, low) = split(value);
        Ok(self
            .container(key)?
            .map_or(false, |container| container.contains(low)))
    }

    /// Create an owned, mutable bitmap from this view
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::{Bitmap, BitmapView, Portable};
    ///
    /// let orig_bitmap = Bitmap::of(&[1, 2, 3, 4]);
    /// let data = orig_bitmap.serialize::<Portable>();
    /// let view: BitmapView = BitmapView::deserialize::<Portable>(&data).unwrap();
    /// let mut mutable_bitmap: Bitmap = view.to_bitmap().unwrap();
    /// assert_eq!(orig_bitmap, mutable_bitmap);
    /// mutable_bitmap.add(10);
    /// assert!(!view.contains(10).unwrap());
    /// assert!(mutable_bitmap.contains(10));
    /// ```
    pub fn to_bitmap(&self) -> Result<Bitmap> {
        let containers = (0..self.header.len())
            .map(|i| Ok((self.header.descriptors[i].key, self.decode(i)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Bitmap::from_containers(containers))
    }
}

impl fmt::Debug for BitmapView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapView")
            .field("version", &self.header.version)
            .field("containers", &self.header.len())
            .field("cardinality", &self.cardinality())
            .field("bytes", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Portable;

    fn bitmap_with(containers: u32, runs: bool) -> Bitmap {
        let mut bitmap = Bitmap::new();
        for key in 0..containers {
            bitmap.add_range(key << 16..(key << 16) + 100);
        }
        if !runs {
            bitmap.remove_run_compression();
        }
        bitmap
    }

    #[test]
    fn locates_bodies_with_and_without_offsets() {
        for (containers, runs) in [(0, false), (2, false), (3, true), (5, true)] {
            let bitmap = bitmap_with(containers, runs);
            let mut data = bitmap.serialize::<Portable>();
            data.extend_from_slice(&[0; 3]);

            let view = BitmapView::deserialize::<Portable>(&data).unwrap();
            assert_eq!(view.serialized_size_in_bytes(), data.len() - 3);
            assert_eq!(view.cardinality(), bitmap.cardinality());
            assert_eq!(view.keys().count(), containers as usize);
            assert_eq!(view.to_bitmap().unwrap(), bitmap);
            for key in 0..containers {
                assert!(view.contains(key << 16 | 99).unwrap());
                assert!(!view.contains(key << 16 | 100).unwrap());
            }
        }
    }

    #[test]
    fn rejects_bodies_past_the_end() {
        let bitmap = bitmap_with(3, true);
        let data = bitmap.serialize::<Portable>();
        assert!(matches!(
            BitmapView::deserialize::<Portable>(&data[..data.len() - 2]),
            Err(Error::TruncatedInput { .. })
        ));
    }
}
