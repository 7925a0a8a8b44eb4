use std::cmp::Ordering;
use std::ops::{Bound, RangeBounds};

use tracing::trace;

use super::{join, split, Bitmap, Deserializer, Serializer, Statistics};
use crate::container::{Container, ContainerKind};
use crate::io::{ByteBuffer, ByteSink, ByteSource};
use crate::Result;

impl Bitmap {
    /// Creates a new bitmap (initially empty)
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap = Bitmap::new();
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Bitmap {
            containers: Vec::new(),
        }
    }

    /// Alias of [`Bitmap::new`]
    #[inline]
    pub fn create() -> Self {
        Self::new()
    }

    /// Creates a new bitmap (initially empty) with room for `capacity` containers
    /// (it is a performance hint).
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap = Bitmap::create_with_capacity(100);
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn create_with_capacity(capacity: u32) -> Self {
        Bitmap {
            containers: Vec::with_capacity(capacity as usize),
        }
    }

    #[inline]
    pub(crate) fn from_containers(containers: Vec<(u16, Container)>) -> Self {
        debug_assert!(containers.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(containers.iter().all(|(_, c)| !c.is_empty()));
        Bitmap { containers }
    }

    /// The `(key, container)` entries in ascending key order
    #[inline]
    pub fn containers(&self) -> &[(u16, Container)] {
        &self.containers
    }

    #[inline]
    fn index_of(&self, key: u16) -> std::result::Result<usize, usize> {
        self.containers.binary_search_by_key(&key, |&(k, _)| k)
    }

    #[inline]
    fn container(&self, key: u16) -> Option<&Container> {
        self.index_of(key).ok().map(|i| &self.containers[i].1)
    }

    /// Index of the container for `key`, inserting an empty one if missing
    ///
    /// The caller must add at least one value to an inserted container.
    fn index_or_insert(&mut self, key: u16) -> usize {
        match self.index_of(key) {
            Ok(index) => index,
            Err(index) => {
                self.containers.insert(index, (key, Container::new()));
                index
            }
        }
    }

    /// Creates a new bitmap from a slice of u32 integers
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let elements = vec![1, 2];
    ///
    /// let bitmap = Bitmap::of(&elements);
    ///
    /// let mut bitmap2 = Bitmap::new();
    ///
    /// for element in &elements {
    ///     bitmap2.add(*element);
    /// }
    ///
    /// assert!(bitmap.contains(1));
    /// assert!(bitmap.contains(2));
    /// assert!(!bitmap.contains(3));
    /// assert_eq!(bitmap, bitmap2);
    /// ```
    #[inline]
    pub fn of(elements: &[u32]) -> Self {
        let mut bitmap = Self::new();
        bitmap.add_many(elements);
        bitmap
    }

    /// Add the integer elements to the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add_many(&[1, 2, 3]);
    ///
    /// assert!(!bitmap.is_empty());
    /// assert!(bitmap.contains(1));
    /// assert!(bitmap.contains(2));
    /// assert!(bitmap.contains(3));
    /// ```
    pub fn add_many(&mut self, elements: &[u32]) {
        let mut last: Option<(u16, usize)> = None;
        for &element in elements {
            let (key, low) = split(element);
            let index = match last {
                Some((last_key, index)) if last_key == key => index,
                _ => self.index_or_insert(key),
            };
            self.containers[index].1.add(low);
            last = Some((key, index));
        }
    }

    /// Add the integer element to the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// assert!(bitmap.is_empty());
    /// bitmap.add(1);
    /// assert!(!bitmap.is_empty());
    /// ```
    #[inline]
    pub fn add(&mut self, element: u32) {
        self.add_checked(element);
    }

    /// Add the integer element to the bitmap. Returns true if the value was
    /// added, false if the value was already in the bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// assert!(bitmap.add_checked(1));
    /// assert!(!bitmap.add_checked(1));
    /// ```
    #[inline]
    pub fn add_checked(&mut self, element: u32) -> bool {
        let (key, low) = split(element);
        let index = self.index_or_insert(key);
        self.containers[index].1.add(low)
    }

    /// Add all values in range
    ///
    /// Containers created from scratch take their most compact form, which for long
    /// ranges is a run container.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::new();
    /// bitmap1.add_range((1..3));
    ///
    /// assert!(!bitmap1.is_empty());
    /// assert!(bitmap1.contains(1));
    /// assert!(bitmap1.contains(2));
    /// assert!(!bitmap1.contains(3));
    ///
    /// let mut bitmap2 = Bitmap::new();
    /// bitmap2.add_range((3..1));
    /// assert!(bitmap2.is_empty());
    ///
    /// let mut bitmap3 = Bitmap::new();
    /// bitmap3.add_range((3..3));
    /// assert!(bitmap3.is_empty());
    ///
    /// let mut bitmap4 = Bitmap::new();
    /// bitmap4.add_range(..=2);
    /// bitmap4.add_range(u32::MAX..=u32::MAX);
    /// assert!(bitmap4.contains(0));
    /// assert!(bitmap4.contains(1));
    /// assert!(bitmap4.contains(2));
    /// assert!(bitmap4.contains(u32::MAX));
    /// assert_eq!(bitmap4.cardinality(), 4);
    /// ```
    pub fn add_range<R: RangeBounds<u32>>(&mut self, range: R) {
        let (start, end) = range_to_inclusive(range);
        if start > end {
            return;
        }
        let (start_key, start_low) = split(start);
        let (end_key, end_low) = split(end);
        for key in start_key..=end_key {
            let lo = if key == start_key { start_low } else { 0 };
            let hi = if key == end_key { end_low } else { u16::MAX };
            match self.index_of(key) {
                Ok(index) => self.containers[index].1.add_range(lo, hi),
                Err(index) => self
                    .containers
                    .insert(index, (key, Container::from_range(lo, hi))),
            }
        }
    }

    /// Remove all values in range
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add_range((1..4));
    /// assert!(!bitmap.is_empty());
    ///
    /// bitmap.remove_range((1..3));
    ///
    /// assert!(!bitmap.contains(1));
    /// assert!(!bitmap.contains(2));
    /// assert!(bitmap.contains(3));
    ///
    /// bitmap.remove_range(..);
    /// assert!(bitmap.is_empty());
    /// ```
    pub fn remove_range<R: RangeBounds<u32>>(&mut self, range: R) {
        let (start, end) = range_to_inclusive(range);
        if start > end {
            return;
        }
        let (start_key, start_low) = split(start);
        let (end_key, end_low) = split(end);
        self.containers.retain_mut(|(key, container)| {
            if *key < start_key || *key > end_key {
                return true;
            }
            let lo = if *key == start_key { start_low } else { 0 };
            let hi = if *key == end_key { end_low } else { u16::MAX };
            container.remove_range(lo, hi);
            !container.is_empty()
        });
    }

    /// Check whether every value of range is present
    ///
    /// An empty range is always contained.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap = Bitmap::of(&[1, 2]);
    /// assert!(bitmap.contains_range((1..3)));
    /// assert!(!bitmap.contains_range((1..4)));
    ///
    /// let mut bitmap = bitmap.clone();
    /// bitmap.add(u32::MAX - 1);
    /// bitmap.add(u32::MAX);
    /// assert!(bitmap.contains_range((u32::MAX - 1)..=u32::MAX))
    /// ```
    pub fn contains_range<R: RangeBounds<u32>>(&self, range: R) -> bool {
        let (start, end) = range_to_inclusive(range);
        if start > end {
            return true;
        }
        let (start_key, start_low) = split(start);
        let (end_key, end_low) = split(end);
        (start_key..=end_key).all(|key| {
            let lo = if key == start_key { start_low } else { 0 };
            let hi = if key == end_key { end_low } else { u16::MAX };
            self.container(key)
                .map_or(false, |container| container.contains_range(lo, hi))
        })
    }

    /// Empties the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add(1);
    /// bitmap.add(2);
    /// bitmap.clear();
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.containers.clear();
    }

    /// Clear the integer element from the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add(1);
    /// bitmap.remove(1);
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn remove(&mut self, element: u32) {
        self.remove_checked(element);
    }

    /// Remove the integer element from the bitmap. Returns true if the value
    /// was removed, false if the value was not present in the bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add(1);
    /// assert!(bitmap.remove_checked(1));
    /// assert!(!bitmap.remove_checked(1));
    /// ```
    pub fn remove_checked(&mut self, element: u32) -> bool {
        let (key, low) = split(element);
        let Ok(index) = self.index_of(key) else {
            return false;
        };
        let container = &mut self.containers[index].1;
        let removed = container.remove(low);
        if container.is_empty() {
            self.containers.remove(index);
        }
        removed
    }

    /// Contains returns true if the integer element is contained in the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap = Bitmap::of(&[1]);
    ///
    /// assert!(bitmap.contains(1));
    /// assert!(!bitmap.contains(2));
    /// ```
    #[inline]
    pub fn contains(&self, element: u32) -> bool {
        let (key, low) = split(element);
        self.container(key)
            .map_or(false, |container| container.contains(low))
    }

    /// Returns number of elements in range
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap = Bitmap::of(&[1, 3, 4]);
    ///
    /// assert_eq!(bitmap.range_cardinality((..1)), 0);
    /// assert_eq!(bitmap.range_cardinality((..2)), 1);
    /// assert_eq!(bitmap.range_cardinality((2..5)), 2);
    /// assert_eq!(bitmap.range_cardinality((..5)), 3);
    /// assert_eq!(bitmap.range_cardinality((1..=4)), 3);
    /// ```
    pub fn range_cardinality<R: RangeBounds<u32>>(&self, range: R) -> u64 {
        let (start, end) = range_to_inclusive(range);
        if start > end {
            return 0;
        }
        let below = match start.checked_sub(1) {
            Some(before) => self.rank(before),
            None => 0,
        };
        self.rank(end) - below
    }

    /// Returns the number of integers contained in the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap = Bitmap::of(&[1]);
    ///
    /// assert_eq!(bitmap.cardinality(), 1);
    ///
    /// let mut bitmap = bitmap.clone();
    ///
    /// bitmap.add(2);
    ///
    /// assert_eq!(bitmap.cardinality(), 2);
    /// ```
    #[inline]
    pub fn cardinality(&self) -> u64 {
        self.containers
            .iter()
            .map(|(_, c)| c.cardinality() as u64)
            .sum()
    }

    /// And computes the intersection between two bitmaps and returns the result
    /// as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1]);
    /// let bitmap2 = Bitmap::of(&[1, 2]);
    ///
    /// let bitmap3 = bitmap1.and(&bitmap2);
    ///
    /// assert!(bitmap3.contains(1));
    /// assert!(!bitmap3.contains(2));
    /// ```
    pub fn and(&self, other: &Self) -> Self {
        let mut containers = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.containers.len() && j < other.containers.len() {
            let (key, left) = &self.containers[i];
            let (other_key, right) = &other.containers[j];
            match key.cmp(other_key) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    let container = left.and(right);
                    if !container.is_empty() {
                        containers.push((*key, container));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        Bitmap { containers }
    }

    /// Computes the intersection between two bitmaps and stores the result
    /// in the current bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    /// let mut bitmap3 = Bitmap::of(&[15]);
    /// let bitmap4 = Bitmap::of(&[15, 25]);
    ///
    /// bitmap1.and_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 0);
    /// assert!(!bitmap1.contains(15));
    /// assert!(!bitmap1.contains(25));
    ///
    /// bitmap3.and_inplace(&bitmap4);
    ///
    /// assert_eq!(bitmap3.cardinality(), 1);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// ```
    pub fn and_inplace(&mut self, other: &Self) {
        let mut theirs = other.containers.iter().peekable();
        self.containers.retain_mut(|(key, container)| {
            while theirs.next_if(|(k, _)| *k < *key).is_some() {}
            match theirs.next_if(|(k, _)| *k == *key) {
                Some((_, other)) => {
                    container.and_inplace(other);
                    !container.is_empty()
                }
                None => false,
            }
        });
    }

    /// Or computes the union between two bitmaps and returns the result
    /// as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    ///
    /// let bitmap3 = bitmap1.or(&bitmap2);
    ///
    /// assert_eq!(bitmap3.cardinality(), 2);
    /// assert!(bitmap3.contains(15));
    /// assert!(bitmap3.contains(25));
    /// ```
    pub fn or(&self, other: &Self) -> Self {
        merge(self, other, |left, right| Some(left.or(right)))
    }

    /// Computes the union between two bitmaps and stores the result in
    /// the current bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    ///
    /// bitmap1.or_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 2);
    /// assert!(bitmap1.contains(15));
    /// assert!(bitmap1.contains(25));
    /// ```
    pub fn or_inplace(&mut self, other: &Self) {
        merge_inplace(self, other, |container, other| {
            container.or_inplace(other);
            true
        });
    }

    /// Computes the union between many bitmaps quickly, as opposed to having
    /// to call or() repeatedly. Returns the result as a new bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    /// let bitmap3 = Bitmap::of(&[35]);
    ///
    /// let bitmap4 = Bitmap::fast_or(&[&bitmap1, &bitmap2, &bitmap3]);
    ///
    /// assert_eq!(bitmap4.cardinality(), 3);
    /// assert!(bitmap4.contains(15));
    /// assert!(bitmap4.contains(25));
    /// assert!(bitmap4.contains(35));
    /// ```
    pub fn fast_or(bitmaps: &[&Bitmap]) -> Self {
        let mut result = match bitmaps.first() {
            Some(first) => (*first).clone(),
            None => return Self::new(),
        };
        for bitmap in &bitmaps[1..] {
            result.or_inplace(bitmap);
        }
        result
    }

    /// Computes the symmetric difference (xor) between two bitmaps
    /// and returns a new bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = bitmap1.xor(&bitmap2);
    ///
    /// assert_eq!(bitmap3.cardinality(), 2);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// assert!(bitmap3.contains(35));
    /// ```
    pub fn xor(&self, other: &Self) -> Self {
        merge(self, other, |left, right| {
            Some(left.xor(right)).filter(|c| !c.is_empty())
        })
    }

    /// Inplace version of xor, stores result in the current bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// bitmap1.xor_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 2);
    /// assert!(bitmap1.contains(15));
    /// assert!(bitmap1.contains(35));
    ///
    /// let mut bitmap3 = Bitmap::of(&[15]);
    /// bitmap3.xor_inplace(&Bitmap::of(&[15]));
    /// assert!(bitmap3.is_empty());
    /// ```
    pub fn xor_inplace(&mut self, other: &Self) {
        merge_inplace(self, other, |container, other| {
            container.xor_inplace(other);
            !container.is_empty()
        });
    }

    /// Computes the symmetric difference between many bitmaps
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[15, 25]);
    /// let bitmap3 = Bitmap::of(&[35]);
    ///
    /// let bitmap4 = Bitmap::fast_xor(&[&bitmap1, &bitmap2, &bitmap3]);
    ///
    /// assert_eq!(bitmap4.to_vec(), [25, 35]);
    /// ```
    pub fn fast_xor(bitmaps: &[&Bitmap]) -> Self {
        let mut result = Self::new();
        for bitmap in bitmaps {
            result.xor_inplace(bitmap);
        }
        result
    }

    /// Computes the difference between two bitmaps and returns the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = bitmap1.andnot(&bitmap2);
    ///
    /// assert_eq!(bitmap3.cardinality(), 1);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// assert!(!bitmap3.contains(35));
    /// ```
    pub fn andnot(&self, other: &Self) -> Self {
        let mut theirs = other.containers.iter().peekable();
        let mut containers = Vec::with_capacity(self.containers.len());
        for (key, container) in &self.containers {
            while theirs.next_if(|(k, _)| k < key).is_some() {}
            match theirs.next_if(|(k, _)| k == key) {
                Some((_, other)) => {
                    let result = container.andnot(other);
                    if !result.is_empty() {
                        containers.push((*key, result));
                    }
                }
                None => containers.push((*key, container.clone())),
            }
        }
        Bitmap { containers }
    }

    /// Computes the difference between two bitmaps and stores the result
    /// in the current bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// bitmap1.andnot_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 1);
    /// assert!(bitmap1.contains(15));
    /// assert!(!bitmap1.contains(25));
    /// assert!(!bitmap1.contains(35));
    /// ```
    pub fn andnot_inplace(&mut self, other: &Self) {
        let mut theirs = other.containers.iter().peekable();
        self.containers.retain_mut(|(key, container)| {
            while theirs.next_if(|(k, _)| *k < *key).is_some() {}
            match theirs.next_if(|(k, _)| *k == *key) {
                Some((_, other)) => {
                    container.andnot_inplace(other);
                    !container.is_empty()
                }
                None => true,
            }
        });
    }

    /// Returns a vector containing all of the integers stored in the Bitmap
    /// in sorted order.
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap: Bitmap = (1..5).collect();
    ///
    /// assert_eq!(bitmap.to_vec(), [1, 2, 3, 4]);
    /// ```
    #[inline]
    pub fn to_vec(&self) -> Vec<u32> {
        let mut values = Vec::with_capacity(self.cardinality() as usize);
        values.extend(self.iter());
        values
    }

    /// Computes the serialized size in bytes of the Bitmap in format `S`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::{Bitmap, Portable};
    ///
    /// let bitmap = Bitmap::new();
    /// assert_eq!(bitmap.get_serialized_size_in_bytes::<Portable>(), 8);
    ///
    /// let bitmap = Bitmap::of(&[1, 2, 3]);
    /// assert_eq!(bitmap.get_serialized_size_in_bytes::<Portable>(), 8 + 8 + 6);
    /// ```
    #[inline]
    pub fn get_serialized_size_in_bytes<S: Serializer>(&self) -> usize {
        S::get_serialized_size_in_bytes(self)
    }

    /// Serializes a bitmap to a vector of bytes in format `S`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::{Bitmap, Portable};
    ///
    /// let original_bitmap: Bitmap = (1..5).collect();
    ///
    /// let serialized_buffer = original_bitmap.serialize::<Portable>();
    ///
    /// let deserialized_bitmap = Bitmap::try_deserialize::<Portable>(&serialized_buffer).unwrap();
    ///
    /// assert_eq!(original_bitmap, deserialized_bitmap);
    /// ```
    pub fn serialize<S: Serializer>(&self) -> Vec<u8> {
        let mut dst = Vec::with_capacity(S::get_serialized_size_in_bytes(self));
        S::serialize_into(self, &mut dst).expect("writing to a Vec cannot fail");
        dst
    }

    /// Serializes a bitmap in format `S` into any [`ByteSink`]
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::io::{ByteBuffer, Endianness};
    /// use roaring_core::{Bitmap, Portable};
    ///
    /// let bitmap: Bitmap = (1..5).collect();
    /// let size = bitmap.get_serialized_size_in_bytes::<Portable>();
    ///
    /// let mut buffer = ByteBuffer::allocate(size).with_order(Endianness::Big);
    /// bitmap.serialize_into::<Portable>(&mut buffer).unwrap();
    /// assert_eq!(buffer.remaining(), 0);
    /// assert_eq!(buffer.get_ref(), &bitmap.serialize::<Portable>());
    ///
    /// // A full buffer refuses further writes
    /// assert!(bitmap.serialize_into::<Portable>(&mut buffer).is_err());
    /// ```
    #[inline]
    pub fn serialize_into<S: Serializer>(&self, sink: impl ByteSink) -> Result<()> {
        S::serialize_into(self, sink)
    }

    /// Given a serialized bitmap as slice of bytes in format `D`, returns a `Bitmap` instance.
    ///
    /// Bytes after the serialized bitmap are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::{Bitmap, Error, Portable};
    ///
    /// let original_bitmap: Bitmap = (1..5).collect();
    ///
    /// let serialized_buffer = original_bitmap.serialize::<Portable>();
    ///
    /// let deserialized_bitmap = Bitmap::try_deserialize::<Portable>(&serialized_buffer).unwrap();
    ///
    /// assert_eq!(original_bitmap, deserialized_bitmap);
    ///
    /// let truncated = &serialized_buffer[..serialized_buffer.len() - 1];
    /// assert!(matches!(
    ///     Bitmap::try_deserialize::<Portable>(truncated),
    ///     Err(Error::TruncatedInput { .. })
    /// ));
    /// ```
    #[inline]
    pub fn try_deserialize<D: Deserializer>(buffer: &[u8]) -> Result<Self> {
        D::deserialize_from(ByteBuffer::new(buffer))
    }

    /// Reads a bitmap in format `D` starting at the current position of `source`
    ///
    /// On success the source is positioned right after the serialized bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::io::{ByteBuffer, ByteSource};
    /// use roaring_core::{Bitmap, Portable};
    ///
    /// let bitmap = Bitmap::of(&[7, 70_000]);
    /// let mut bytes = vec![0xAA; 3];
    /// bytes.extend(bitmap.serialize::<Portable>());
    /// bytes.extend([0xBB; 5]);
    ///
    /// let mut buffer = ByteBuffer::new(bytes);
    /// buffer.position_at(3).unwrap();
    /// let decoded = Bitmap::deserialize_from::<Portable>(&mut buffer).unwrap();
    ///
    /// assert_eq!(decoded, bitmap);
    /// assert_eq!(buffer.remaining(), 5);
    /// ```
    #[inline]
    pub fn deserialize_from<D: Deserializer>(source: impl ByteSource) -> Result<Self> {
        D::deserialize_from(source)
    }

    /// Compresses of the bitmap. Returns true if the result has at least one run container.
    ///
    /// Array and bitmap containers become run containers when that is strictly smaller;
    /// run containers that are not the smallest form are converted back.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::{Bitmap, Portable};
    ///
    /// let mut bitmap: Bitmap = (100..1000).collect();
    ///
    /// assert_eq!(bitmap.cardinality(), 900);
    /// let old_size = bitmap.get_serialized_size_in_bytes::<Portable>();
    /// assert!(bitmap.run_optimize());
    /// let new_size = bitmap.get_serialized_size_in_bytes::<Portable>();
    /// assert!(new_size < old_size);
    /// ```
    pub fn run_optimize(&mut self) -> bool {
        let mut has_runs = false;
        for (key, container) in &mut self.containers {
            let before = container.kind();
            if container.run_optimize() {
                trace!(key = *key, from = ?before, to = ?container.kind(), "container converted");
            }
            has_runs |= container.kind() == ContainerKind::Run;
        }
        has_runs
    }

    /// Removes run-length encoding even when it is more space efficient. Returns
    /// true if a change was applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (100..1000).collect();
    ///
    /// assert_eq!(bitmap.cardinality(), 900);
    ///
    /// bitmap.run_optimize();
    ///
    /// assert!(bitmap.remove_run_compression());
    /// assert!(!bitmap.remove_run_compression());
    /// ```
    pub fn remove_run_compression(&mut self) -> bool {
        let mut changed = false;
        for (_, container) in &mut self.containers {
            changed |= container.remove_run_compression();
        }
        changed
    }

    /// Returns true if any container is run-length encoded
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (100..1000).collect();
    /// assert!(!bitmap.has_run_compression());
    /// bitmap.run_optimize();
    /// assert!(bitmap.has_run_compression());
    /// ```
    #[inline]
    pub fn has_run_compression(&self) -> bool {
        self.containers
            .iter()
            .any(|(_, c)| c.kind() == ContainerKind::Run)
    }

    /// Returns true if the Bitmap is empty.
    /// Faster than doing: bitmap.cardinality() == 0)
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    ///
    /// assert!(bitmap.is_empty());
    ///
    /// bitmap.add(1);
    ///
    /// assert!(!bitmap.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Return true if all the elements of Self are in &other.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1: Bitmap = (5..10).collect();
    /// let bitmap2: Bitmap = (5..8).collect();
    /// let bitmap3: Bitmap = (5..10).collect();
    /// let bitmap4: Bitmap = (9..11).collect();
    ///
    /// assert!(bitmap2.is_subset(&bitmap1));
    /// assert!(bitmap3.is_subset(&bitmap1));
    /// assert!(!bitmap4.is_subset(&bitmap1));
    /// ```
    pub fn is_subset(&self, other: &Self) -> bool {
        if self.containers.len() > other.containers.len() {
            return false;
        }
        let mut theirs = other.containers.iter().peekable();
        self.containers.iter().all(|(key, container)| {
            while theirs.next_if(|(k, _)| k < key).is_some() {}
            match theirs.next_if(|(k, _)| k == key) {
                Some((_, other)) => container.is_subset(other),
                None => false,
            }
        })
    }

    /// Return true if all the elements of Self are in &other and &other is strictly greater
    /// than Self.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1: Bitmap = (5..9).collect();
    /// let bitmap2: Bitmap = (5..8).collect();
    /// let bitmap3: Bitmap = (5..9).collect();
    ///
    /// assert!(bitmap2.is_strict_subset(&bitmap1));
    /// assert!(!bitmap3.is_strict_subset(&bitmap1));
    /// ```
    #[inline]
    pub fn is_strict_subset(&self, other: &Self) -> bool {
        self.cardinality() < other.cardinality() && self.is_subset(other)
    }

    /// Return true if Self and &other intersect
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1: Bitmap = (1..5).collect();
    /// let bitmap2: Bitmap = (5..9).collect();
    /// let bitmap3: Bitmap = (3..7).collect();
    ///
    /// assert_eq!(bitmap1.intersect(&bitmap2), false);
    /// assert_eq!(bitmap1.intersect(&bitmap3), true);
    /// assert_eq!(bitmap2.intersect(&bitmap3), true);
    /// ```
    pub fn intersect(&self, other: &Self) -> bool {
        let mut theirs = other.containers.iter().peekable();
        self.containers.iter().any(|(key, container)| {
            while theirs.next_if(|(k, _)| k < key).is_some() {}
            theirs
                .next_if(|(k, _)| k == key)
                .map_or(false, |(_, other)| container.intersects(other))
        })
    }

    /// Return the Jaccard index between Self and &other
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1: Bitmap = (1..5).collect();
    /// let bitmap2: Bitmap = (5..9).collect();
    /// let bitmap3: Bitmap = (3..9).collect();
    ///
    /// assert_eq!(bitmap1.jaccard_index(&bitmap2), 0.0);
    /// assert_eq!(bitmap1.jaccard_index(&bitmap3), 0.25);
    /// assert_eq!(bitmap2.jaccard_index(&bitmap3), 0.6666666666666666);
    /// ```
    pub fn jaccard_index(&self, other: &Self) -> f64 {
        let intersection = self.and_cardinality(other);
        let union = self.cardinality() + other.cardinality() - intersection;
        intersection as f64 / union as f64
    }

    /// Return the size of the intersection between Self and &other
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1]);
    /// let bitmap2 = Bitmap::of(&[1, 2]);
    ///
    /// assert_eq!(bitmap1.and_cardinality(&bitmap2), 1);
    /// ```
    pub fn and_cardinality(&self, other: &Self) -> u64 {
        let mut theirs = other.containers.iter().peekable();
        let mut cardinality = 0;
        for (key, container) in &self.containers {
            while theirs.next_if(|(k, _)| k < key).is_some() {}
            if let Some((_, other)) = theirs.next_if(|(k, _)| k == key) {
                cardinality += container.and_cardinality(other) as u64;
            }
        }
        cardinality
    }

    /// Return the size of the union between Self and &other
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    ///
    /// assert_eq!(bitmap1.or_cardinality(&bitmap2), 2);
    /// ```
    #[inline]
    pub fn or_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() + other.cardinality() - self.and_cardinality(other)
    }

    /// Return the size of the difference between Self and &other
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// assert_eq!(bitmap1.andnot_cardinality(&bitmap2), 1);
    /// ```
    #[inline]
    pub fn andnot_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() - self.and_cardinality(other)
    }

    /// Return the size of the symmetric difference between Self and &other
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// assert_eq!(bitmap1.xor_cardinality(&bitmap2), 2);
    /// ```
    #[inline]
    pub fn xor_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() + other.cardinality() - 2 * self.and_cardinality(other)
    }

    /// Returns the smallest value in the set.
    ///
    /// Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (5..10).collect();
    /// let empty_bitmap: Bitmap = Bitmap::new();
    ///
    /// assert_eq!(bitmap.minimum(), Some(5));
    /// assert_eq!(empty_bitmap.minimum(), None);
    ///
    /// bitmap.add(3);
    ///
    /// assert_eq!(bitmap.minimum(), Some(3));
    /// ```
    #[inline]
    pub fn minimum(&self) -> Option<u32> {
        let (key, container) = self.containers.first()?;
        container.minimum().map(|low| join(*key, low))
    }

    /// Returns the greatest value in the set.
    ///
    /// Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (5..10).collect();
    /// let empty_bitmap: Bitmap = Bitmap::new();
    ///
    /// assert_eq!(bitmap.maximum(), Some(9));
    /// assert_eq!(empty_bitmap.maximum(), None);
    ///
    /// bitmap.add(15);
    ///
    /// assert_eq!(bitmap.maximum(), Some(15));
    /// ```
    #[inline]
    pub fn maximum(&self) -> Option<u32> {
        let (key, container) = self.containers.last()?;
        container.maximum().map(|low| join(*key, low))
    }

    /// Rank returns the number of values smaller or equal to x.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (5..10).collect();
    ///
    /// assert_eq!(bitmap.rank(8), 4);
    ///
    /// bitmap.add(15);
    ///
    /// assert_eq!(bitmap.rank(11), 5);
    /// assert_eq!(bitmap.rank(15), 6);
    /// ```
    pub fn rank(&self, x: u32) -> u64 {
        let (key, low) = split(x);
        let mut rank = 0;
        for (k, container) in &self.containers {
            match k.cmp(&key) {
                Ordering::Less => rank += container.cardinality() as u64,
                Ordering::Equal => return rank + container.rank(low) as u64,
                Ordering::Greater => break,
            }
        }
        rank
    }

    /// Select returns the element having the designated rank, if it exists
    /// If the size of the roaring bitmap is strictly greater than rank,
    /// then this function returns element of given rank wrapped in Some.
    /// Otherwise, it returns None.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap: Bitmap = (5..10).collect();
    ///
    /// assert_eq!(bitmap.select(0), Some(5));
    /// assert_eq!(bitmap.select(1), Some(6));
    /// assert_eq!(bitmap.select(2), Some(7));
    /// assert_eq!(bitmap.select(3), Some(8));
    /// assert_eq!(bitmap.select(4), Some(9));
    /// assert_eq!(bitmap.select(5), None);
    /// ```
    pub fn select(&self, rank: u32) -> Option<u32> {
        let mut remaining = rank as usize;
        for (key, container) in &self.containers {
            let cardinality = container.cardinality();
            if remaining < cardinality {
                return container.select(remaining).map(|low| join(*key, low));
            }
            remaining -= cardinality;
        }
        None
    }

    /// Returns statistics about the composition of a roaring bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (1..100).collect();
    /// let statistics = bitmap.statistics();
    ///
    /// assert_eq!(statistics.n_containers, 1);
    /// assert_eq!(statistics.n_array_containers, 1);
    /// assert_eq!(statistics.n_run_containers, 0);
    /// assert_eq!(statistics.n_bitset_containers, 0);
    /// assert_eq!(statistics.n_values_array_containers, 99);
    /// assert_eq!(statistics.n_values_run_containers, 0);
    /// assert_eq!(statistics.n_values_bitset_containers, 0);
    /// assert_eq!(statistics.n_bytes_array_containers, 198);
    /// assert_eq!(statistics.n_bytes_run_containers, 0);
    /// assert_eq!(statistics.n_bytes_bitset_containers, 0);
    /// assert_eq!(statistics.max_value, 99);
    /// assert_eq!(statistics.min_value, 1);
    /// assert_eq!(statistics.sum_value, 4950);
    /// assert_eq!(statistics.cardinality, 99);
    ///
    /// bitmap.run_optimize();
    /// let statistics = bitmap.statistics();
    ///
    /// assert_eq!(statistics.n_containers, 1);
    /// assert_eq!(statistics.n_array_containers, 0);
    /// assert_eq!(statistics.n_run_containers, 1);
    /// assert_eq!(statistics.n_bitset_containers, 0);
    /// assert_eq!(statistics.n_values_array_containers, 0);
    /// assert_eq!(statistics.n_values_run_containers, 99);
    /// assert_eq!(statistics.n_values_bitset_containers, 0);
    /// assert_eq!(statistics.n_bytes_array_containers, 0);
    /// assert_eq!(statistics.n_bytes_run_containers, 6);
    /// assert_eq!(statistics.n_bytes_bitset_containers, 0);
    /// assert_eq!(statistics.max_value, 99);
    /// assert_eq!(statistics.min_value, 1);
    /// assert_eq!(statistics.sum_value, 4950);
    /// assert_eq!(statistics.cardinality, 99);
    /// ```
    pub fn statistics(&self) -> Statistics {
        let mut statistics = Statistics {
            n_containers: self.containers.len() as u32,
            min_value: self.minimum().unwrap_or(0),
            max_value: self.maximum().unwrap_or(0),
            ..Statistics::default()
        };
        for (key, container) in &self.containers {
            let values = container.cardinality() as u32;
            let bytes = container.serialized_size_in_bytes() as u32;
            match container.kind() {
                ContainerKind::Array => {
                    statistics.n_array_containers += 1;
                    statistics.n_values_array_containers += values;
                    statistics.n_bytes_array_containers += bytes;
                }
                ContainerKind::Bitmap => {
                    statistics.n_bitset_containers += 1;
                    statistics.n_values_bitset_containers += values;
                    statistics.n_bytes_bitset_containers += bytes;
                }
                ContainerKind::Run => {
                    statistics.n_run_containers += 1;
                    statistics.n_values_run_containers += values;
                    statistics.n_bytes_run_containers += bytes;
                }
            }
            let base = u64::from(*key) << 16;
            statistics.sum_value += container
                .iter()
                .map(|low| base + u64::from(low))
                .sum::<u64>();
            statistics.cardinality += u64::from(values);
        }
        statistics
    }

    /// Check every structural invariant, describing the first violation
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (0..100_000).step_by(3).collect();
    /// bitmap.run_optimize();
    /// assert_eq!(bitmap.internal_validate(), Ok(()));
    /// ```
    pub fn internal_validate(&self) -> std::result::Result<(), &'static str> {
        if !self.containers.windows(2).all(|w| w[0].0 < w[1].0) {
            return Err("container keys are not strictly ascending");
        }
        self.containers
            .iter()
            .try_for_each(|(_, container)| container.validate())
    }
}

/// Merge-walk two bitmaps, cloning unmatched containers through and combining matched ones
fn merge(
    left: &Bitmap,
    right: &Bitmap,
    combine: impl Fn(&Container, &Container) -> Option<Container>,
) -> Bitmap {
    let mut containers = Vec::with_capacity(left.containers.len().max(right.containers.len()));
    let mut theirs = right.containers.iter().peekable();
    for (key, container) in &left.containers {
        while let Some((k, other)) = theirs.next_if(|(k, _)| k < key) {
            containers.push((*k, other.clone()));
        }
        match theirs.next_if(|(k, _)| k == key) {
            Some((_, other)) => {
                if let Some(result) = combine(container, other) {
                    containers.push((*key, result));
                }
            }
            None => containers.push((*key, container.clone())),
        }
    }
    containers.extend(theirs.cloned());
    Bitmap { containers }
}

/// In-place counterpart of [`merge`]: `combine` updates the receiver's container and returns
/// whether it should be kept
fn merge_inplace(
    target: &mut Bitmap,
    other: &Bitmap,
    combine: impl Fn(&mut Container, &Container) -> bool,
) {
    let mine = std::mem::take(&mut target.containers);
    let mut containers = Vec::with_capacity(mine.len().max(other.containers.len()));
    let mut theirs = other.containers.iter().peekable();
    for (key, mut container) in mine {
        while let Some(entry) = theirs.next_if(|(k, _)| *k < key) {
            containers.push(entry.clone());
        }
        match theirs.next_if(|(k, _)| *k == key) {
            Some((_, other)) => {
                if combine(&mut container, other) {
                    containers.push((key, container));
                }
            }
            None => containers.push((key, container)),
        }
    }
    containers.extend(theirs.cloned());
    target.containers = containers;
}

fn range_to_inclusive<R: RangeBounds<u32>>(range: R) -> (u32, u32) {
    let start = match range.start_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => match i.checked_add(1) {
            Some(i) => i,
            None => return (1, 0),
        },
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => match i.checked_sub(1) {
            Some(i) => i,
            None => return (1, 0),
        },
        Bound::Unbounded => u32::MAX,
    };
    (start, end)
}
