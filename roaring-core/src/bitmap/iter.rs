use std::iter::FusedIterator;

use super::{join, split, Bitmap};
use crate::container::{Container, ContainerIter};

/// Ascending iterator over the values of a [`Bitmap`]
#[derive(Clone)]
pub struct BitmapIterator<'a> {
    containers: &'a [(u16, Container)],
    index: usize,
    current: Option<(u16, ContainerIter<'a>)>,
}

impl<'a> BitmapIterator<'a> {
    fn new(bitmap: &'a Bitmap) -> Self {
        let mut iter = BitmapIterator {
            containers: &bitmap.containers,
            index: 0,
            current: None,
        };
        iter.load(0, 0);
        iter
    }

    /// Position on container `index`, starting at its first value `>= from`
    #[inline]
    fn load(&mut self, index: usize, from: u16) {
        self.index = index;
        self.current = self
            .containers
            .get(index)
            .map(|(key, container)| (*key, container.iter_from(from)));
    }

    /// Attempt to read many values from the iterator into `dst`
    ///
    /// Returns the number of items read from the iterator, may be `< dst.len()` iff
    /// the iterator is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap: Bitmap = Bitmap::create();
    /// bitmap.add_range(0..100);
    /// bitmap.add(222);
    /// bitmap.add(555);
    ///
    /// let mut buf = [0; 100];
    /// let mut iter = bitmap.iter();
    /// assert_eq!(iter.next_many(&mut buf), 100);
    /// // Get the first 100 items, from the original range added
    /// for (i, item) in buf.iter().enumerate() {
    ///     assert_eq!(*item, i as u32);
    /// }
    /// // Calls to next_many() can be interleaved with calls to next()
    /// assert_eq!(iter.next(), Some(222));
    /// assert_eq!(iter.next_many(&mut buf), 1);
    /// assert_eq!(buf[0], 555);
    ///
    /// assert_eq!(iter.next(), None);
    /// assert_eq!(iter.next_many(&mut buf), 0);
    /// ```
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// fn print_by_chunks(bitmap: &Bitmap) {
    ///     let mut buf = [0; 1024];
    ///     let mut iter = bitmap.iter();
    ///     loop {
    ///         let n = iter.next_many(&mut buf);
    ///         if n == 0 {
    ///             break;
    ///         }
    ///         println!("{:?}", &buf[..n]);
    ///     }
    /// }
    ///
    /// # print_by_chunks(&Bitmap::of(&[1, 2, 8, 20, 1000]));
    /// ```
    pub fn next_many(&mut self, dst: &mut [u32]) -> usize {
        let mut count = 0;
        while count < dst.len() {
            let Some((key, values)) = &mut self.current else {
                break;
            };
            let key = *key;
            for (slot, low) in dst[count..].iter_mut().zip(values.by_ref()) {
                *slot = join(key, low);
                count += 1;
            }
            if count < dst.len() {
                self.load(self.index + 1, 0);
            }
        }
        count
    }

    /// Reset the iterator to the first value `>= val`
    ///
    /// This can move the iterator forwards or backwards.
    ///
    /// # Examples
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::of(&[0, 1, 100, 1000, u32::MAX]);
    /// let mut iter = bitmap.iter();
    /// iter.reset_at_or_after(0);
    /// assert_eq!(iter.next(), Some(0));
    /// iter.reset_at_or_after(0);
    /// assert_eq!(iter.next(), Some(0));
    ///
    /// iter.reset_at_or_after(101);
    /// assert_eq!(iter.next(), Some(1000));
    /// assert_eq!(iter.next(), Some(u32::MAX));
    /// assert_eq!(iter.next(), None);
    /// iter.reset_at_or_after(u32::MAX);
    /// assert_eq!(iter.next(), Some(u32::MAX));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn reset_at_or_after(&mut self, val: u32) {
        let (key, low) = split(val);
        match self.containers.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(index) => self.load(index, low),
            Err(index) => self.load(index, 0),
        }
    }
}

impl<'a> Iterator for BitmapIterator<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (key, values) = self.current.as_mut()?;
            if let Some(low) = values.next() {
                return Some(join(*key, low));
            }
            self.load(self.index + 1, 0);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let Some((_, values)) = &self.current else {
            return (0, Some(0));
        };
        let rest: usize = self.containers[self.index + 1..]
            .iter()
            .map(|(_, c)| c.cardinality())
            .sum();
        let (low, high) = values.size_hint();
        (low + rest, high.map(|high| high + rest))
    }
}

impl FusedIterator for BitmapIterator<'_> {}

impl Bitmap {
    /// Returns an iterator over each value stored in the bitmap.
    /// Returned values are ordered in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::create();
    /// bitmap.add(4);
    /// bitmap.add(3);
    /// bitmap.add(2);
    /// let mut iterator = bitmap.iter();
    ///
    /// assert_eq!(iterator.next(), Some(2));
    /// assert_eq!(iterator.next(), Some(3));
    /// assert_eq!(iterator.next(), Some(4));
    /// assert_eq!(iterator.next(), None);
    /// ```
    #[inline]
    pub fn iter(&self) -> BitmapIterator<'_> {
        BitmapIterator::new(self)
    }
}

impl<'a> IntoIterator for &'a Bitmap {
    type Item = u32;
    type IntoIter = BitmapIterator<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<u32> for Bitmap {
    /// Convenience method for creating bitmap from iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let bitmap: Bitmap = (1..3).collect();
    ///
    /// assert!(!bitmap.is_empty());
    /// assert!(bitmap.contains(1));
    /// assert!(bitmap.contains(2));
    /// assert_eq!(bitmap.cardinality(), 2);
    /// ```
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut bitmap = Bitmap::new();
        bitmap.extend(iter);
        bitmap
    }
}

impl Extend<u32> for Bitmap {
    /// Adds every value, reusing the container lookup while consecutive values share
    /// their high bits.
    ///
    /// ```
    /// use roaring_core::Bitmap;
    ///
    /// let mut bitmap = Bitmap::of(&[1]);
    /// bitmap.extend([70_000, 2, 70_001]);
    ///
    /// assert_eq!(bitmap.to_vec(), [1, 2, 70_000, 70_001]);
    /// ```
    fn extend<T: IntoIterator<Item = u32>>(&mut self, iter: T) {
        let mut chunk = Vec::with_capacity(1024);
        for item in iter {
            chunk.push(item);
            if chunk.len() == chunk.capacity() {
                self.add_many(&chunk);
                chunk.clear();
            }
        }
        self.add_many(&chunk);
    }
}
