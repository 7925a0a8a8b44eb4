use std::iter::FusedIterator;
use std::slice;

use super::{ArrayContainer, BitmapContainer, Container, Rle16, RunContainer};

/// Ascending iterator over the low 16 bits stored in one container
#[derive(Clone)]
pub struct ContainerIter<'a> {
    inner: Inner<'a>,
}

#[derive(Clone)]
enum Inner<'a> {
    Array(slice::Iter<'a, u16>),
    Bitmap {
        words: &'a [u64],
        index: usize,
        word: u64,
    },
    Run {
        runs: slice::Iter<'a, Rle16>,
        next: u32,
        end: u32,
    },
}

impl<'a> ContainerIter<'a> {
    pub(crate) fn array(array: &'a ArrayContainer, from: u16) -> Self {
        let values = array.values();
        let start = values.partition_point(|&v| v < from);
        ContainerIter {
            inner: Inner::Array(values[start..].iter()),
        }
    }

    pub(crate) fn bitmap(bitmap: &'a BitmapContainer, from: u16) -> Self {
        let words = &bitmap.words()[..];
        let index = usize::from(from) / 64;
        ContainerIter {
            inner: Inner::Bitmap {
                words,
                index,
                word: words[index] & (u64::MAX << (from % 64)),
            },
        }
    }

    pub(crate) fn run(runs: &'a RunContainer, from: u16) -> Self {
        let all = runs.runs();
        let start = all.partition_point(|r| r.end() < from);
        let mut runs = all[start..].iter();
        let (next, end) = match runs.next() {
            Some(first) => (
                u32::from(first.value.max(from)),
                u32::from(first.end()) + 1,
            ),
            None => (0, 0),
        };
        ContainerIter {
            inner: Inner::Run { runs, next, end },
        }
    }
}

impl Iterator for ContainerIter<'_> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match &mut self.inner {
            Inner::Array(values) => values.next().copied(),
            Inner::Bitmap { words, index, word } => {
                while *word == 0 {
                    *index += 1;
                    *word = *words.get(*index)?;
                }
                let bit = word.trailing_zeros() as usize;
                *word &= *word - 1;
                Some((*index * 64 + bit) as u16)
            }
            Inner::Run { runs, next, end } => {
                if *next >= *end {
                    let run = runs.next()?;
                    *next = u32::from(run.value);
                    *end = u32::from(run.end()) + 1;
                }
                let value = *next as u16;
                *next += 1;
                Some(value)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Inner::Array(values) => values.size_hint(),
            _ => (0, Some(1 << 16)),
        }
    }
}

impl FusedIterator for ContainerIter<'_> {}

impl Container {
    /// Iterate the values of this container in ascending order
    #[inline]
    pub fn iter(&self) -> ContainerIter<'_> {
        self.iter_from(0)
    }

    /// Iterate the values `>= from` in ascending order
    pub fn iter_from(&self, from: u16) -> ContainerIter<'_> {
        match self {
            Container::Array(c) => ContainerIter::array(c, from),
            Container::Bitmap(c) => ContainerIter::bitmap(c, from),
            Container::Run(c) => ContainerIter::run(c, from),
        }
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = u16;
    type IntoIter = ContainerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
