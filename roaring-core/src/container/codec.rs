use byteorder::{ByteOrder, LittleEndian};

use super::{
    run_size_in_bytes, ArrayContainer, BitmapContainer, Container, Rle16, RunContainer,
    ARRAY_MAX_CARDINALITY, BITMAP_SIZE_IN_BYTES, BITMAP_WORDS,
};
use crate::io::{ByteSink, ByteSource};
use crate::{Error, Result};

impl Container {
    /// Size of this container's body in the portable format
    #[inline]
    pub fn serialized_size_in_bytes(&self) -> usize {
        match self {
            Container::Array(c) => 2 * c.cardinality(),
            Container::Bitmap(_) => BITMAP_SIZE_IN_BYTES,
            Container::Run(c) => run_size_in_bytes(c.number_of_runs()),
        }
    }

    /// Write this container's body, little-endian
    pub fn encode<S: ByteSink>(&self, sink: &mut S) -> Result<()> {
        match self {
            Container::Array(c) => {
                let mut bytes = vec![0; 2 * c.cardinality()];
                LittleEndian::write_u16_into(c.values(), &mut bytes);
                sink.write_bytes(&bytes)
            }
            Container::Bitmap(c) => {
                let mut bytes = vec![0; BITMAP_SIZE_IN_BYTES];
                LittleEndian::write_u64_into(&c.words()[..], &mut bytes);
                sink.write_bytes(&bytes)
            }
            Container::Run(c) => {
                sink.write_u16::<LittleEndian>(c.number_of_runs() as u16)?;
                let mut bytes = vec![0; 4 * c.number_of_runs()];
                for (chunk, run) in bytes.chunks_exact_mut(4).zip(c.runs()) {
                    LittleEndian::write_u16(&mut chunk[..2], run.value);
                    LittleEndian::write_u16(&mut chunk[2..], run.length);
                }
                sink.write_bytes(&bytes)
            }
        }
    }

    /// Read one container body
    ///
    /// `cardinality` comes from the container's descriptor; it selects between array and
    /// bitmap bodies and must agree with the decoded contents.
    pub fn decode<S: ByteSource>(source: &mut S, is_run: bool, cardinality: u32) -> Result<Self> {
        let cardinality = cardinality as usize;
        if is_run {
            let runs = decode_runs(source)?;
            if runs.cardinality() != cardinality {
                return Err(Error::InvalidContainer(
                    "run container cardinality does not match its descriptor",
                ));
            }
            Ok(Container::Run(runs))
        } else if cardinality <= ARRAY_MAX_CARDINALITY {
            let mut bytes = vec![0; 2 * cardinality];
            source.read_bytes(&mut bytes)?;
            let mut values = vec![0; cardinality];
            LittleEndian::read_u16_into(&bytes, &mut values);
            if !values.windows(2).all(|w| w[0] < w[1]) {
                return Err(Error::InvalidContainer(
                    "array container values are not strictly ascending",
                ));
            }
            Ok(Container::Array(ArrayContainer::from_sorted_vec(values)))
        } else {
            let mut bytes = vec![0; BITMAP_SIZE_IN_BYTES];
            source.read_bytes(&mut bytes)?;
            let mut words = Box::new([0u64; BITMAP_WORDS]);
            LittleEndian::read_u64_into(&bytes, &mut words[..]);
            let bitmap = BitmapContainer::from_words(words);
            if bitmap.cardinality() != cardinality {
                return Err(Error::InvalidContainer(
                    "bitmap container cardinality does not match its descriptor",
                ));
            }
            Ok(Container::Bitmap(bitmap))
        }
    }

    /// Length of a body starting at the source's position, leaving the position unspecified
    pub(crate) fn body_size<S: ByteSource>(
        source: &mut S,
        is_run: bool,
        cardinality: u32,
    ) -> Result<usize> {
        if is_run {
            let runs = source.read_u16::<LittleEndian>()?;
            Ok(run_size_in_bytes(usize::from(runs)))
        } else if cardinality as usize <= ARRAY_MAX_CARDINALITY {
            Ok(2 * cardinality as usize)
        } else {
            Ok(BITMAP_SIZE_IN_BYTES)
        }
    }
}

fn decode_runs<S: ByteSource>(source: &mut S) -> Result<RunContainer> {
    let count = usize::from(source.read_u16::<LittleEndian>()?);
    if count == 0 {
        return Err(Error::InvalidContainer("run container without runs"));
    }
    let mut bytes = vec![0; 4 * count];
    source.read_bytes(&mut bytes)?;

    let mut runs = RunContainer::new();
    let mut next_free = 0u32;
    for chunk in bytes.chunks_exact(4) {
        let run = Rle16::new(
            LittleEndian::read_u16(&chunk[..2]),
            LittleEndian::read_u16(&chunk[2..]),
        );
        let start = u32::from(run.value);
        let end = start + u32::from(run.length);
        if end > u32::from(u16::MAX) {
            return Err(Error::InvalidContainer("run extends past the container"));
        }
        if start < next_free {
            return Err(Error::InvalidContainer("runs overlap or are out of order"));
        }
        // Touching runs are coalesced
        runs.push_run(start, end);
        next_free = end + 1;
    }
    Ok(runs)
}
