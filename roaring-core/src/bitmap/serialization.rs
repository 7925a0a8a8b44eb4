use tracing::debug;

use super::{Bitmap, BitmapView};
use crate::container::{Container, ContainerKind};
use crate::io::{ByteSink, ByteSource};
use crate::serialization::{Descriptor, FormatVersion, Header, Portable};
use crate::Result;

pub trait Serializer {
    fn serialize_into<W: ByteSink>(bitmap: &Bitmap, sink: W) -> Result<()>;
    fn get_serialized_size_in_bytes(bitmap: &Bitmap) -> usize;
}

pub trait Deserializer {
    fn deserialize_from<R: ByteSource>(source: R) -> Result<Bitmap>;
}

pub trait ViewDeserializer {
    fn deserialize_view(data: &[u8]) -> Result<BitmapView<'_>>;
}

fn descriptors(bitmap: &Bitmap) -> Vec<Descriptor> {
    bitmap
        .containers
        .iter()
        .map(|(key, container)| Descriptor {
            key: *key,
            cardinality: container.cardinality() as u32,
            is_run: container.kind() == ContainerKind::Run,
        })
        .collect()
}

impl Serializer for Portable {
    /// Serializes a bitmap in portable format.
    /// See [`Bitmap::serialize_into`] for examples.
    fn serialize_into<W: ByteSink>(bitmap: &Bitmap, mut sink: W) -> Result<()> {
        let descriptors = descriptors(bitmap);
        Header::write(
            &mut sink,
            &descriptors,
            bitmap
                .containers
                .iter()
                .map(|(_, c)| c.serialized_size_in_bytes()),
        )?;
        for (_, container) in &bitmap.containers {
            container.encode(&mut sink)?;
        }
        Ok(())
    }

    /// Computes the serialized size in bytes of the Bitmap in portable format.
    /// See [`Bitmap::get_serialized_size_in_bytes`] for examples.
    fn get_serialized_size_in_bytes(bitmap: &Bitmap) -> usize {
        let version = if bitmap.has_run_compression() {
            FormatVersion::WithRuns
        } else {
            FormatVersion::NoRuns
        };
        let bodies: usize = bitmap
            .containers
            .iter()
            .map(|(_, c)| c.serialized_size_in_bytes())
            .sum();
        version.header_size(bitmap.containers.len()) + bodies
    }
}

impl Deserializer for Portable {
    /// Reads a bitmap in portable format from the source's current position.
    ///
    /// Bodies are read in descriptor order; the offset table is not consulted.
    /// See [`Bitmap::try_deserialize`] for examples.
    fn deserialize_from<R: ByteSource>(mut source: R) -> Result<Bitmap> {
        let start = source.position();
        let header = Header::read(&mut source).map_err(|e| {
            debug!(offset = start, error = %e, "rejected portable header");
            e
        })?;

        let mut containers = Vec::with_capacity(header.len());
        for descriptor in &header.descriptors {
            let container =
                Container::decode(&mut source, descriptor.is_run, descriptor.cardinality)
                    .map_err(|e| {
                        debug!(key = descriptor.key, error = %e, "rejected container body");
                        e
                    })?;
            containers.push((descriptor.key, container));
        }
        debug!(
            containers = containers.len(),
            bytes = source.position() - start,
            "decoded portable bitmap"
        );
        Ok(Bitmap::from_containers(containers))
    }
}

impl ViewDeserializer for Portable {
    /// Parse the header of a portable blob and locate every container body
    ///
    /// See [`BitmapView::deserialize`] for examples.
    fn deserialize_view(data: &[u8]) -> Result<BitmapView<'_>> {
        BitmapView::parse(data)
    }
}
