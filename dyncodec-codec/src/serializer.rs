//! Schema-driven serializer.
//!
//! Walks the fields of a [`TypeSchema`] in declaration order and emits each
//! one in native byte order with no padding. Strings and sequences carry a
//! 4-byte count; fixed arrays do not. The same walk drives both encoding and
//! size computation through the [`Sink`] trait.

use dyncodec_core::{COUNT_WIDTH, CodecConfig, EncodeBuffer, Error, Result};
use dyncodec_schema::{
    ArrayShape, FieldDescriptor, FieldKind, HANDLE_SIZE, MessageInstance, Slot, TypeSchema,
};

/// Destination of a serialization walk.
pub trait Sink {
    /// Accepts raw bytes.
    fn bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Accepts 16-bit code units.
    fn units(&mut self, units: &[u16]) -> Result<()>;

    /// Accepts a count prefix.
    fn count(&mut self, count: usize, field: &str) -> Result<()>;
}

impl Sink for EncodeBuffer<'_> {
    #[inline]
    fn bytes(&mut self, data: &[u8]) -> Result<()> {
        self.write_bytes(data)
    }

    #[inline]
    fn units(&mut self, units: &[u16]) -> Result<()> {
        self.write_u16_units(units)
    }

    #[inline]
    fn count(&mut self, count: usize, field: &str) -> Result<()> {
        self.write_count(count, field)
    }
}

/// Sink that only measures.
#[derive(Debug, Default, Clone, Copy)]
pub struct SizeCounter {
    total: usize,
}

impl SizeCounter {
    /// Returns the number of bytes counted so far.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }
}

impl Sink for SizeCounter {
    fn bytes(&mut self, data: &[u8]) -> Result<()> {
        self.total += data.len();
        Ok(())
    }

    fn units(&mut self, units: &[u16]) -> Result<()> {
        self.total += units.len() * 2;
        Ok(())
    }

    fn count(&mut self, count: usize, field: &str) -> Result<()> {
        if u32::try_from(count).is_err() {
            return Err(Error::bound_exceeded(field, count, u32::MAX as usize));
        }
        self.total += COUNT_WIDTH;
        Ok(())
    }
}

/// Returns `len` bytes of the inline block starting at `at`.
fn inline<'i>(
    instance: &'i MessageInstance,
    at: usize,
    len: usize,
    field: &str,
) -> Result<&'i [u8]> {
    let block = instance.block();
    match at.checked_add(len) {
        Some(end) if end <= block.len() => Ok(&block[at..end]),
        _ => Err(Error::layout(format!(
            "field '{field}' lies outside the instance block"
        ))),
    }
}

fn wrong_slot(field: &FieldDescriptor, slot: &Slot) -> Error {
    Error::layout(format!(
        "field '{}' ({}) holds a {}",
        field.name,
        field.describe(),
        slot.name()
    ))
}

/// Serializes message instances against their schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct Serializer {
    config: CodecConfig,
}

impl Serializer {
    /// Creates a serializer with the given limits.
    #[must_use]
    pub const fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Serializes `instance` into a new buffer.
    ///
    /// # Errors
    /// See [`Serializer::serialize_into`].
    pub fn serialize(&self, schema: &TypeSchema, instance: &MessageInstance) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.try_reserve(self.config.capacity_hint())
            .map_err(|_| Error::AllocationFailure {
                requested: self.config.capacity_hint(),
            })?;
        self.serialize_into(schema, instance, &mut out)?;
        Ok(out)
    }

    /// Appends the encoding of `instance` to `out` and returns the number of
    /// bytes written. On failure `out` is restored to its original length.
    ///
    /// # Errors
    /// Returns [`Error::LayoutMismatch`] if the instance does not match the
    /// schema, [`Error::ArrayBoundExceeded`] if a bounded sequence or string
    /// is longer than its bound, [`Error::RecursionLimitExceeded`] for
    /// nesting past the configured depth, or [`Error::AllocationFailure`].
    pub fn serialize_into(
        &self,
        schema: &TypeSchema,
        instance: &MessageInstance,
        out: &mut Vec<u8>,
    ) -> Result<usize> {
        let mut encoder = EncodeBuffer::new(out);
        match self.write(&mut encoder, schema, instance) {
            Ok(()) => Ok(encoder.bytes_written()),
            Err(err) => {
                encoder.rollback();
                Err(err)
            }
        }
    }

    /// Returns the exact encoded length of `instance` without encoding it.
    ///
    /// # Errors
    /// Fails exactly when [`Serializer::serialize_into`] would, except for
    /// allocation failure.
    pub fn serialized_size(
        &self,
        schema: &TypeSchema,
        instance: &MessageInstance,
    ) -> Result<usize> {
        let mut counter = SizeCounter::default();
        self.write(&mut counter, schema, instance)?;
        Ok(counter.total())
    }

    /// Drives `sink` through the encoding of `instance`.
    ///
    /// # Errors
    /// See [`Serializer::serialize_into`].
    pub fn write<S: Sink>(
        &self,
        sink: &mut S,
        schema: &TypeSchema,
        instance: &MessageInstance,
    ) -> Result<()> {
        if instance.size() != schema.size() {
            return Err(Error::layout(format!(
                "instance is {} bytes, '{}' declares {}",
                instance.size(),
                schema.qualified_name(),
                schema.size()
            )));
        }
        self.write_message(sink, schema, instance, 0, 0)
    }

    fn write_message<S: Sink>(
        &self,
        sink: &mut S,
        schema: &TypeSchema,
        instance: &MessageInstance,
        base: usize,
        depth: usize,
    ) -> Result<()> {
        if depth > self.config.depth_limit() {
            return Err(Error::RecursionLimitExceeded {
                depth,
                limit: self.config.depth_limit(),
            });
        }

        for field in schema.fields() {
            self.write_field(sink, field, instance, base + field.offset, depth)?;
        }
        Ok(())
    }

    fn write_field<S: Sink>(
        &self,
        sink: &mut S,
        field: &FieldDescriptor,
        instance: &MessageInstance,
        at: usize,
        depth: usize,
    ) -> Result<()> {
        match (&field.kind, field.shape) {
            (FieldKind::Primitive(kind), ArrayShape::Scalar) => {
                sink.bytes(inline(instance, at, kind.size(), &field.name)?)
            }
            (FieldKind::Primitive(kind), ArrayShape::Fixed(n)) => {
                sink.bytes(inline(instance, at, kind.size() * n, &field.name)?)
            }
            (FieldKind::Primitive(kind), shape) => {
                let bytes = match instance.slot(at) {
                    None => &[][..],
                    Some(Slot::Primitives(bytes)) => bytes.as_slice(),
                    Some(other) => return Err(wrong_slot(field, other)),
                };
                if bytes.len() % kind.size() != 0 {
                    return Err(Error::layout(format!(
                        "sequence '{}' holds {} bytes, not a multiple of {}",
                        field.name,
                        bytes.len(),
                        kind.size()
                    )));
                }
                let count = bytes.len() / kind.size();
                check_bound(field, shape, count)?;
                sink.count(count, &field.name)?;
                sink.bytes(bytes)
            }

            (FieldKind::String, ArrayShape::Scalar) => {
                write_string(sink, field, string_at(instance, at, field)?)
            }
            (FieldKind::String, ArrayShape::Fixed(n)) => (0..n).try_for_each(|i| {
                write_string(sink, field, string_at(instance, at + i * HANDLE_SIZE, field)?)
            }),
            (FieldKind::String, shape) => {
                let items = match instance.slot(at) {
                    None => &[][..],
                    Some(Slot::Strings(items)) => items.as_slice(),
                    Some(other) => return Err(wrong_slot(field, other)),
                };
                check_bound(field, shape, items.len())?;
                sink.count(items.len(), &field.name)?;
                items.iter().try_for_each(|item| write_string(sink, field, item))
            }

            (FieldKind::WString, ArrayShape::Scalar) => {
                write_wstring(sink, field, wstring_at(instance, at, field)?)
            }
            (FieldKind::WString, ArrayShape::Fixed(n)) => (0..n).try_for_each(|i| {
                write_wstring(sink, field, wstring_at(instance, at + i * HANDLE_SIZE, field)?)
            }),
            (FieldKind::WString, shape) => {
                let items = match instance.slot(at) {
                    None => &[][..],
                    Some(Slot::WStrings(items)) => items.as_slice(),
                    Some(other) => return Err(wrong_slot(field, other)),
                };
                check_bound(field, shape, items.len())?;
                sink.count(items.len(), &field.name)?;
                items.iter().try_for_each(|item| write_wstring(sink, field, item))
            }

            (FieldKind::Message(nested), ArrayShape::Scalar) => {
                self.write_message(sink, nested, instance, at, depth + 1)
            }
            (FieldKind::Message(nested), ArrayShape::Fixed(n)) => (0..n).try_for_each(|i| {
                self.write_message(sink, nested, instance, at + i * nested.size(), depth + 1)
            }),
            (FieldKind::Message(nested), shape) => {
                let items = match instance.slot(at) {
                    None => &[][..],
                    Some(Slot::Messages(items)) => items.as_slice(),
                    Some(other) => return Err(wrong_slot(field, other)),
                };
                check_bound(field, shape, items.len())?;
                sink.count(items.len(), &field.name)?;
                items.iter().try_for_each(|item| {
                    if item.size() != nested.size() {
                        return Err(Error::layout(format!(
                            "element of '{}' is {} bytes, '{}' declares {}",
                            field.name,
                            item.size(),
                            nested.qualified_name(),
                            nested.size()
                        )));
                    }
                    self.write_message(sink, nested, item, 0, depth + 1)
                })
            }
        }
    }
}

/// Rejects a sequence longer than its declared bound.
fn check_bound(field: &FieldDescriptor, shape: ArrayShape, count: usize) -> Result<()> {
    match shape {
        ArrayShape::Bounded(max) if count > max => {
            Err(Error::bound_exceeded(&field.name, count, max))
        }
        _ => Ok(()),
    }
}

fn string_at<'i>(
    instance: &'i MessageInstance,
    key: usize,
    field: &FieldDescriptor,
) -> Result<&'i [u8]> {
    match instance.slot(key) {
        None => Ok(&[][..]),
        Some(Slot::String(bytes)) => Ok(bytes.as_slice()),
        Some(other) => Err(wrong_slot(field, other)),
    }
}

fn wstring_at<'i>(
    instance: &'i MessageInstance,
    key: usize,
    field: &FieldDescriptor,
) -> Result<&'i [u16]> {
    match instance.slot(key) {
        None => Ok(&[][..]),
        Some(Slot::WString(units)) => Ok(units.as_slice()),
        Some(other) => Err(wrong_slot(field, other)),
    }
}

fn write_string<S: Sink>(sink: &mut S, field: &FieldDescriptor, value: &[u8]) -> Result<()> {
    if let Some(bound) = field.string_bound.filter(|bound| value.len() > *bound) {
        return Err(Error::bound_exceeded(&field.name, value.len(), bound));
    }
    sink.count(value.len(), &field.name)?;
    sink.bytes(value)
}

fn write_wstring<S: Sink>(sink: &mut S, field: &FieldDescriptor, value: &[u16]) -> Result<()> {
    if let Some(bound) = field.string_bound.filter(|bound| value.len() > *bound) {
        return Err(Error::bound_exceeded(&field.name, value.len(), bound));
    }
    sink.count(value.len(), &field.name)?;
    sink.units(value)
}
