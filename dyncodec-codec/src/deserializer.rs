//! Schema-driven deserializer for untrusted input.
//!
//! Mirrors the serializer field order. The input length is the only trusted
//! bound: every read goes through [`ReadCursor`], which checks the remaining
//! bytes before consuming anything, and every count read from the wire is
//! validated against the field bound or the configured cap before it sizes
//! an allocation or drives a loop.

use dyncodec_core::{COUNT_WIDTH, CodecConfig, Error, ReadCursor, Result};
use dyncodec_schema::{
    ArrayShape, FieldDescriptor, FieldKind, HANDLE_SIZE, MessageInstance, Slot, TypeSchema,
};

/// Copies `src` into a new vector, reporting allocation failure.
fn try_copy<T: Copy>(src: &[T]) -> Result<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(src.len())
        .map_err(|_| Error::AllocationFailure {
            requested: std::mem::size_of_val(src),
        })?;
    out.extend_from_slice(src);
    Ok(out)
}

/// Creates an empty vector with room for `count` elements, but never more
/// than the remaining input could possibly describe.
fn try_with_capacity<T>(count: usize, remaining: usize, min_wire_width: usize) -> Result<Vec<T>> {
    let capacity = count.min(remaining / min_wire_width.max(1));
    let mut out = Vec::new();
    out.try_reserve_exact(capacity)
        .map_err(|_| Error::AllocationFailure {
            requested: capacity.saturating_mul(std::mem::size_of::<T>()),
        })?;
    Ok(out)
}

fn units_from_ne(bytes: &[u8]) -> Result<Vec<u16>> {
    let mut units = try_with_capacity(bytes.len() / 2, bytes.len(), 2)?;
    units.extend(
        bytes
            .chunks_exact(2)
            .map(|pair| u16::from_ne_bytes([pair[0], pair[1]])),
    );
    Ok(units)
}

/// Deserializes wire bytes into message instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deserializer {
    config: CodecConfig,
}

impl Deserializer {
    /// Creates a deserializer with the given limits.
    #[must_use]
    pub const fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes `bytes` into `out` and returns the number of bytes consumed.
    ///
    /// `out` must be a zero-initialized instance of `schema`. On failure it
    /// may be partially populated and must be discarded.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedInput`] if the input ends early,
    /// [`Error::ArrayBoundExceeded`] for a count above the field bound or
    /// configured cap, [`Error::RecursionLimitExceeded`] for nesting past the
    /// configured depth, [`Error::LayoutMismatch`] if `out` does not match
    /// the schema, or [`Error::AllocationFailure`].
    pub fn deserialize(
        &self,
        schema: &TypeSchema,
        bytes: &[u8],
        out: &mut MessageInstance,
    ) -> Result<usize> {
        if out.size() != schema.size() {
            return Err(Error::layout(format!(
                "destination is {} bytes, '{}' declares {}",
                out.size(),
                schema.qualified_name(),
                schema.size()
            )));
        }

        let mut cursor = ReadCursor::new(bytes);
        self.read_message(&mut cursor, schema, out, 0, 0)?;
        Ok(cursor.position())
    }

    fn read_message(
        &self,
        cursor: &mut ReadCursor<'_>,
        schema: &TypeSchema,
        out: &mut MessageInstance,
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
            self.read_field(cursor, field, out, base + field.offset, depth)?;
        }
        Ok(())
    }

    fn read_field(
        &self,
        cursor: &mut ReadCursor<'_>,
        field: &FieldDescriptor,
        out: &mut MessageInstance,
        at: usize,
        depth: usize,
    ) -> Result<()> {
        match (&field.kind, field.shape) {
            (FieldKind::Primitive(kind), ArrayShape::Scalar) => {
                let src = cursor.take(kind.size())?;
                inline_mut(out, at, src.len(), field)?.copy_from_slice(src);
                Ok(())
            }
            (FieldKind::Primitive(kind), ArrayShape::Fixed(n)) => {
                let src = cursor.take_elements(n, kind.size())?;
                inline_mut(out, at, src.len(), field)?.copy_from_slice(src);
                Ok(())
            }
            (FieldKind::Primitive(kind), shape) => {
                let count = self.read_sequence_count(cursor, field, shape)?;
                let src = cursor.take_elements(count, kind.size())?;
                store(out, at, Slot::Primitives(try_copy(src)?));
                Ok(())
            }

            (FieldKind::String, ArrayShape::Scalar) => {
                let value = self.read_string(cursor, field)?;
                store(out, at, Slot::String(value));
                Ok(())
            }
            (FieldKind::String, ArrayShape::Fixed(n)) => (0..n).try_for_each(|i| {
                let value = self.read_string(cursor, field)?;
                store(out, at + i * HANDLE_SIZE, Slot::String(value));
                Ok(())
            }),
            (FieldKind::String, shape) => {
                let count = self.read_sequence_count(cursor, field, shape)?;
                let mut items = try_with_capacity(count, cursor.remaining(), COUNT_WIDTH)?;
                for _ in 0..count {
                    items.push(self.read_string(cursor, field)?);
                }
                store(out, at, Slot::Strings(items));
                Ok(())
            }

            (FieldKind::WString, ArrayShape::Scalar) => {
                let value = self.read_wstring(cursor, field)?;
                store(out, at, Slot::WString(value));
                Ok(())
            }
            (FieldKind::WString, ArrayShape::Fixed(n)) => (0..n).try_for_each(|i| {
                let value = self.read_wstring(cursor, field)?;
                store(out, at + i * HANDLE_SIZE, Slot::WString(value));
                Ok(())
            }),
            (FieldKind::WString, shape) => {
                let count = self.read_sequence_count(cursor, field, shape)?;
                let mut items = try_with_capacity(count, cursor.remaining(), COUNT_WIDTH)?;
                for _ in 0..count {
                    items.push(self.read_wstring(cursor, field)?);
                }
                store(out, at, Slot::WStrings(items));
                Ok(())
            }

            (FieldKind::Message(nested), ArrayShape::Scalar) => {
                self.read_message(cursor, nested, out, at, depth + 1)
            }
            (FieldKind::Message(nested), ArrayShape::Fixed(n)) => (0..n).try_for_each(|i| {
                self.read_message(cursor, nested, out, at + i * nested.size(), depth + 1)
            }),
            (FieldKind::Message(nested), shape) => {
                let count = self.read_sequence_count(cursor, field, shape)?;
                let min = nested.min_wire_size();
                if min == 0 {
                    // Zero-width elements consume no input, so the input
                    // length cannot bound the count.
                    let max = self.config.empty_element_limit();
                    if count > max {
                        return Err(Error::bound_exceeded(&field.name, count, max));
                    }
                } else {
                    cursor.ensure(count.saturating_mul(min))?;
                }
                let mut items = try_with_capacity(count, cursor.remaining(), min)?;
                for _ in 0..count {
                    let mut item = MessageInstance::try_zeroed(nested.size())?;
                    self.read_message(cursor, nested, &mut item, 0, depth + 1)?;
                    items.push(item);
                }
                store(out, at, Slot::Messages(items));
                Ok(())
            }
        }
    }

    /// Reads a sequence count and validates it against the field bound, or
    /// the configured cap for unbounded sequences.
    fn read_sequence_count(
        &self,
        cursor: &mut ReadCursor<'_>,
        field: &FieldDescriptor,
        shape: ArrayShape,
    ) -> Result<usize> {
        let count = cursor.read_count()?;
        let max = match shape {
            ArrayShape::Bounded(max) => max,
            _ => self.config.sequence_limit(),
        };
        if count > max {
            return Err(Error::bound_exceeded(&field.name, count, max));
        }
        Ok(count)
    }

    /// Reads a string length and validates it against the string bound, or
    /// the configured cap for unbounded strings.
    fn read_string_len(
        &self,
        cursor: &mut ReadCursor<'_>,
        field: &FieldDescriptor,
    ) -> Result<usize> {
        let len = cursor.read_count()?;
        let max = field.string_bound.unwrap_or(self.config.string_limit());
        if len > max {
            return Err(Error::bound_exceeded(&field.name, len, max));
        }
        Ok(len)
    }

    fn read_string(&self, cursor: &mut ReadCursor<'_>, field: &FieldDescriptor) -> Result<Vec<u8>> {
        let len = self.read_string_len(cursor, field)?;
        try_copy(cursor.take(len)?)
    }

    fn read_wstring(
        &self,
        cursor: &mut ReadCursor<'_>,
        field: &FieldDescriptor,
    ) -> Result<Vec<u16>> {
        let len = self.read_string_len(cursor, field)?;
        units_from_ne(cursor.take_elements(len, 2)?)
    }
}

fn inline_mut<'i>(
    out: &'i mut MessageInstance,
    at: usize,
    len: usize,
    field: &FieldDescriptor,
) -> Result<&'i mut [u8]> {
    let block = out.block_mut();
    match at.checked_add(len) {
        Some(end) if end <= block.len() => Ok(&mut block[at..end]),
        _ => Err(Error::layout(format!(
            "field '{}' lies outside the instance block",
            field.name
        ))),
    }
}

/// Stores a decoded slot; empty values leave the slot absent.
fn store(out: &mut MessageInstance, key: usize, slot: Slot) {
    if slot.is_empty() {
        out.remove_slot(key);
    } else {
        out.insert_slot(key, slot);
    }
}
