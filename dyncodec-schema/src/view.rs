//! Typed field accessors over a [`MessageInstance`].
//!
//! Views pair an instance with its schema and a base offset, so an inline
//! nested message is just a view of the same block shifted by the field
//! offset. Every accessor checks the field's kind and shape against the
//! requested Rust type before touching storage.

use crate::error::InstanceError;
use crate::instance::{MessageInstance, Slot};
use crate::types::{ArrayShape, FieldDescriptor, FieldKind, HANDLE_SIZE, TypeSchema};
use dyncodec_core::Scalar;
use std::any::type_name;

type Result<T> = std::result::Result<T, InstanceError>;

fn lookup<'s>(schema: &'s TypeSchema, name: &str) -> Result<&'s FieldDescriptor> {
    schema.field(name).ok_or_else(|| InstanceError::not_found(name))
}

fn mismatch(field: &FieldDescriptor, expected: impl Into<String>) -> InstanceError {
    InstanceError::mismatch(&field.name, expected, field.describe())
}

fn slot_mismatch(field: &FieldDescriptor, slot: &Slot) -> InstanceError {
    InstanceError::mismatch(&field.name, field.describe(), slot.name())
}

/// Checks that `field` holds primitives readable as `T`, in any shape.
fn check_primitive<T: Scalar>(
    field: &FieldDescriptor,
    expected: impl FnOnce() -> String,
) -> Result<()> {
    match field.kind.primitive() {
        Some(kind) if T::accepts(kind) => Ok(()),
        _ => Err(mismatch(field, expected())),
    }
}

fn scalar_of<'s, T: Scalar>(schema: &'s TypeSchema, name: &str) -> Result<&'s FieldDescriptor> {
    let field = lookup(schema, name)?;
    let expected = || type_name::<T>().to_string();
    check_primitive::<T>(field, expected)?;
    if field.shape != ArrayShape::Scalar {
        return Err(mismatch(field, expected()));
    }
    Ok(field)
}

fn fixed_of<'s, T: Scalar>(
    schema: &'s TypeSchema,
    name: &str,
) -> Result<(&'s FieldDescriptor, usize)> {
    let field = lookup(schema, name)?;
    let expected = || format!("{}[N]", type_name::<T>());
    check_primitive::<T>(field, expected)?;
    match field.shape {
        ArrayShape::Fixed(n) => Ok((field, n)),
        _ => Err(mismatch(field, expected())),
    }
}

fn sequence_of<'s, T: Scalar>(schema: &'s TypeSchema, name: &str) -> Result<&'s FieldDescriptor> {
    let field = lookup(schema, name)?;
    let expected = || format!("{}[]", type_name::<T>());
    check_primitive::<T>(field, expected)?;
    if !field.shape.is_sequence() {
        return Err(mismatch(field, expected()));
    }
    Ok(field)
}

fn with_kind<'s>(
    schema: &'s TypeSchema,
    name: &str,
    kind: &FieldKind,
    shape_ok: impl FnOnce(ArrayShape) -> bool,
    expected: &str,
) -> Result<&'s FieldDescriptor> {
    let field = lookup(schema, name)?;
    if std::mem::discriminant(&field.kind) != std::mem::discriminant(kind)
        || !shape_ok(field.shape)
    {
        return Err(mismatch(field, expected));
    }
    Ok(field)
}

/// Returns the block range of `len` bytes of `field` under `base`.
///
/// Schemas built by hand skip layout validation, so the range is checked
/// here rather than trusted.
fn block_range(
    field: &FieldDescriptor,
    base: usize,
    len: usize,
    size: usize,
) -> Result<std::ops::Range<usize>> {
    let start = base.checked_add(field.offset);
    match start.and_then(|start| start.checked_add(len)) {
        Some(end) if end <= size => Ok(end - len..end),
        _ => Err(InstanceError::OutsideBlock {
            field: field.name.clone(),
            offset: base.saturating_add(field.offset),
            len,
            size,
        }),
    }
}

fn message_of<'s>(
    schema: &'s TypeSchema,
    name: &str,
    shape_ok: impl FnOnce(ArrayShape) -> bool,
    expected: &str,
) -> Result<(&'s FieldDescriptor, &'s TypeSchema)> {
    let field = lookup(schema, name)?;
    match field.kind.message() {
        Some(nested) if shape_ok(field.shape) => Ok((field, nested.as_ref())),
        _ => Err(mismatch(field, expected)),
    }
}

fn is_scalar(shape: ArrayShape) -> bool {
    shape == ArrayShape::Scalar
}

fn is_array(shape: ArrayShape) -> bool {
    shape != ArrayShape::Scalar
}

fn read_packed<T: Scalar>(bytes: &[u8]) -> Vec<T> {
    bytes.chunks_exact(T::WIDTH).map(T::read_ne).collect()
}

fn pack<T: Scalar>(values: &[T]) -> Vec<u8> {
    let mut bytes = vec![0; values.len() * T::WIDTH];
    for (chunk, value) in bytes.chunks_exact_mut(T::WIDTH).zip(values) {
        value.write_ne(chunk);
    }
    bytes
}

fn check_len(field: &FieldDescriptor, len: usize, expected: usize) -> Result<()> {
    if len == expected {
        Ok(())
    } else {
        Err(InstanceError::IndexOutOfBounds {
            field: field.name.clone(),
            index: len,
            length: expected,
        })
    }
}

fn out_of_bounds(field: &FieldDescriptor, index: usize, length: usize) -> InstanceError {
    InstanceError::IndexOutOfBounds {
        field: field.name.clone(),
        index,
        length,
    }
}

/// Read-only view of one message inside an instance.
#[derive(Debug, Clone, Copy)]
pub struct InstanceView<'a> {
    schema: &'a TypeSchema,
    instance: &'a MessageInstance,
    base: usize,
}

impl<'a> InstanceView<'a> {
    pub(crate) const fn new(
        schema: &'a TypeSchema,
        instance: &'a MessageInstance,
        base: usize,
    ) -> Self {
        Self {
            schema,
            instance,
            base,
        }
    }

    /// Returns the schema of the viewed message.
    #[must_use]
    pub const fn schema(&self) -> &'a TypeSchema {
        self.schema
    }

    fn bytes(&self, field: &FieldDescriptor, len: usize) -> Result<&'a [u8]> {
        let block = self.instance.block();
        let range = block_range(field, self.base, len, block.len())?;
        Ok(&block[range])
    }

    fn slot(&self, field: &FieldDescriptor) -> Option<&'a Slot> {
        self.instance.slot(self.base + field.offset)
    }

    /// Reads a scalar primitive field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn get<T: Scalar>(&self, name: &str) -> Result<T> {
        let field = scalar_of::<T>(self.schema, name)?;
        Ok(T::read_ne(self.bytes(field, T::WIDTH)?))
    }

    /// Reads a fixed-length primitive array field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn array<T: Scalar>(&self, name: &str) -> Result<Vec<T>> {
        let (field, n) = fixed_of::<T>(self.schema, name)?;
        Ok(read_packed(self.bytes(field, n.saturating_mul(T::WIDTH))?))
    }

    /// Reads a bounded or unbounded primitive sequence field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn sequence<T: Scalar>(&self, name: &str) -> Result<Vec<T>> {
        let field = sequence_of::<T>(self.schema, name)?;
        match self.slot(field) {
            None => Ok(Vec::new()),
            Some(Slot::Primitives(bytes)) => Ok(read_packed(bytes)),
            Some(other) => Err(slot_mismatch(field, other)),
        }
    }

    /// Reads a scalar string field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn string(&self, name: &str) -> Result<&'a [u8]> {
        let field = with_kind(self.schema, name, &FieldKind::String, is_scalar, "string")?;
        match self.slot(field) {
            None => Ok(&[][..]),
            Some(Slot::String(bytes)) => Ok(bytes.as_slice()),
            Some(other) => Err(slot_mismatch(field, other)),
        }
    }

    /// Reads a scalar wide string field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn wstring(&self, name: &str) -> Result<&'a [u16]> {
        let field = with_kind(self.schema, name, &FieldKind::WString, is_scalar, "wstring")?;
        match self.slot(field) {
            None => Ok(&[][..]),
            Some(Slot::WString(units)) => Ok(units.as_slice()),
            Some(other) => Err(slot_mismatch(field, other)),
        }
    }

    /// Reads a string array or sequence field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn strings(&self, name: &str) -> Result<Vec<&'a [u8]>> {
        let field = with_kind(self.schema, name, &FieldKind::String, is_array, "string[]")?;
        match field.shape {
            ArrayShape::Fixed(n) => (0..n)
                .map(|i| match self.instance.slot(self.base + field.offset + i * HANDLE_SIZE) {
                    None => Ok(&[][..]),
                    Some(Slot::String(bytes)) => Ok(bytes.as_slice()),
                    Some(other) => Err(slot_mismatch(field, other)),
                })
                .collect(),
            _ => match self.slot(field) {
                None => Ok(Vec::new()),
                Some(Slot::Strings(items)) => Ok(items.iter().map(Vec::as_slice).collect()),
                Some(other) => Err(slot_mismatch(field, other)),
            },
        }
    }

    /// Reads a wide string array or sequence field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn wstrings(&self, name: &str) -> Result<Vec<&'a [u16]>> {
        let field = with_kind(self.schema, name, &FieldKind::WString, is_array, "wstring[]")?;
        match field.shape {
            ArrayShape::Fixed(n) => (0..n)
                .map(|i| match self.instance.slot(self.base + field.offset + i * HANDLE_SIZE) {
                    None => Ok(&[][..]),
                    Some(Slot::WString(units)) => Ok(units.as_slice()),
                    Some(other) => Err(slot_mismatch(field, other)),
                })
                .collect(),
            _ => match self.slot(field) {
                None => Ok(Vec::new()),
                Some(Slot::WStrings(items)) => Ok(items.iter().map(Vec::as_slice).collect()),
                Some(other) => Err(slot_mismatch(field, other)),
            },
        }
    }

    /// Returns a view of a scalar nested message field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn message(&self, name: &str) -> Result<InstanceView<'a>> {
        let (field, nested) = message_of(self.schema, name, is_scalar, "message")?;
        Ok(Self::new(nested, self.instance, self.base + field.offset))
    }

    /// Returns views of every element of a message array or sequence field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`], [`InstanceError::KindMismatch`]
    /// or [`InstanceError::SizeMismatch`] for a malformed sequence element.
    pub fn messages(&self, name: &str) -> Result<Vec<InstanceView<'a>>> {
        let (field, nested) = message_of(self.schema, name, is_array, "message[]")?;
        match field.shape {
            ArrayShape::Fixed(n) => {
                let start = self.base + field.offset;
                Ok((0..n)
                    .map(|i| Self::new(nested, self.instance, start + i * nested.size()))
                    .collect())
            }
            _ => match self.slot(field) {
                None => Ok(Vec::new()),
                Some(Slot::Messages(items)) => items.iter().map(|item| item.view(nested)).collect(),
                Some(other) => Err(slot_mismatch(field, other)),
            },
        }
    }

    /// Returns the element count of a field: 1 for scalars, N for fixed
    /// arrays, the current length for sequences.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`].
    pub fn len(&self, name: &str) -> Result<usize> {
        let field = lookup(self.schema, name)?;
        Ok(match field.shape {
            ArrayShape::Scalar => 1,
            ArrayShape::Fixed(n) => n,
            ArrayShape::Bounded(_) | ArrayShape::Unbounded => {
                match (self.slot(field), &field.kind) {
                    (None, _) => 0,
                    (Some(Slot::Primitives(bytes)), FieldKind::Primitive(p)) => {
                        bytes.len() / p.size()
                    }
                    (Some(Slot::Strings(items)), _) => items.len(),
                    (Some(Slot::WStrings(items)), _) => items.len(),
                    (Some(Slot::Messages(items)), _) => items.len(),
                    (Some(other), _) => return Err(slot_mismatch(field, other)),
                }
            }
        })
    }
}

/// Mutable view of one message inside an instance.
#[derive(Debug)]
pub struct InstanceViewMut<'a> {
    schema: &'a TypeSchema,
    instance: &'a mut MessageInstance,
    base: usize,
}

impl<'a> InstanceViewMut<'a> {
    pub(crate) fn new(
        schema: &'a TypeSchema,
        instance: &'a mut MessageInstance,
        base: usize,
    ) -> Self {
        Self {
            schema,
            instance,
            base,
        }
    }

    /// Returns the schema of the viewed message.
    #[must_use]
    pub const fn schema(&self) -> &'a TypeSchema {
        self.schema
    }

    /// Returns a read-only view of the same message.
    #[must_use]
    pub fn as_view(&self) -> InstanceView<'_> {
        InstanceView::new(self.schema, &*self.instance, self.base)
    }

    fn bytes_mut(&mut self, field: &FieldDescriptor, len: usize) -> Result<&mut [u8]> {
        let block = self.instance.block_mut();
        let range = block_range(field, self.base, len, block.len())?;
        Ok(&mut block[range])
    }

    /// Writes a scalar primitive field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn set<T: Scalar>(&mut self, name: &str, value: T) -> Result<()> {
        let field = scalar_of::<T>(self.schema, name)?;
        value.write_ne(self.bytes_mut(field, T::WIDTH)?);
        Ok(())
    }

    /// Writes a fixed-length primitive array field.
    ///
    /// # Errors
    /// Returns [`InstanceError::IndexOutOfBounds`] unless exactly N values
    /// are given.
    pub fn set_array<T: Scalar>(&mut self, name: &str, values: &[T]) -> Result<()> {
        let (field, n) = fixed_of::<T>(self.schema, name)?;
        check_len(field, values.len(), n)?;
        let bytes = self.bytes_mut(field, n.saturating_mul(T::WIDTH))?;
        for (chunk, value) in bytes.chunks_exact_mut(T::WIDTH).zip(values) {
            value.write_ne(chunk);
        }
        Ok(())
    }

    /// Replaces the contents of a primitive sequence field.
    ///
    /// Bounded sequences are not checked here; the serializer rejects
    /// over-long ones.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn set_sequence<T: Scalar>(&mut self, name: &str, values: &[T]) -> Result<()> {
        let field = sequence_of::<T>(self.schema, name)?;
        self.instance
            .insert_slot(self.base + field.offset, Slot::Primitives(pack(values)));
        Ok(())
    }

    /// Writes a scalar string field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn set_string(&mut self, name: &str, value: impl AsRef<[u8]>) -> Result<()> {
        let field = with_kind(self.schema, name, &FieldKind::String, is_scalar, "string")?;
        self.instance
            .insert_slot(self.base + field.offset, Slot::String(value.as_ref().to_vec()));
        Ok(())
    }

    /// Writes a scalar wide string field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn set_wstring(&mut self, name: &str, value: &[u16]) -> Result<()> {
        let field = with_kind(self.schema, name, &FieldKind::WString, is_scalar, "wstring")?;
        self.instance
            .insert_slot(self.base + field.offset, Slot::WString(value.to_vec()));
        Ok(())
    }

    /// Writes a string array or sequence field.
    ///
    /// # Errors
    /// Returns [`InstanceError::IndexOutOfBounds`] if a fixed array is not
    /// given exactly N strings.
    pub fn set_strings<I, S>(&mut self, name: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let field = with_kind(self.schema, name, &FieldKind::String, is_array, "string[]")?;
        let values: Vec<Vec<u8>> = values.into_iter().map(|s| s.as_ref().to_vec()).collect();
        let key = self.base + field.offset;
        match field.shape {
            ArrayShape::Fixed(n) => {
                check_len(field, values.len(), n)?;
                for (i, value) in values.into_iter().enumerate() {
                    self.instance.insert_slot(key + i * HANDLE_SIZE, Slot::String(value));
                }
            }
            _ => {
                self.instance.insert_slot(key, Slot::Strings(values));
            }
        }
        Ok(())
    }

    /// Writes a wide string array or sequence field.
    ///
    /// # Errors
    /// Returns [`InstanceError::IndexOutOfBounds`] if a fixed array is not
    /// given exactly N strings.
    pub fn set_wstrings(&mut self, name: &str, values: &[&[u16]]) -> Result<()> {
        let field = with_kind(self.schema, name, &FieldKind::WString, is_array, "wstring[]")?;
        let key = self.base + field.offset;
        match field.shape {
            ArrayShape::Fixed(n) => {
                check_len(field, values.len(), n)?;
                for (i, value) in values.iter().enumerate() {
                    self.instance
                        .insert_slot(key + i * HANDLE_SIZE, Slot::WString(value.to_vec()));
                }
            }
            _ => {
                let items = values.iter().map(|v| v.to_vec()).collect();
                self.instance.insert_slot(key, Slot::WStrings(items));
            }
        }
        Ok(())
    }

    /// Returns a mutable view of a scalar nested message field.
    ///
    /// # Errors
    /// Returns [`InstanceError::FieldNotFound`] or [`InstanceError::KindMismatch`].
    pub fn message_mut(&mut self, name: &str) -> Result<InstanceViewMut<'_>> {
        let (field, nested) = message_of(self.schema, name, is_scalar, "message")?;
        let base = self.base + field.offset;
        Ok(InstanceViewMut::new(nested, &mut *self.instance, base))
    }

    /// Returns a mutable view of element `index` of a message array or
    /// sequence field.
    ///
    /// # Errors
    /// Returns [`InstanceError::IndexOutOfBounds`] if `index` is past the end.
    pub fn message_at_mut(&mut self, name: &str, index: usize) -> Result<InstanceViewMut<'_>> {
        let (field, nested) = message_of(self.schema, name, is_array, "message[]")?;
        let key = self.base + field.offset;
        match field.shape {
            ArrayShape::Fixed(n) => {
                if index >= n {
                    return Err(out_of_bounds(field, index, n));
                }
                Ok(InstanceViewMut::new(
                    nested,
                    &mut *self.instance,
                    key + index * nested.size(),
                ))
            }
            _ => match self.instance.slot_mut(key) {
                Some(Slot::Messages(items)) => {
                    let length = items.len();
                    let item = items
                        .get_mut(index)
                        .ok_or_else(|| out_of_bounds(field, index, length))?;
                    item.check_size(nested)?;
                    Ok(InstanceViewMut::new(nested, item, 0))
                }
                Some(other) => Err(slot_mismatch(field, other)),
                None => Err(out_of_bounds(field, index, 0)),
            },
        }
    }

    /// Appends a zeroed element to a message sequence field and returns a
    /// mutable view of it.
    ///
    /// # Errors
    /// Returns [`InstanceError::KindMismatch`] unless the field is a
    /// sequence of messages.
    pub fn push_message(&mut self, name: &str) -> Result<InstanceViewMut<'_>> {
        let (field, nested) = message_of(self.schema, name, |s| s.is_sequence(), "message[]")?;
        let slot = self
            .instance
            .slot_or_insert(self.base + field.offset, || Slot::Messages(Vec::new()));
        match slot {
            Slot::Messages(items) => {
                let index = items.len();
                items.push(MessageInstance::new(nested));
                Ok(InstanceViewMut::new(nested, &mut items[index], 0))
            }
            other => Err(slot_mismatch(field, other)),
        }
    }

    /// Empties a sequence or string field.
    ///
    /// # Errors
    /// Returns [`InstanceError::KindMismatch`] for fields stored inline.
    pub fn clear(&mut self, name: &str) -> Result<()> {
        let field = lookup(self.schema, name)?;
        if !field.is_out_of_line() {
            return Err(mismatch(field, "string or sequence"));
        }
        let key = self.base + field.offset;
        match field.shape {
            ArrayShape::Fixed(n) => {
                for i in 0..n {
                    self.instance.remove_slot(key + i * HANDLE_SIZE);
                }
            }
            _ => {
                self.instance.remove_slot(key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::build_schema;
    use crate::builder::MembersBuilder;
    use crate::introspection::{INTROSPECTION_CPP, TypeSupport, type_id};
    use std::sync::Arc;

    fn schema() -> Arc<TypeSchema> {
        let point = MembersBuilder::new("pkg::msg", "Point")
            .field("x", type_id::DOUBLE)
            .field("y", type_id::DOUBLE)
            .build();
        let members = MembersBuilder::new("pkg::msg", "Sample")
            .field("id", type_id::INT32)
            .field("ok", type_id::BOOLEAN)
            .field("name", type_id::STRING)
            .field("wide", type_id::WSTRING)
            .fixed_array("rgb", type_id::UINT8, 3)
            .sequence("values", type_id::FLOAT)
            .fixed_array("tags", type_id::STRING, 2)
            .sequence("labels", type_id::STRING)
            .message("origin", &point)
            .message_array("corners", &point, 2)
            .message_sequence("path", &point)
            .build();
        build_schema(&TypeSupport::new(INTROSPECTION_CPP, members)).unwrap()
    }

    #[test]
    fn test_fresh_instance_defaults() {
        let schema = schema();
        let instance = MessageInstance::new(&schema);
        let view = instance.view(&schema).unwrap();

        assert_eq!(view.get::<i32>("id").unwrap(), 0);
        assert!(!view.get::<bool>("ok").unwrap());
        assert_eq!(view.string("name").unwrap(), b"");
        assert!(view.wstring("wide").unwrap().is_empty());
        assert_eq!(view.array::<u8>("rgb").unwrap(), vec![0, 0, 0]);
        assert!(view.sequence::<f32>("values").unwrap().is_empty());
        assert_eq!(view.strings("tags").unwrap(), vec![&b""[..], &b""[..]]);
        assert_eq!(view.len("path").unwrap(), 0);
        assert_eq!(view.len("corners").unwrap(), 2);
    }

    #[test]
    fn test_set_and_get() {
        let schema = schema();
        let mut instance = MessageInstance::new(&schema);
        {
            let mut view = instance.view_mut(&schema).unwrap();
            view.set("id", -7i32).unwrap();
            view.set("ok", true).unwrap();
            view.set_string("name", "robot").unwrap();
            view.set_wstring("wide", &[0x48, 0x49]).unwrap();
            view.set_array("rgb", &[1u8, 2, 3]).unwrap();
            view.set_sequence("values", &[1.5f32, -2.0]).unwrap();
            view.set_strings("tags", ["a", "bc"]).unwrap();
            view.set_strings("labels", ["x"]).unwrap();
        }

        let view = instance.view(&schema).unwrap();
        assert_eq!(view.get::<i32>("id").unwrap(), -7);
        assert!(view.get::<bool>("ok").unwrap());
        assert_eq!(view.string("name").unwrap(), b"robot");
        assert_eq!(view.wstring("wide").unwrap(), &[0x48, 0x49]);
        assert_eq!(view.array::<u8>("rgb").unwrap(), vec![1, 2, 3]);
        assert_eq!(view.sequence::<f32>("values").unwrap(), vec![1.5, -2.0]);
        assert_eq!(view.strings("tags").unwrap(), vec![&b"a"[..], &b"bc"[..]]);
        assert_eq!(view.strings("labels").unwrap(), vec![&b"x"[..]]);
        assert_eq!(view.len("values").unwrap(), 2);
    }

    #[test]
    fn test_nested_messages() {
        let schema = schema();
        let mut instance = MessageInstance::new(&schema);
        {
            let mut view = instance.view_mut(&schema).unwrap();
            view.message_mut("origin").unwrap().set("x", 1.0f64).unwrap();
            view.message_at_mut("corners", 1).unwrap().set("y", 2.0f64).unwrap();
            view.push_message("path").unwrap().set("x", 3.0f64).unwrap();
            view.push_message("path").unwrap().set("y", 4.0f64).unwrap();
            view.message_at_mut("path", 0).unwrap().set("y", 5.0f64).unwrap();
        }

        let view = instance.view(&schema).unwrap();
        assert_eq!(view.message("origin").unwrap().get::<f64>("x").unwrap(), 1.0);

        let corners = view.messages("corners").unwrap();
        assert_eq!(corners[0].get::<f64>("y").unwrap(), 0.0);
        assert_eq!(corners[1].get::<f64>("y").unwrap(), 2.0);

        let path = view.messages("path").unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].get::<f64>("x").unwrap(), 3.0);
        assert_eq!(path[0].get::<f64>("y").unwrap(), 5.0);
        assert_eq!(path[1].get::<f64>("y").unwrap(), 4.0);
    }

    #[test]
    fn test_kind_mismatch() {
        let schema = schema();
        let mut instance = MessageInstance::new(&schema);
        let mut view = instance.view_mut(&schema).unwrap();

        assert!(matches!(
            view.set("id", 1u32),
            Err(InstanceError::KindMismatch { .. })
        ));
        assert!(matches!(
            view.set_string("id", "x"),
            Err(InstanceError::KindMismatch { .. })
        ));
        assert!(matches!(
            view.as_view().get::<u8>("rgb"),
            Err(InstanceError::KindMismatch { .. })
        ));
        assert!(matches!(
            view.push_message("corners"),
            Err(InstanceError::KindMismatch { .. })
        ));
        assert!(matches!(
            view.set("missing", 1i32),
            Err(InstanceError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn test_length_checks() {
        let schema = schema();
        let mut instance = MessageInstance::new(&schema);
        let mut view = instance.view_mut(&schema).unwrap();

        assert_eq!(
            view.set_array("rgb", &[1u8, 2]),
            Err(InstanceError::IndexOutOfBounds {
                field: "rgb".to_string(),
                index: 2,
                length: 3,
            })
        );
        assert!(matches!(
            view.message_at_mut("corners", 2),
            Err(InstanceError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            view.message_at_mut("path", 0),
            Err(InstanceError::IndexOutOfBounds { length: 0, .. })
        ));
    }

    #[test]
    fn test_clear() {
        let schema = schema();
        let mut instance = MessageInstance::new(&schema);
        let mut view = instance.view_mut(&schema).unwrap();
        view.set_string("name", "x").unwrap();
        view.set_strings("tags", ["a", "b"]).unwrap();
        view.clear("name").unwrap();
        view.clear("tags").unwrap();
        assert!(view.clear("id").is_err());
        assert_eq!(instance.slot_count(), 0);
    }

    #[test]
    fn test_unvalidated_layout_is_rejected() {
        use crate::introspection::INTROSPECTION_C;
        use crate::types::{ArrayShape, FieldDescriptor, FieldKind};
        use dyncodec_core::PrimitiveKind;

        let schema = TypeSchema::new(
            "pkg::msg",
            "Short",
            INTROSPECTION_C,
            4,
            vec![
                FieldDescriptor::new(
                    "wide",
                    FieldKind::Primitive(PrimitiveKind::Int64),
                    ArrayShape::Scalar,
                    0,
                ),
                FieldDescriptor::new(
                    "far",
                    FieldKind::Primitive(PrimitiveKind::Uint8),
                    ArrayShape::Fixed(2),
                    usize::MAX,
                ),
            ],
        );
        let mut instance = MessageInstance::new(&schema);

        let mut view = instance.view_mut(&schema).unwrap();
        assert_eq!(
            view.set("wide", 1i64),
            Err(InstanceError::OutsideBlock {
                field: "wide".to_string(),
                offset: 0,
                len: 8,
                size: 4,
            })
        );
        assert!(matches!(
            view.set_array("far", &[1u8, 2]),
            Err(InstanceError::OutsideBlock { .. })
        ));

        let view = instance.view(&schema).unwrap();
        assert!(matches!(
            view.get::<i64>("wide"),
            Err(InstanceError::OutsideBlock { .. })
        ));
        assert!(matches!(
            view.array::<u8>("far"),
            Err(InstanceError::OutsideBlock { .. })
        ));
    }
}
