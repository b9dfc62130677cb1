//! Dynamic message instances.
//!
//! A [`MessageInstance`] stores one message as a zero-initialized block of
//! `schema.size()` bytes plus a table of out-of-line [`Slot`]s.
//!
//! - Scalars, fixed arrays of primitives and inline nested messages live in
//!   the block at their field offsets, in native byte order.
//! - Strings, wide strings and sequences live in slots keyed by the absolute
//!   block offset of the field's handle. A fixed array of N strings uses the
//!   keys `offset + i * HANDLE_SIZE`.
//!
//! A missing slot reads as an empty string or sequence, which is what a
//! freshly initialized runtime struct contains.

use crate::error::InstanceError;
use crate::types::TypeSchema;
use crate::view::{InstanceView, InstanceViewMut};
use dyncodec_core::{Error, Result};
use std::collections::BTreeMap;

/// Out-of-line storage for one string or sequence field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Byte string contents, no terminator.
    String(Vec<u8>),
    /// Wide string contents in 16-bit code units, no terminator.
    WString(Vec<u16>),
    /// Sequence of primitives, packed in native byte order.
    Primitives(Vec<u8>),
    /// Sequence of byte strings.
    Strings(Vec<Vec<u8>>),
    /// Sequence of wide strings.
    WStrings(Vec<Vec<u16>>),
    /// Sequence of nested messages, each with its own block.
    Messages(Vec<MessageInstance>),
}

impl Slot {
    /// Returns a short name of the slot variant.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::WString(_) => "wstring",
            Self::Primitives(_) => "primitive sequence",
            Self::Strings(_) => "string sequence",
            Self::WStrings(_) => "wstring sequence",
            Self::Messages(_) => "message sequence",
        }
    }

    /// Returns true if the slot holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(bytes) | Self::Primitives(bytes) => bytes.is_empty(),
            Self::WString(units) => units.is_empty(),
            Self::Strings(items) => items.is_empty(),
            Self::WStrings(items) => items.is_empty(),
            Self::Messages(items) => items.is_empty(),
        }
    }
}

/// One message value laid out according to a [`TypeSchema`].
///
/// Equality is field equality: an empty slot equals a missing one.
#[derive(Debug, Clone, Default)]
pub struct MessageInstance {
    block: Vec<u8>,
    slots: BTreeMap<usize, Slot>,
}

impl MessageInstance {
    /// Creates a zero-initialized instance of `schema`.
    #[must_use]
    pub fn new(schema: &TypeSchema) -> Self {
        Self::zeroed(schema.size())
    }

    /// Creates a zero-initialized instance with a block of `size` bytes.
    #[must_use]
    pub fn zeroed(size: usize) -> Self {
        Self {
            block: vec![0; size],
            slots: BTreeMap::new(),
        }
    }

    /// Creates a zero-initialized instance, reporting allocation failure.
    ///
    /// # Errors
    /// Returns [`Error::AllocationFailure`] if the block cannot be allocated.
    pub fn try_zeroed(size: usize) -> Result<Self> {
        let mut block = Vec::new();
        block
            .try_reserve_exact(size)
            .map_err(|_| Error::AllocationFailure { requested: size })?;
        block.resize(size, 0);
        Ok(Self {
            block,
            slots: BTreeMap::new(),
        })
    }

    /// Returns the size of the inline block.
    #[must_use]
    pub fn size(&self) -> usize {
        self.block.len()
    }

    /// Returns the inline block.
    #[must_use]
    pub fn block(&self) -> &[u8] {
        &self.block
    }

    /// Returns the inline block for writing.
    pub fn block_mut(&mut self) -> &mut [u8] {
        &mut self.block
    }

    /// Returns the slot stored under `offset`.
    #[must_use]
    pub fn slot(&self, offset: usize) -> Option<&Slot> {
        self.slots.get(&offset)
    }

    /// Returns the slot stored under `offset` for writing.
    pub fn slot_mut(&mut self, offset: usize) -> Option<&mut Slot> {
        self.slots.get_mut(&offset)
    }

    /// Stores a slot under `offset`, returning the previous one.
    pub fn insert_slot(&mut self, offset: usize, slot: Slot) -> Option<Slot> {
        self.slots.insert(offset, slot)
    }

    /// Removes the slot stored under `offset`.
    pub fn remove_slot(&mut self, offset: usize) -> Option<Slot> {
        self.slots.remove(&offset)
    }

    /// Returns the number of stored slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Zeroes the block and drops every slot.
    pub fn reset(&mut self) {
        self.block.fill(0);
        self.slots.clear();
    }

    fn populated(&self) -> impl Iterator<Item = (&usize, &Slot)> {
        self.slots.iter().filter(|(_, slot)| !slot.is_empty())
    }

    pub(crate) fn slot_or_insert(
        &mut self,
        offset: usize,
        make: impl FnOnce() -> Slot,
    ) -> &mut Slot {
        self.slots.entry(offset).or_insert_with(make)
    }

    /// Checks that the block has the size `schema` declares.
    ///
    /// # Errors
    /// Returns [`InstanceError::SizeMismatch`] otherwise.
    pub fn check_size(&self, schema: &TypeSchema) -> std::result::Result<(), InstanceError> {
        if self.size() == schema.size() {
            Ok(())
        } else {
            Err(InstanceError::SizeMismatch {
                type_name: schema.qualified_name(),
                expected: schema.size(),
                actual: self.size(),
            })
        }
    }

    /// Returns a read-only typed view of the instance.
    ///
    /// # Errors
    /// Returns [`InstanceError::SizeMismatch`] if the instance was not built
    /// for `schema`.
    pub fn view<'a>(
        &'a self,
        schema: &'a TypeSchema,
    ) -> std::result::Result<InstanceView<'a>, InstanceError> {
        self.check_size(schema)?;
        Ok(InstanceView::new(schema, self, 0))
    }

    /// Returns a mutable typed view of the instance.
    ///
    /// # Errors
    /// Returns [`InstanceError::SizeMismatch`] if the instance was not built
    /// for `schema`.
    pub fn view_mut<'a>(
        &'a mut self,
        schema: &'a TypeSchema,
    ) -> std::result::Result<InstanceViewMut<'a>, InstanceError> {
        self.check_size(schema)?;
        Ok(InstanceViewMut::new(schema, self, 0))
    }
}

impl PartialEq for MessageInstance {
    fn eq(&self, other: &Self) -> bool {
        self.block == other.block && self.populated().eq(other.populated())
    }
}

impl Eq for MessageInstance {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::INTROSPECTION_C;

    #[test]
    fn test_new_instance_is_zeroed() {
        let schema = TypeSchema::new("pkg::msg", "Blob", INTROSPECTION_C, 16, Vec::new());
        let instance = MessageInstance::new(&schema);
        assert_eq!(instance.size(), 16);
        assert!(instance.block().iter().all(|b| *b == 0));
        assert_eq!(instance.slot_count(), 0);
    }

    #[test]
    fn test_slots() {
        let mut instance = MessageInstance::zeroed(8);
        assert!(instance.slot(0).is_none());
        assert!(instance.insert_slot(0, Slot::String(b"hi".to_vec())).is_none());
        assert_eq!(instance.slot(0), Some(&Slot::String(b"hi".to_vec())));

        if let Some(Slot::String(s)) = instance.slot_mut(0) {
            s.push(b'!');
        }
        assert_eq!(instance.remove_slot(0), Some(Slot::String(b"hi!".to_vec())));
    }

    #[test]
    fn test_empty_slot_equals_missing() {
        let mut a = MessageInstance::zeroed(4);
        let b = MessageInstance::zeroed(4);
        a.insert_slot(0, Slot::Strings(Vec::new()));
        assert_eq!(a, b);

        a.insert_slot(0, Slot::Strings(vec![Vec::new()]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_reset() {
        let mut instance = MessageInstance::zeroed(4);
        instance.block_mut()[0] = 7;
        instance.insert_slot(0, Slot::Primitives(vec![1, 2]));
        instance.reset();
        assert_eq!(instance, MessageInstance::zeroed(4));
    }

    #[test]
    fn test_try_zeroed() {
        let instance = MessageInstance::try_zeroed(32).unwrap();
        assert_eq!(instance.size(), 32);
        assert!(matches!(
            MessageInstance::try_zeroed(usize::MAX),
            Err(Error::AllocationFailure { .. })
        ));
    }

    #[test]
    fn test_view_rejects_wrong_size() {
        let schema = TypeSchema::new("pkg::msg", "Blob", INTROSPECTION_C, 16, Vec::new());
        let instance = MessageInstance::zeroed(8);
        assert!(matches!(
            instance.view(&schema),
            Err(InstanceError::SizeMismatch {
                expected: 16,
                actual: 8,
                ..
            })
        ));
    }
}
