//! Builder for introspection member tables.
//!
//! Real providers hand out tables generated alongside the message structs.
//! [`MembersBuilder`] produces equivalent tables at runtime, laying members
//! out the way a C compiler would (each member at its natural alignment,
//! total size rounded to the largest alignment), which is what tools, tests
//! and bridges without generated code need.

use crate::introspection::{MessageMember, MessageMembers, NestedMembers, type_id};
use crate::types::HANDLE_SIZE;
use std::sync::Arc;

const HANDLE_ALIGN: usize = std::mem::align_of::<usize>();
const MESSAGE_ALIGN: usize = 8;

/// Returns the inline size and alignment of one element of `type_id`.
fn element_layout(type_id: u8, nested: Option<&MessageMembers>) -> (usize, usize) {
    match type_id {
        type_id::CHAR | type_id::BOOLEAN | type_id::OCTET | type_id::UINT8 | type_id::INT8 => {
            (1, 1)
        }
        type_id::WCHAR | type_id::UINT16 | type_id::INT16 => (2, 2),
        type_id::FLOAT | type_id::UINT32 | type_id::INT32 => (4, 4),
        type_id::DOUBLE | type_id::UINT64 | type_id::INT64 => (8, 8),
        type_id::LONG_DOUBLE => (16, 16),
        type_id::STRING | type_id::WSTRING => (HANDLE_SIZE, HANDLE_ALIGN),
        type_id::MESSAGE => (nested.map_or(0, |m| m.size_of), MESSAGE_ALIGN),
        _ => (0, 1),
    }
}

const fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

/// Fluent builder for a [`MessageMembers`] table.
///
/// # Example
/// ```
/// use dyncodec_schema::builder::MembersBuilder;
/// use dyncodec_schema::introspection::type_id;
///
/// let members = MembersBuilder::new("geometry_msgs::msg", "Point")
///     .field("x", type_id::DOUBLE)
///     .field("y", type_id::DOUBLE)
///     .field("z", type_id::DOUBLE)
///     .build();
/// assert_eq!(members.size_of, 24);
/// assert_eq!(members.members[2].offset, 16);
/// ```
#[derive(Debug, Clone)]
pub struct MembersBuilder {
    namespace: String,
    name: String,
    members: Vec<MessageMember>,
    cursor: usize,
    max_align: usize,
}

impl MembersBuilder {
    /// Creates an empty table for `namespace` / `name`.
    ///
    /// The namespace is stored verbatim, so it must already be spelled in
    /// the convention of the flavor the table will be used with.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            members: Vec::new(),
            cursor: 0,
            max_align: 1,
        }
    }

    fn push(
        mut self,
        name: &str,
        type_id: u8,
        nested: Option<&Arc<MessageMembers>>,
        shape: (bool, usize, bool),
    ) -> Self {
        let (is_array, array_size, is_upper_bound) = shape;
        let (size, align) = if is_array && (is_upper_bound || array_size == 0) {
            (HANDLE_SIZE, HANDLE_ALIGN)
        } else {
            let (size, align) = element_layout(type_id, nested.map(Arc::as_ref));
            (size * array_size.max(1), align)
        };

        let offset = align_up(self.cursor, align);
        self.cursor = offset + size;
        self.max_align = self.max_align.max(align);
        self.members.push(MessageMember {
            members: nested.map(|m| NestedMembers::Strong(Arc::clone(m))),
            is_array,
            array_size,
            is_upper_bound,
            ..MessageMember::new(name, type_id, offset)
        });
        self
    }

    /// Appends a scalar member.
    #[must_use]
    pub fn field(self, name: &str, type_id: u8) -> Self {
        self.push(name, type_id, None, (false, 0, false))
    }

    /// Appends a fixed-length array member.
    #[must_use]
    pub fn fixed_array(self, name: &str, type_id: u8, len: usize) -> Self {
        self.push(name, type_id, None, (true, len, false))
    }

    /// Appends a bounded sequence member.
    #[must_use]
    pub fn bounded_sequence(self, name: &str, type_id: u8, max: usize) -> Self {
        self.push(name, type_id, None, (true, max, true))
    }

    /// Appends an unbounded sequence member.
    #[must_use]
    pub fn sequence(self, name: &str, type_id: u8) -> Self {
        self.push(name, type_id, None, (true, 0, false))
    }

    /// Appends a nested message member.
    #[must_use]
    pub fn message(self, name: &str, nested: &Arc<MessageMembers>) -> Self {
        self.push(name, type_id::MESSAGE, Some(nested), (false, 0, false))
    }

    /// Appends a fixed-length array of nested messages.
    #[must_use]
    pub fn message_array(self, name: &str, nested: &Arc<MessageMembers>, len: usize) -> Self {
        self.push(name, type_id::MESSAGE, Some(nested), (true, len, false))
    }

    /// Appends a bounded sequence of nested messages.
    #[must_use]
    pub fn message_bounded_sequence(
        self,
        name: &str,
        nested: &Arc<MessageMembers>,
        max: usize,
    ) -> Self {
        self.push(name, type_id::MESSAGE, Some(nested), (true, max, true))
    }

    /// Appends an unbounded sequence of nested messages.
    #[must_use]
    pub fn message_sequence(self, name: &str, nested: &Arc<MessageMembers>) -> Self {
        self.push(name, type_id::MESSAGE, Some(nested), (true, 0, false))
    }

    /// Appends a bounded string member.
    #[must_use]
    pub fn bounded_string(mut self, name: &str, bound: usize) -> Self {
        self = self.field(name, type_id::STRING);
        if let Some(member) = self.members.last_mut() {
            member.string_upper_bound = bound;
        }
        self
    }

    /// Appends a member exactly as given, reserving `footprint` bytes after
    /// its declared offset.
    #[must_use]
    pub fn raw_member(mut self, member: MessageMember, footprint: usize) -> Self {
        self.cursor = self.cursor.max(member.offset.saturating_add(footprint));
        self.max_align = self.max_align.max(MESSAGE_ALIGN);
        self.members.push(member);
        self
    }

    /// Finishes the table, rounding the size up to the largest alignment.
    #[must_use]
    pub fn build(self) -> Arc<MessageMembers> {
        Arc::new(MessageMembers {
            message_namespace: self.namespace,
            message_name: self.name,
            size_of: align_up(self.cursor, self.max_align),
            members: self.members,
        })
    }
}
