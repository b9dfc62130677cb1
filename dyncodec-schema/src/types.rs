//! Schema type definitions.
//!
//! A [`TypeSchema`] is the immutable, resolved description of one message
//! type: its fields in wire order, each tagged with a [`FieldKind`] and an
//! [`ArrayShape`]. Nested message kinds hold an `Arc` to their own schema, so
//! a schema tree is shared freely across threads once built.

use dyncodec_core::{COUNT_WIDTH, PrimitiveKind};
use std::sync::Arc;

/// In-memory footprint of an out-of-line member: the pointer, size and
/// capacity triple of a runtime string or sequence.
pub const HANDLE_SIZE: usize = 3 * std::mem::size_of::<usize>();

/// Segment inserted between namespace and name in DDS-style type names.
pub const TYPE_NAME_INFIX: &str = "dps_";

/// Element kind of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Fixed-width primitive.
    Primitive(PrimitiveKind),
    /// Byte string; stored without terminator.
    String,
    /// Wide string of 16-bit code units.
    WString,
    /// Nested message.
    Message(Arc<TypeSchema>),
}

impl FieldKind {
    /// Returns a short name for the kind.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Primitive(p) => p.name(),
            Self::String => "string",
            Self::WString => "wstring",
            Self::Message(schema) => schema.name(),
        }
    }

    /// Returns the bytes one element occupies when stored inline.
    #[must_use]
    pub fn inline_size(&self) -> usize {
        match self {
            Self::Primitive(p) => p.size(),
            Self::String | Self::WString => HANDLE_SIZE,
            Self::Message(schema) => schema.size(),
        }
    }

    /// Returns the primitive kind, if this is a primitive.
    #[must_use]
    pub const fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns the nested schema, if this is a message.
    #[must_use]
    pub const fn message(&self) -> Option<&Arc<TypeSchema>> {
        match self {
            Self::Message(schema) => Some(schema),
            _ => None,
        }
    }
}

/// Array shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayShape {
    /// Single element.
    Scalar,
    /// Exactly N elements, stored inline, no count on the wire.
    Fixed(usize),
    /// Up to N elements, stored out of line, count-prefixed on the wire.
    Bounded(usize),
    /// Any number of elements, stored out of line, count-prefixed on the wire.
    Unbounded,
}

impl ArrayShape {
    /// Derives the shape from introspection array flags.
    #[must_use]
    pub const fn from_flags(is_array: bool, array_size: usize, is_upper_bound: bool) -> Self {
        if !is_array {
            Self::Scalar
        } else if is_upper_bound {
            Self::Bounded(array_size)
        } else if array_size == 0 {
            Self::Unbounded
        } else {
            Self::Fixed(array_size)
        }
    }

    /// Returns true for count-prefixed, out-of-line shapes.
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Self::Bounded(_) | Self::Unbounded)
    }

    /// Returns the declared maximum, if any.
    #[must_use]
    pub const fn bound(&self) -> Option<usize> {
        match self {
            Self::Scalar => Some(1),
            Self::Fixed(n) | Self::Bounded(n) => Some(*n),
            Self::Unbounded => None,
        }
    }
}

impl std::fmt::Display for ArrayShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar => f.write_str("scalar"),
            Self::Fixed(n) => write!(f, "[{n}]"),
            Self::Bounded(n) => write!(f, "[<={n}]"),
            Self::Unbounded => f.write_str("[]"),
        }
    }
}

/// One resolved field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Element kind.
    pub kind: FieldKind,
    /// Array shape.
    pub shape: ArrayShape,
    /// Byte offset inside the owning instance.
    pub offset: usize,
    /// Upper bound on string length, for bounded strings.
    pub string_bound: Option<usize>,
}

impl FieldDescriptor {
    /// Creates a field descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind, shape: ArrayShape, offset: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            shape,
            offset,
            string_bound: None,
        }
    }

    /// Sets the string length bound.
    #[must_use]
    pub fn with_string_bound(mut self, bound: usize) -> Self {
        self.string_bound = Some(bound);
        self
    }

    /// Returns the bytes the field occupies inside its owning instance.
    #[must_use]
    pub fn footprint(&self) -> usize {
        match self.shape {
            ArrayShape::Scalar => self.kind.inline_size(),
            ArrayShape::Fixed(n) => self.kind.inline_size().saturating_mul(n),
            ArrayShape::Bounded(_) | ArrayShape::Unbounded => HANDLE_SIZE,
        }
    }

    /// Returns the fewest bytes the field occupies on the wire: a count
    /// prefix per string or sequence, full width for everything inline.
    #[must_use]
    pub fn min_wire_size(&self) -> usize {
        let element = match &self.kind {
            FieldKind::Primitive(p) => p.size(),
            FieldKind::String | FieldKind::WString => COUNT_WIDTH,
            FieldKind::Message(schema) => schema.min_wire_size(),
        };
        match self.shape {
            ArrayShape::Scalar => element,
            ArrayShape::Fixed(n) => element.saturating_mul(n),
            ArrayShape::Bounded(_) | ArrayShape::Unbounded => COUNT_WIDTH,
        }
    }

    /// Returns true if the field's storage lives out of line.
    #[must_use]
    pub fn is_out_of_line(&self) -> bool {
        self.shape.is_sequence() || matches!(self.kind, FieldKind::String | FieldKind::WString)
    }

    /// Describes the field as `kind shape`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.shape {
            ArrayShape::Scalar => self.kind.name().to_string(),
            shape => format!("{}{}", self.kind.name(), shape),
        }
    }
}

/// Immutable description of one message type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    namespace: String,
    name: String,
    identifier: &'static str,
    size: usize,
    fields: Vec<FieldDescriptor>,
    min_wire_size: usize,
}

impl TypeSchema {
    /// Creates a schema from resolved parts.
    ///
    /// # Arguments
    /// * `namespace` - `::`-joined namespace
    /// * `name` - Bare message name
    /// * `identifier` - Typesupport identifier that produced it
    /// * `size` - In-memory instance size
    /// * `fields` - Fields in declaration (wire) order
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        identifier: &'static str,
        size: usize,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        let min_wire_size = fields
            .iter()
            .map(FieldDescriptor::min_wire_size)
            .fold(0, usize::saturating_add);
        Self {
            namespace: namespace.into(),
            name: name.into(),
            identifier,
            size,
            fields,
            min_wire_size,
        }
    }

    /// Returns the `::`-joined namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the bare message name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the typesupport identifier that produced the schema.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        self.identifier
    }

    /// Returns the in-memory instance size.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the fewest bytes any encoding of this type occupies.
    ///
    /// Zero for types with no fields or only empty nested types.
    #[must_use]
    pub const fn min_wire_size(&self) -> usize {
        self.min_wire_size
    }

    /// Returns the fields in wire order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `namespace::Name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }

    /// Returns the DDS-style type name, `namespace::dps_::Name_`.
    #[must_use]
    pub fn type_name(&self) -> String {
        type_name(&self.namespace, &self.name)
    }

    /// Returns the deepest message nesting below this schema (0 for flat).
    #[must_use]
    pub fn nesting_depth(&self) -> usize {
        self.fields
            .iter()
            .filter_map(|f| f.kind.message())
            .map(|nested| 1 + nested.nesting_depth())
            .max()
            .unwrap_or(0)
    }
}

/// Builds a DDS-style type name from a `::`-joined namespace and a name.
#[must_use]
pub fn type_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        format!("{TYPE_NAME_INFIX}::{name}_")
    } else {
        format!("{namespace}::{TYPE_NAME_INFIX}::{name}_")
    }
}
