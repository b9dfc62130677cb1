//! Error types for schema construction and instance access.

use thiserror::Error;

/// Error raised while turning an introspection descriptor into a schema.
///
/// These failures are terminal for the type: nothing partially built is
/// ever published.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The typesupport identifier names no known introspection flavor.
    #[error("unknown typesupport identifier '{identifier}'")]
    UnknownTypesupport {
        /// Offending identifier.
        identifier: String,
    },

    /// A message type contains itself, directly or through other types.
    #[error("schema cycle detected: {path}")]
    SchemaCycle {
        /// Chain of type names forming the cycle.
        path: String,
    },

    /// A member reports a kind tag the codec does not handle.
    #[error("unsupported field kind {type_id} for field '{field}'")]
    UnsupportedFieldKind {
        /// Field name.
        field: String,
        /// Raw kind tag reported by the provider.
        type_id: u8,
    },

    /// Nested message types go deeper than the configured ceiling.
    #[error("recursion limit exceeded while resolving '{type_name}': limit {limit}")]
    RecursionLimitExceeded {
        /// Type being resolved when the limit was hit.
        type_name: String,
        /// Configured ceiling.
        limit: usize,
    },

    /// A message member has no resolvable nested descriptor.
    #[error("field '{field}' is a message but its nested type could not be resolved")]
    MissingNestedType {
        /// Field name.
        field: String,
    },

    /// A member's in-memory footprint does not fit the declared size.
    #[error(
        "field '{field}' at offset {offset} needs {footprint} bytes, but '{type_name}' is {size} bytes"
    )]
    FieldOutOfBounds {
        /// Owning type.
        type_name: String,
        /// Field name.
        field: String,
        /// Field offset.
        offset: usize,
        /// Bytes the field occupies.
        footprint: usize,
        /// Declared instance size.
        size: usize,
    },

    /// A member starts inside the storage of the member before it.
    #[error("invalid offset: field '{field}' at offset {offset} overlaps the previous field")]
    InvalidOffset {
        /// Field name.
        field: String,
        /// Offending offset.
        offset: usize,
    },

    /// The descriptor carries an empty or malformed type name.
    #[error("invalid type name '{name}'")]
    InvalidTypeName {
        /// Offending name.
        name: String,
    },
}

impl SchemaError {
    /// Creates an unknown typesupport error.
    pub fn unknown_typesupport(identifier: impl Into<String>) -> Self {
        Self::UnknownTypesupport {
            identifier: identifier.into(),
        }
    }
}

/// Error raised by typed accessors on a message instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// No field with this name exists in the schema.
    #[error("field '{name}' not found")]
    FieldNotFound {
        /// Field name.
        name: String,
    },

    /// The accessor does not match the field's kind or shape.
    #[error("field '{field}' is {actual}, accessor expects {expected}")]
    KindMismatch {
        /// Field name.
        field: String,
        /// What the accessor expected.
        expected: String,
        /// What the schema declares.
        actual: String,
    },

    /// An index or length is outside the field's declared bounds.
    #[error("index {index} out of bounds for field '{field}' of length {length}")]
    IndexOutOfBounds {
        /// Field name.
        field: String,
        /// Offending index or length.
        index: usize,
        /// Permitted length.
        length: usize,
    },

    /// The instance block does not have the size its schema declares.
    #[error("instance of '{type_name}' is {actual} bytes, schema declares {expected}")]
    SizeMismatch {
        /// Schema type.
        type_name: String,
        /// Size declared by the schema.
        expected: usize,
        /// Size of the instance block.
        actual: usize,
    },

    /// A field's bytes do not lie inside the instance block.
    #[error("field '{field}' at offset {offset} needs {len} bytes, block is {size} bytes")]
    OutsideBlock {
        /// Field name.
        field: String,
        /// Absolute offset of the field.
        offset: usize,
        /// Bytes the access needs.
        len: usize,
        /// Size of the instance block.
        size: usize,
    },
}

impl InstanceError {
    pub(crate) fn not_found(name: &str) -> Self {
        Self::FieldNotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn mismatch(
        field: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::KindMismatch {
            field: field.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_typesupport_display() {
        let err = SchemaError::unknown_typesupport("rosidl_typesupport_fastrtps_c");
        assert!(err.to_string().contains("rosidl_typesupport_fastrtps_c"));
    }

    #[test]
    fn test_field_out_of_bounds_display() {
        let err = SchemaError::FieldOutOfBounds {
            type_name: "pkg::msg::Point".to_string(),
            field: "z".to_string(),
            offset: 16,
            footprint: 8,
            size: 16,
        };
        let msg = err.to_string();
        assert!(msg.contains("'z'"));
        assert!(msg.contains("offset 16"));
    }

    #[test]
    fn test_instance_error_helpers() {
        assert_eq!(
            InstanceError::not_found("x"),
            InstanceError::FieldNotFound {
                name: "x".to_string()
            }
        );
        let err = InstanceError::mismatch("x", "string", "int32");
        assert!(err.to_string().contains("accessor expects string"));
    }
}
