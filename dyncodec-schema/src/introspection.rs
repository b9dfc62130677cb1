//! Runtime introspection descriptors consumed by the adapter.
//!
//! These types mirror the member tables a ROS-style introspection typesupport
//! exposes at runtime: an ordered list of members, each with a kind tag, array
//! flags, an offset into the owning struct and, for message members, a handle
//! to the nested table. Two flavors exist side by side and differ only in how
//! they spell nested namespaces.

use crate::error::SchemaError;
use std::sync::{Arc, Weak};

/// Identifier of the C introspection flavor.
pub const INTROSPECTION_C: &str = "rosidl_typesupport_introspection_c";

/// Identifier of the C++ introspection flavor.
pub const INTROSPECTION_CPP: &str = "rosidl_typesupport_introspection_cpp";

/// Raw kind tags reported by introspection providers.
pub mod type_id {
    pub const FLOAT: u8 = 1;
    pub const DOUBLE: u8 = 2;
    pub const LONG_DOUBLE: u8 = 3;
    pub const CHAR: u8 = 4;
    pub const WCHAR: u8 = 5;
    pub const BOOLEAN: u8 = 6;
    pub const OCTET: u8 = 7;
    pub const UINT8: u8 = 8;
    pub const INT8: u8 = 9;
    pub const UINT16: u8 = 10;
    pub const INT16: u8 = 11;
    pub const UINT32: u8 = 12;
    pub const INT32: u8 = 13;
    pub const UINT64: u8 = 14;
    pub const INT64: u8 = 15;
    pub const STRING: u8 = 16;
    pub const WSTRING: u8 = 17;
    pub const MESSAGE: u8 = 18;
}

/// Introspection flavor selected by a typesupport identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// C introspection; namespaces are joined with `__`.
    C,
    /// C++ introspection; namespaces are joined with `::`.
    Cpp,
}

impl Flavor {
    /// Resolves a typesupport identifier.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownTypesupport`] for any other identifier.
    pub fn from_identifier(identifier: &str) -> Result<Self, SchemaError> {
        match identifier {
            INTROSPECTION_C => Ok(Self::C),
            INTROSPECTION_CPP => Ok(Self::Cpp),
            other => Err(SchemaError::unknown_typesupport(other)),
        }
    }

    /// Returns the identifier string of this flavor.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        match self {
            Self::C => INTROSPECTION_C,
            Self::Cpp => INTROSPECTION_CPP,
        }
    }

    /// Returns the separator this flavor uses between namespace segments.
    #[must_use]
    pub const fn namespace_separator(&self) -> &'static str {
        match self {
            Self::C => "__",
            Self::Cpp => "::",
        }
    }

    /// Splits a raw namespace into its non-empty segments.
    #[must_use]
    pub fn namespace_segments<'a>(&self, raw: &'a str) -> Vec<&'a str> {
        raw.split(self.namespace_separator())
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}

/// Handle to the member table of a nested message type.
///
/// A weak handle allows descriptor graphs that refer back to an enclosing
/// type; the adapter rejects those with [`SchemaError::SchemaCycle`].
#[derive(Debug, Clone)]
pub enum NestedMembers {
    /// Owning reference.
    Strong(Arc<MessageMembers>),
    /// Non-owning reference.
    Weak(Weak<MessageMembers>),
}

impl NestedMembers {
    /// Returns the referenced table, if it is still alive.
    #[must_use]
    pub fn resolve(&self) -> Option<Arc<MessageMembers>> {
        match self {
            Self::Strong(members) => Some(Arc::clone(members)),
            Self::Weak(members) => members.upgrade(),
        }
    }
}

impl From<Arc<MessageMembers>> for NestedMembers {
    fn from(members: Arc<MessageMembers>) -> Self {
        Self::Strong(members)
    }
}

/// One member entry of an introspection table.
#[derive(Debug, Clone)]
pub struct MessageMember {
    /// Member name.
    pub name: String,
    /// Raw kind tag (see [`type_id`]).
    pub type_id: u8,
    /// Upper bound of a bounded string member, 0 when unbounded.
    pub string_upper_bound: usize,
    /// Nested table for message members.
    pub members: Option<NestedMembers>,
    /// True if the member is an array or sequence.
    pub is_array: bool,
    /// Fixed length or upper bound; 0 for an unbounded sequence.
    pub array_size: usize,
    /// True if `array_size` is an upper bound rather than a fixed length.
    pub is_upper_bound: bool,
    /// Byte offset of the member inside the owning struct.
    pub offset: usize,
}

impl MessageMember {
    /// Creates a scalar member entry.
    #[must_use]
    pub fn new(name: impl Into<String>, type_id: u8, offset: usize) -> Self {
        Self {
            name: name.into(),
            type_id,
            string_upper_bound: 0,
            members: None,
            is_array: false,
            array_size: 0,
            is_upper_bound: false,
            offset,
        }
    }
}

/// Introspection table describing one message type.
#[derive(Debug, Clone)]
pub struct MessageMembers {
    /// Raw namespace, spelled in the provider's convention.
    pub message_namespace: String,
    /// Bare message name.
    pub message_name: String,
    /// In-memory size of one instance.
    pub size_of: usize,
    /// Members in declaration order.
    pub members: Vec<MessageMember>,
}

/// Opaque typesupport handle: an identifier plus the table it describes.
#[derive(Debug, Clone)]
pub struct TypeSupport {
    identifier: String,
    members: Arc<MessageMembers>,
}

impl TypeSupport {
    /// Creates a typesupport handle.
    #[must_use]
    pub fn new(identifier: impl Into<String>, members: Arc<MessageMembers>) -> Self {
        Self {
            identifier: identifier.into(),
            members,
        }
    }

    /// Returns the typesupport identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the top-level member table.
    #[must_use]
    pub fn members(&self) -> &Arc<MessageMembers> {
        &self.members
    }

    /// Returns the flavor named by the identifier.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownTypesupport`] if the identifier is unknown.
    pub fn flavor(&self) -> Result<Flavor, SchemaError> {
        Flavor::from_identifier(&self.identifier)
    }

    /// Returns the DDS-style type name of the top-level message,
    /// `ns::dps_::Name_`, with the namespace normalized to `::`.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownTypesupport`] if the identifier is
    /// unknown, or [`SchemaError::InvalidTypeName`] for an empty name.
    pub fn type_name(&self) -> Result<String, SchemaError> {
        let flavor = self.flavor()?;
        if self.members.message_name.is_empty() {
            return Err(SchemaError::InvalidTypeName {
                name: self.members.message_name.clone(),
            });
        }
        let namespace = flavor
            .namespace_segments(&self.members.message_namespace)
            .join("::");
        Ok(crate::types::type_name(&namespace, &self.members.message_name))
    }
}

/// Picks the handle this codec understands from a set of candidates.
///
/// The C introspection handle wins over the C++ one when both are offered.
///
/// # Errors
/// Returns [`SchemaError::UnknownTypesupport`] if neither flavor is present.
pub fn select_type_support(handles: &[TypeSupport]) -> Result<&TypeSupport, SchemaError> {
    [INTROSPECTION_C, INTROSPECTION_CPP]
        .iter()
        .find_map(|wanted| handles.iter().find(|h| h.identifier() == *wanted))
        .ok_or_else(|| {
            let offered = handles
                .iter()
                .map(TypeSupport::identifier)
                .collect::<Vec<_>>()
                .join(", ");
            SchemaError::unknown_typesupport(offered)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_members(name: &str) -> Arc<MessageMembers> {
        Arc::new(MessageMembers {
            message_namespace: "pkg__msg".to_string(),
            message_name: name.to_string(),
            size_of: 0,
            members: Vec::new(),
        })
    }

    #[test]
    fn test_flavor_from_identifier() {
        assert_eq!(Flavor::from_identifier(INTROSPECTION_C), Ok(Flavor::C));
        assert_eq!(Flavor::from_identifier(INTROSPECTION_CPP), Ok(Flavor::Cpp));
        assert!(matches!(
            Flavor::from_identifier("rmw_other"),
            Err(SchemaError::UnknownTypesupport { .. })
        ));
    }

    #[test]
    fn test_namespace_segments() {
        assert_eq!(
            Flavor::C.namespace_segments("geometry_msgs__msg"),
            vec!["geometry_msgs", "msg"]
        );
        assert_eq!(
            Flavor::Cpp.namespace_segments("geometry_msgs::msg"),
            vec!["geometry_msgs", "msg"]
        );
        assert!(Flavor::Cpp.namespace_segments("").is_empty());
    }

    #[test]
    fn test_nested_weak_resolution() {
        let members = empty_members("Inner");
        let weak = NestedMembers::Weak(Arc::downgrade(&members));
        assert!(weak.resolve().is_some());
        drop(members);
        assert!(weak.resolve().is_none());
    }

    #[test]
    fn test_type_name_per_flavor() {
        let c = TypeSupport::new(INTROSPECTION_C, empty_members("Point"));
        assert_eq!(c.type_name().unwrap(), "pkg::msg::dps_::Point_");

        let cpp_members = Arc::new(MessageMembers {
            message_namespace: "pkg::msg".to_string(),
            ..(*empty_members("Point")).clone()
        });
        let cpp = TypeSupport::new(INTROSPECTION_CPP, cpp_members);
        assert_eq!(cpp.type_name(), c.type_name());

        let unnamed = TypeSupport::new(INTROSPECTION_C, empty_members(""));
        assert!(matches!(
            unnamed.type_name(),
            Err(SchemaError::InvalidTypeName { .. })
        ));
    }

    #[test]
    fn test_select_prefers_c() {
        let members = empty_members("Point");
        let handles = vec![
            TypeSupport::new(INTROSPECTION_CPP, Arc::clone(&members)),
            TypeSupport::new(INTROSPECTION_C, Arc::clone(&members)),
        ];
        let selected = select_type_support(&handles).unwrap();
        assert_eq!(selected.identifier(), INTROSPECTION_C);
    }

    #[test]
    fn test_select_falls_back_to_cpp() {
        let members = empty_members("Point");
        let handles = vec![
            TypeSupport::new("rosidl_typesupport_fastrtps_cpp", Arc::clone(&members)),
            TypeSupport::new(INTROSPECTION_CPP, members),
        ];
        assert_eq!(
            select_type_support(&handles).unwrap().flavor(),
            Ok(Flavor::Cpp)
        );
    }

    #[test]
    fn test_select_rejects_foreign_handles() {
        let handles = vec![TypeSupport::new(
            "rosidl_typesupport_fastrtps_c",
            empty_members("Point"),
        )];
        assert!(matches!(
            select_type_support(&handles),
            Err(SchemaError::UnknownTypesupport { .. })
        ));
    }
}
