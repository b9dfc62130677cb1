//! Introspection adapter: turns a typesupport handle into a [`TypeSchema`].
//!
//! Nested message members are resolved eagerly and recursively. Each distinct
//! nested type is built once per call and shared between the fields that
//! use it. A type that reaches itself again while still being resolved is
//! rejected with [`SchemaError::SchemaCycle`].

use crate::error::SchemaError;
use crate::introspection::{
    Flavor, MessageMember, MessageMembers, NestedMembers, TypeSupport, type_id,
};
use crate::types::{ArrayShape, FieldDescriptor, FieldKind, TypeSchema};
use crate::validation::validate_layout;
use dyncodec_core::config::DEFAULT_MAX_DEPTH;
use dyncodec_core::{CodecConfig, PrimitiveKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds schemas from introspection descriptors.
#[derive(Debug, Clone, Copy)]
pub struct SchemaAdapter {
    max_depth: usize,
}

impl SchemaAdapter {
    /// Creates an adapter with the default nesting ceiling.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates an adapter that uses the nesting ceiling of `config`.
    #[must_use]
    pub const fn from_config(config: &CodecConfig) -> Self {
        Self {
            max_depth: config.depth_limit(),
        }
    }

    /// Sets the nesting ceiling.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builds the schema described by `type_support`.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownTypesupport`] for an unrecognized
    /// identifier, [`SchemaError::SchemaCycle`] for self-referential types,
    /// [`SchemaError::UnsupportedFieldKind`] for kind tags outside the
    /// supported set, and layout errors from validation.
    pub fn build(&self, type_support: &TypeSupport) -> Result<Arc<TypeSchema>, SchemaError> {
        let flavor = type_support.flavor()?;
        let mut resolution = Resolution {
            flavor,
            max_depth: self.max_depth,
            stack: Vec::new(),
            built: HashMap::new(),
        };
        resolution.resolve(type_support.members())
    }
}

impl Default for SchemaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a schema with the default adapter settings.
///
/// # Errors
/// See [`SchemaAdapter::build`].
pub fn build_schema(type_support: &TypeSupport) -> Result<Arc<TypeSchema>, SchemaError> {
    SchemaAdapter::new().build(type_support)
}

/// State of one build: the chain of types being resolved and the types
/// already finished.
struct Resolution {
    flavor: Flavor,
    max_depth: usize,
    stack: Vec<String>,
    /// Finished types with their nesting depth.
    built: HashMap<String, (Arc<TypeSchema>, usize)>,
}

impl Resolution {
    fn resolve(&mut self, members: &MessageMembers) -> Result<Arc<TypeSchema>, SchemaError> {
        if members.message_name.is_empty() {
            return Err(SchemaError::InvalidTypeName {
                name: members.message_name.clone(),
            });
        }

        let namespace = self
            .flavor
            .namespace_segments(&members.message_namespace)
            .join("::");
        let qualified = if namespace.is_empty() {
            members.message_name.clone()
        } else {
            format!("{namespace}::{}", members.message_name)
        };

        if let Some((done, depth)) = self.built.get(&qualified) {
            // Reused deeper than where it was first built.
            if self.stack.len() + depth > self.max_depth {
                return Err(SchemaError::RecursionLimitExceeded {
                    type_name: qualified,
                    limit: self.max_depth,
                });
            }
            return Ok(Arc::clone(done));
        }

        if self.stack.contains(&qualified) {
            let mut path = self.stack.join(" -> ");
            path.push_str(" -> ");
            path.push_str(&qualified);
            return Err(SchemaError::SchemaCycle { path });
        }

        if self.stack.len() > self.max_depth {
            return Err(SchemaError::RecursionLimitExceeded {
                type_name: qualified,
                limit: self.max_depth,
            });
        }

        self.stack.push(qualified.clone());
        let fields = members
            .members
            .iter()
            .map(|member| self.resolve_member(member))
            .collect::<Result<Vec<_>, _>>();
        self.stack.pop();

        let schema = TypeSchema::new(
            namespace,
            members.message_name.clone(),
            self.flavor.identifier(),
            members.size_of,
            fields?,
        );
        validate_layout(&schema)?;

        tracing::trace!(
            "Resolved schema {} ({} fields, {} bytes)",
            qualified,
            schema.fields().len(),
            schema.size()
        );

        let depth = schema.nesting_depth();
        let schema = Arc::new(schema);
        self.built.insert(qualified, (Arc::clone(&schema), depth));
        Ok(schema)
    }

    fn resolve_member(&mut self, member: &MessageMember) -> Result<FieldDescriptor, SchemaError> {
        let kind = match member.type_id {
            type_id::FLOAT => FieldKind::Primitive(PrimitiveKind::Float32),
            type_id::DOUBLE => FieldKind::Primitive(PrimitiveKind::Float64),
            type_id::CHAR => FieldKind::Primitive(PrimitiveKind::Char),
            type_id::BOOLEAN => FieldKind::Primitive(PrimitiveKind::Bool),
            type_id::OCTET => FieldKind::Primitive(PrimitiveKind::Byte),
            type_id::UINT8 => FieldKind::Primitive(PrimitiveKind::Uint8),
            type_id::INT8 => FieldKind::Primitive(PrimitiveKind::Int8),
            type_id::UINT16 => FieldKind::Primitive(PrimitiveKind::Uint16),
            type_id::INT16 => FieldKind::Primitive(PrimitiveKind::Int16),
            type_id::UINT32 => FieldKind::Primitive(PrimitiveKind::Uint32),
            type_id::INT32 => FieldKind::Primitive(PrimitiveKind::Int32),
            type_id::UINT64 => FieldKind::Primitive(PrimitiveKind::Uint64),
            type_id::INT64 => FieldKind::Primitive(PrimitiveKind::Int64),
            type_id::STRING => FieldKind::String,
            type_id::WSTRING => FieldKind::WString,
            type_id::MESSAGE => {
                let nested = member
                    .members
                    .as_ref()
                    .and_then(NestedMembers::resolve)
                    .ok_or_else(|| SchemaError::MissingNestedType {
                        field: member.name.clone(),
                    })?;
                FieldKind::Message(self.resolve(&nested)?)
            }
            other => {
                return Err(SchemaError::UnsupportedFieldKind {
                    field: member.name.clone(),
                    type_id: other,
                });
            }
        };

        let is_string = matches!(kind, FieldKind::String | FieldKind::WString);
        let shape =
            ArrayShape::from_flags(member.is_array, member.array_size, member.is_upper_bound);
        let field = FieldDescriptor::new(member.name.clone(), kind, shape, member.offset);

        Ok(if is_string && member.string_upper_bound > 0 {
            field.with_string_bound(member.string_upper_bound)
        } else {
            field
        })
    }
}
