//! # dyncodec Schema
//!
//! Runtime type descriptions for the dyncodec message codec.
//!
//! This crate provides:
//! - Introspection descriptors as exposed by C and C++ typesupport handles
//! - The adapter that resolves a descriptor into an immutable [`TypeSchema`]
//! - Layout validation of field offsets against the instance size
//! - [`MessageInstance`] storage with typed views for building and reading
//!   messages without generated code

pub mod adapter;
pub mod builder;
pub mod error;
pub mod instance;
pub mod introspection;
pub mod types;
pub mod validation;
pub mod view;

pub use adapter::{SchemaAdapter, build_schema};
pub use builder::MembersBuilder;
pub use error::{InstanceError, SchemaError};
pub use instance::{MessageInstance, Slot};
pub use introspection::{
    Flavor, INTROSPECTION_C, INTROSPECTION_CPP, MessageMember, MessageMembers, NestedMembers,
    TypeSupport, select_type_support, type_id,
};
pub use types::{ArrayShape, FieldDescriptor, FieldKind, HANDLE_SIZE, TypeSchema, type_name};
pub use validation::validate_layout;
pub use view::{InstanceView, InstanceViewMut};
