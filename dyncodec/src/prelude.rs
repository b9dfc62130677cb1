//! Prelude module for convenient imports.
//!
//! ```
//! use dyncodec::prelude::*;
//! ```

// Core types
pub use dyncodec_core::error::{Error as CodecError, Result as CodecResult};
pub use dyncodec_core::{CodecConfig, PrimitiveKind, Scalar};

// Schema types
pub use dyncodec_schema::{
    ArrayShape, FieldDescriptor, FieldKind, INTROSPECTION_C, INTROSPECTION_CPP, InstanceError,
    InstanceView, InstanceViewMut, MembersBuilder, MessageInstance, MessageMember, MessageMembers,
    SchemaAdapter, SchemaError, TypeSchema, TypeSupport, build_schema, select_type_support,
    type_id,
};

// Codec types
pub use dyncodec_codec::{Deserializer, MessageCodec, Serializer};

// Registry types
pub use dyncodec_registry::{RegistryStats, TypeKey, TypeRegistry};
