//! # dyncodec
//!
//! Schema-driven binary message codec for pub/sub middleware that only knows
//! message types at runtime.
//!
//! A typesupport handle exposes an introspection table for one message type.
//! dyncodec turns that table into an immutable schema once, caches it in a
//! registry, and uses it to serialize and deserialize message instances.
//!
//! ## Features
//!
//! - **Two introspection flavors** - C and C++ typesupport identifiers, with
//!   their namespace conventions normalized
//! - **Compact wire format** - native byte order, no padding, count-prefixed
//!   strings and sequences
//! - **Hardened decoding** - every read is bounds-checked and every wire count
//!   is validated before it sizes an allocation
//! - **Shared codecs** - a registry builds each type exactly once, even under
//!   concurrent first use
//!
//! ## Quick Start
//!
//! ```
//! use dyncodec::prelude::*;
//!
//! let members = MembersBuilder::new("geometry_msgs__msg", "Point")
//!     .field("x", type_id::DOUBLE)
//!     .field("y", type_id::DOUBLE)
//!     .field("z", type_id::DOUBLE)
//!     .build();
//! let type_support = TypeSupport::new(INTROSPECTION_C, members);
//!
//! let registry = TypeRegistry::new();
//! let codec = registry.get_or_create(&type_support).unwrap();
//!
//! let mut point = codec.new_instance();
//! point.view_mut(codec.schema()).unwrap().set("y", 2.5f64).unwrap();
//!
//! let bytes = codec.serialize(&point).unwrap();
//! assert_eq!(bytes.len(), 24);
//! assert_eq!(codec.decode(&bytes).unwrap(), point);
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Errors, primitive kinds, buffers and configuration
//! - [`schema`] - Introspection model, adapter, schemas and instances
//! - [`codec`] - Serializer, deserializer and per-type codec
//! - [`registry`] - Thread-safe codec registry

pub mod prelude;

/// Errors, primitive kinds, buffers and configuration.
pub mod core {
    pub use dyncodec_core::*;
}

/// Introspection model, adapter, schemas and instances.
pub mod schema {
    pub use dyncodec_schema::*;
}

/// Serializer, deserializer and per-type codec.
pub mod codec {
    pub use dyncodec_codec::*;
}

/// Thread-safe codec registry.
pub mod registry {
    pub use dyncodec_registry::*;
}

// Re-export commonly used items at the crate root
pub use dyncodec_codec::{MessageCodec, deserialize, serialize};
pub use dyncodec_core::{CodecConfig, Error, Result};
pub use dyncodec_registry::TypeRegistry;
pub use dyncodec_schema::{MessageInstance, SchemaError, TypeSchema, TypeSupport};
