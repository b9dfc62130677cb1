//! # dyncodec Codec
//!
//! Serializer and deserializer driven by a runtime [`TypeSchema`].
//!
//! The wire format has no envelope: fields follow each other in declaration
//! order, in native byte order, without padding. Strings and sequences carry
//! a 4-byte element count; fixed arrays and scalars do not.
//!
//! # Example
//! ```
//! use dyncodec_codec::MessageCodec;
//! use dyncodec_schema::{INTROSPECTION_CPP, MembersBuilder, TypeSupport, build_schema, type_id};
//!
//! let members = MembersBuilder::new("std_msgs::msg", "String")
//!     .field("data", type_id::STRING)
//!     .build();
//! let schema = build_schema(&TypeSupport::new(INTROSPECTION_CPP, members)).unwrap();
//! let codec = MessageCodec::new(schema);
//!
//! let mut message = codec.new_instance();
//! message.view_mut(codec.schema()).unwrap().set_string("data", "hello").unwrap();
//!
//! let bytes = codec.serialize(&message).unwrap();
//! assert_eq!(bytes.len(), 4 + 5);
//! assert_eq!(codec.decode(&bytes).unwrap(), message);
//! ```
//!
//! [`TypeSchema`]: dyncodec_schema::TypeSchema

pub mod codec;
pub mod deserializer;
pub mod serializer;

pub use codec::{MessageCodec, deserialize, serialize};
pub use deserializer::Deserializer;
pub use serializer::{Serializer, SizeCounter, Sink};
