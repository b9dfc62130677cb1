//! Per-type codec handle.
//!
//! A [`MessageCodec`] binds one immutable [`TypeSchema`] to a
//! [`CodecConfig`] and is the value the registry shares between threads.

use crate::deserializer::Deserializer;
use crate::serializer::Serializer;
use dyncodec_core::{CodecConfig, Result};
use dyncodec_schema::{MessageInstance, TypeSchema};
use std::sync::Arc;

/// Serializer and deserializer for one message type.
#[derive(Debug, Clone)]
pub struct MessageCodec {
    schema: Arc<TypeSchema>,
    config: CodecConfig,
    serializer: Serializer,
    deserializer: Deserializer,
}

impl MessageCodec {
    /// Creates a codec with the default configuration.
    #[must_use]
    pub fn new(schema: Arc<TypeSchema>) -> Self {
        Self::with_config(schema, CodecConfig::default())
    }

    /// Creates a codec with the given configuration.
    #[must_use]
    pub fn with_config(schema: Arc<TypeSchema>, config: CodecConfig) -> Self {
        Self {
            schema,
            config,
            serializer: Serializer::new(config),
            deserializer: Deserializer::new(config),
        }
    }

    /// Returns the schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Returns the DDS-style type name of the schema.
    #[must_use]
    pub fn type_name(&self) -> String {
        self.schema.type_name()
    }

    /// Returns a zero-initialized instance of the schema.
    #[must_use]
    pub fn new_instance(&self) -> MessageInstance {
        MessageInstance::new(&self.schema)
    }

    /// Serializes `instance` into a new buffer.
    ///
    /// # Errors
    /// See [`Serializer::serialize_into`].
    pub fn serialize(&self, instance: &MessageInstance) -> Result<Vec<u8>> {
        self.serializer
            .serialize(&self.schema, instance)
            .inspect_err(|e| {
                tracing::debug!("Serialize {} failed: {}", self.schema.qualified_name(), e)
            })
    }

    /// Appends the encoding of `instance` to `out`, returning the bytes
    /// written. `out` keeps its original contents on failure.
    ///
    /// # Errors
    /// See [`Serializer::serialize_into`].
    pub fn serialize_into(&self, instance: &MessageInstance, out: &mut Vec<u8>) -> Result<usize> {
        self.serializer
            .serialize_into(&self.schema, instance, out)
            .inspect_err(|e| {
                tracing::debug!("Serialize {} failed: {}", self.schema.qualified_name(), e)
            })
    }

    /// Returns the exact encoded length of `instance`.
    ///
    /// # Errors
    /// See [`Serializer::serialized_size`].
    pub fn serialized_size(&self, instance: &MessageInstance) -> Result<usize> {
        self.serializer.serialized_size(&self.schema, instance)
    }

    /// Decodes `bytes` into the zero-initialized `out`, returning the bytes
    /// consumed.
    ///
    /// # Errors
    /// See [`Deserializer::deserialize`].
    pub fn deserialize(&self, bytes: &[u8], out: &mut MessageInstance) -> Result<usize> {
        self.deserializer
            .deserialize(&self.schema, bytes, out)
            .inspect_err(|e| {
                tracing::debug!(
                    "Deserialize {} failed on {} bytes: {}",
                    self.schema.qualified_name(),
                    bytes.len(),
                    e
                )
            })
    }

    /// Decodes `bytes` into a freshly allocated instance.
    ///
    /// # Errors
    /// See [`Deserializer::deserialize`].
    pub fn decode(&self, bytes: &[u8]) -> Result<MessageInstance> {
        let mut out = MessageInstance::try_zeroed(self.schema.size())?;
        self.deserialize(bytes, &mut out)?;
        Ok(out)
    }
}

/// Serializes `instance` with the default configuration.
///
/// # Errors
/// See [`Serializer::serialize_into`].
pub fn serialize(schema: &TypeSchema, instance: &MessageInstance) -> Result<Vec<u8>> {
    Serializer::default().serialize(schema, instance)
}

/// Decodes `bytes` into `out` with the default configuration.
///
/// # Errors
/// See [`Deserializer::deserialize`].
pub fn deserialize(schema: &TypeSchema, bytes: &[u8], out: &mut MessageInstance) -> Result<usize> {
    Deserializer::default().deserialize(schema, bytes, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dyncodec_core::Error;
    use dyncodec_schema::introspection::{INTROSPECTION_C, INTROSPECTION_CPP, TypeSupport, type_id};
    use dyncodec_schema::{MembersBuilder, build_schema};
    use proptest::prelude::*;

    fn codec(members: Arc<dyncodec_schema::MessageMembers>) -> MessageCodec {
        MessageCodec::new(build_schema(&TypeSupport::new(INTROSPECTION_CPP, members)).unwrap())
    }

    fn scenario_a() -> MessageCodec {
        codec(
            MembersBuilder::new("pkg::msg", "Sample")
                .field("x", type_id::INT32)
                .field("s", type_id::STRING)
                .fixed_array("a", type_id::UINT8, 3)
                .build(),
        )
    }

    #[test]
    fn test_scenario_a_bytes_and_round_trip() {
        let codec = scenario_a();
        let mut instance = codec.new_instance();
        {
            let mut view = instance.view_mut(codec.schema()).unwrap();
            view.set("x", 42i32).unwrap();
            view.set_string("s", "hi").unwrap();
            view.set_array("a", &[1u8, 2, 3]).unwrap();
        }

        let bytes = codec.serialize(&instance).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&42i32.to_ne_bytes());
        expected.extend_from_slice(&2u32.to_ne_bytes());
        expected.extend_from_slice(b"hi");
        expected.extend_from_slice(&[1, 2, 3]);
        assert_eq!(bytes, expected);

        if cfg!(target_endian = "little") {
            assert_eq!(
                bytes,
                [0x2A, 0, 0, 0, 0x02, 0, 0, 0, 0x68, 0x69, 0x01, 0x02, 0x03]
            );
        }

        assert_eq!(codec.decode(&bytes).unwrap(), instance);
    }

    #[test]
    fn test_scenario_b_nested() {
        let inner = MembersBuilder::new("pkg::msg", "Inner")
            .field("v", type_id::INT32)
            .build();
        let codec = codec(
            MembersBuilder::new("pkg::msg", "Outer")
                .message("inner", &inner)
                .build(),
        );

        let mut instance = codec.new_instance();
        instance
            .view_mut(codec.schema())
            .unwrap()
            .message_mut("inner")
            .unwrap()
            .set("v", 7i32)
            .unwrap();

        let bytes = codec.serialize(&instance).unwrap();
        assert_eq!(bytes, 7i32.to_ne_bytes());

        let decoded = codec.decode(&bytes).unwrap();
        let view = decoded.view(codec.schema()).unwrap();
        assert_eq!(view.message("inner").unwrap().get::<i32>("v").unwrap(), 7);
    }

    #[test]
    fn test_scenario_c_empty_sequence() {
        let codec = codec(
            MembersBuilder::new("pkg::msg", "Ints")
                .sequence("v", type_id::INT32)
                .build(),
        );
        let instance = codec.new_instance();
        let bytes = codec.serialize(&instance).unwrap();
        assert_eq!(bytes, 0u32.to_ne_bytes());

        let decoded = codec.decode(&bytes).unwrap();
        let view = decoded.view(codec.schema()).unwrap();
        assert!(view.sequence::<i32>("v").unwrap().is_empty());
    }

    #[test]
    fn test_serialize_into_reuses_buffer() {
        let codec = scenario_a();
        let instance = codec.new_instance();
        let mut out = Vec::with_capacity(64);
        for _ in 0..3 {
            out.clear();
            let written = codec.serialize_into(&instance, &mut out).unwrap();
            assert_eq!(written, codec.serialized_size(&instance).unwrap());
        }
        assert_eq!(out.len(), 11);
    }

    #[test]
    fn test_free_functions() {
        let codec = scenario_a();
        let instance = codec.new_instance();
        let bytes = serialize(codec.schema(), &instance).unwrap();
        let mut out = codec.new_instance();
        assert_eq!(deserialize(codec.schema(), &bytes, &mut out), Ok(bytes.len()));
        assert_eq!(out, instance);
    }

    #[test]
    fn test_config_is_applied() {
        let schema = build_schema(&TypeSupport::new(
            INTROSPECTION_C,
            MembersBuilder::new("pkg__msg", "Ints")
                .sequence("v", type_id::INT32)
                .build(),
        ))
        .unwrap();
        let codec = MessageCodec::with_config(schema, CodecConfig::new().max_sequence_len(1));
        assert_eq!(codec.config().sequence_limit(), 1);
        assert_eq!(codec.type_name(), "pkg::msg::dps_::Ints_");

        let mut bytes = 2u32.to_ne_bytes().to_vec();
        bytes.extend_from_slice(&[0; 8]);
        assert!(matches!(
            codec.decode(&bytes),
            Err(Error::ArrayBoundExceeded { count: 2, max: 1, .. })
        ));
    }

    fn kitchen_sink() -> MessageCodec {
        let point = MembersBuilder::new("pkg::msg", "Point")
            .field("x", type_id::DOUBLE)
            .field("y", type_id::FLOAT)
            .build();
        codec(
            MembersBuilder::new("pkg::msg", "Everything")
                .field("flag", type_id::BOOLEAN)
                .field("b", type_id::INT8)
                .field("h", type_id::UINT16)
                .field("n", type_id::INT64)
                .field("name", type_id::STRING)
                .field("wide", type_id::WSTRING)
                .fixed_array("rgb", type_id::UINT8, 3)
                .bounded_sequence("ids", type_id::UINT32, 8)
                .sequence("samples", type_id::DOUBLE)
                .sequence("labels", type_id::STRING)
                .message("origin", &point)
                .message_array("corners", &point, 2)
                .message_sequence("path", &point)
                .build(),
        )
    }

    prop_compose! {
        fn point()(
            x in any::<f64>().prop_filter("not NaN", |v| !v.is_nan()),
            y in -1e6f32..1e6,
        ) -> (f64, f32) {
            (x, y)
        }
    }

    proptest! {
        #[test]
        fn test_round_trip(
            flag in any::<bool>(),
            b in any::<i8>(),
            h in any::<u16>(),
            n in any::<i64>(),
            name in proptest::collection::vec(any::<u8>(), 0..32),
            wide in proptest::collection::vec(any::<u16>(), 0..16),
            rgb in any::<[u8; 3]>(),
            ids in proptest::collection::vec(any::<u32>(), 0..=8),
            samples in proptest::collection::vec(-1e9f64..1e9, 0..16),
            labels in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..8), 0..4),
            origin in point(),
            corners in proptest::collection::vec(point(), 2),
            path in proptest::collection::vec(point(), 0..4),
        ) {
            let codec = kitchen_sink();
            let mut instance = codec.new_instance();
            {
                let mut view = instance.view_mut(codec.schema()).unwrap();
                view.set("flag", flag).unwrap();
                view.set("b", b).unwrap();
                view.set("h", h).unwrap();
                view.set("n", n).unwrap();
                view.set_string("name", &name).unwrap();
                view.set_wstring("wide", &wide).unwrap();
                view.set_array("rgb", &rgb).unwrap();
                view.set_sequence("ids", &ids).unwrap();
                view.set_sequence("samples", &samples).unwrap();
                view.set_strings("labels", &labels).unwrap();

                let mut o = view.message_mut("origin").unwrap();
                o.set("x", origin.0).unwrap();
                o.set("y", origin.1).unwrap();
                for (i, (x, y)) in corners.iter().enumerate() {
                    let mut c = view.message_at_mut("corners", i).unwrap();
                    c.set("x", *x).unwrap();
                    c.set("y", *y).unwrap();
                }
                for (x, y) in &path {
                    let mut p = view.push_message("path").unwrap();
                    p.set("x", *x).unwrap();
                    p.set("y", *y).unwrap();
                }
            }

            let bytes = codec.serialize(&instance).unwrap();
            prop_assert_eq!(bytes.len(), codec.serialized_size(&instance).unwrap());

            let decoded = codec.decode(&bytes).unwrap();
            prop_assert_eq!(&decoded, &instance);

            let view = decoded.view(codec.schema()).unwrap();
            prop_assert_eq!(view.get::<i64>("n").unwrap(), n);
            prop_assert_eq!(view.string("name").unwrap(), name.as_slice());
            prop_assert_eq!(view.sequence::<u32>("ids").unwrap(), ids);
            prop_assert_eq!(view.messages("path").unwrap().len(), path.len());
        }

        #[test]
        fn test_truncated_input_always_fails(
            name in proptest::collection::vec(any::<u8>(), 0..16),
            ids in proptest::collection::vec(any::<u32>(), 0..=8),
            cut in any::<proptest::sample::Index>(),
        ) {
            let codec = kitchen_sink();
            let mut instance = codec.new_instance();
            {
                let mut view = instance.view_mut(codec.schema()).unwrap();
                view.set_string("name", &name).unwrap();
                view.set_sequence("ids", &ids).unwrap();
            }
            let bytes = codec.serialize(&instance).unwrap();
            let k = cut.index(bytes.len());

            let result = codec.decode(&bytes[..k]);
            prop_assert!(
                matches!(result, Err(Error::TruncatedInput { .. })),
                "prefix of {} bytes gave {:?}",
                k,
                result
            );
        }

        #[test]
        fn test_arbitrary_input_never_panics(
            bytes in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let codec = kitchen_sink();
            let _ = codec.decode(&bytes);
        }
    }
}
