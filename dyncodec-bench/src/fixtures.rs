//! Message types and populated instances used across the benchmarks.

use dyncodec_schema::{
    INTROSPECTION_C, InstanceError, MembersBuilder, MessageInstance, MessageMembers, SchemaError,
    TypeSchema, TypeSupport, build_schema, type_id,
};
use std::sync::Arc;

/// Three doubles, no out-of-line data.
#[must_use]
pub fn point_members() -> Arc<MessageMembers> {
    MembersBuilder::new("geometry_msgs__msg", "Point")
        .field("x", type_id::DOUBLE)
        .field("y", type_id::DOUBLE)
        .field("z", type_id::DOUBLE)
        .build()
}

/// Header, pose block, bounded readings and a sequence of nested points.
#[must_use]
pub fn telemetry_members() -> Arc<MessageMembers> {
    let time = MembersBuilder::new("builtin_interfaces__msg", "Time")
        .field("sec", type_id::INT32)
        .field("nanosec", type_id::UINT32)
        .build();
    let header = MembersBuilder::new("std_msgs__msg", "Header")
        .message("stamp", &time)
        .field("frame_id", type_id::STRING)
        .build();
    MembersBuilder::new("fleet__msg", "Telemetry")
        .message("header", &header)
        .fixed_array("orientation", type_id::DOUBLE, 4)
        .bounded_sequence("cell_voltages", type_id::FLOAT, 16)
        .message_sequence("waypoints", &point_members())
        .sequence("tags", type_id::STRING)
        .field("armed", type_id::BOOLEAN)
        .build()
}

/// Flat sample buffer, sized by the caller.
#[must_use]
pub fn samples_members() -> Arc<MessageMembers> {
    MembersBuilder::new("sensor_msgs__msg", "Samples")
        .field("channel", type_id::UINT16)
        .sequence("data", type_id::FLOAT)
        .build()
}

/// Resolves `members` through the C introspection flavor.
///
/// # Errors
/// Returns the adapter error if the table is malformed.
pub fn schema_of(members: Arc<MessageMembers>) -> Result<Arc<TypeSchema>, SchemaError> {
    build_schema(&TypeSupport::new(INTROSPECTION_C, members))
}

/// Builds a populated `Point`.
///
/// # Errors
/// Returns an error if `schema` is not a `Point` schema.
pub fn point(schema: &TypeSchema) -> Result<MessageInstance, InstanceError> {
    let mut instance = MessageInstance::new(schema);
    let mut view = instance.view_mut(schema)?;
    view.set("x", 1.5f64)?;
    view.set("y", -2.25f64)?;
    view.set("z", 0.125f64)?;
    Ok(instance)
}

/// Builds a populated `Telemetry` with `waypoints` nested points.
///
/// # Errors
/// Returns an error if `schema` is not a `Telemetry` schema.
pub fn telemetry(schema: &TypeSchema, waypoints: usize) -> Result<MessageInstance, InstanceError> {
    let mut instance = MessageInstance::new(schema);
    let mut view = instance.view_mut(schema)?;
    {
        let mut header = view.message_mut("header")?;
        header.message_mut("stamp")?.set("sec", 1_700_000_000i32)?;
        header.set_string("frame_id", "base_link")?;
    }
    view.set_array("orientation", &[0.0f64, 0.0, 0.7071, 0.7071])?;
    view.set_sequence("cell_voltages", &[3.9f32; 12])?;
    for i in 0..waypoints {
        let mut point = view.push_message("waypoints")?;
        point.set("x", i as f64)?;
        point.set("y", -(i as f64))?;
    }
    view.set_strings("tags", ["survey", "north", "batch-7"])?;
    view.set("armed", true)?;
    Ok(instance)
}

/// Builds a `Samples` instance carrying `len` floats.
///
/// # Errors
/// Returns an error if `schema` is not a `Samples` schema.
pub fn samples(schema: &TypeSchema, len: usize) -> Result<MessageInstance, InstanceError> {
    let mut instance = MessageInstance::new(schema);
    let data: Vec<f32> = (0..len).map(|i| i as f32 * 0.5).collect();
    let mut view = instance.view_mut(schema)?;
    view.set("channel", 3u16)?;
    view.set_sequence("data", &data)?;
    Ok(instance)
}
