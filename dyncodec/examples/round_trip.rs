//! Round-trip example.
//!
//! Describes a telemetry message through introspection tables, fills an
//! instance through typed views, encodes it and decodes it back.
//!
//! Run with: `RUST_LOG=debug cargo run --example round_trip`

use dyncodec::prelude::*;
use std::sync::Arc;

fn header_members() -> Arc<MessageMembers> {
    let time = MembersBuilder::new("builtin_interfaces__msg", "Time")
        .field("sec", type_id::INT32)
        .field("nanosec", type_id::UINT32)
        .build();
    MembersBuilder::new("std_msgs__msg", "Header")
        .message("stamp", &time)
        .field("frame_id", type_id::STRING)
        .build()
}

fn telemetry_members() -> Arc<MessageMembers> {
    let header = header_members();
    MembersBuilder::new("fleet__msg", "Telemetry")
        .message("header", &header)
        .fixed_array("position", type_id::DOUBLE, 3)
        .bounded_sequence("cell_voltages", type_id::FLOAT, 8)
        .sequence("tags", type_id::STRING)
        .bounded_string("status", 16)
        .field("armed", type_id::BOOLEAN)
        .build()
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let type_support = TypeSupport::new(INTROSPECTION_C, telemetry_members());
    let codec = MessageCodec::new(build_schema(&type_support)?);
    let schema = codec.schema();

    println!("[Schema] {} ({} bytes in memory)", codec.type_name(), schema.size());
    for field in schema.fields() {
        println!("[Schema]   {:<14} {}", field.name, field.describe());
    }

    let mut message = codec.new_instance();
    {
        let mut view = message.view_mut(schema)?;
        {
            let mut header = view.message_mut("header")?;
            header.message_mut("stamp")?.set("sec", 1_700_000_000i32)?;
            header.set_string("frame_id", "base_link")?;
        }
        view.set_array("position", &[12.5f64, -3.25, 0.75])?;
        view.set_sequence("cell_voltages", &[3.91f32, 3.88, 3.90, 3.87])?;
        view.set_strings("tags", ["north", "survey"])?;
        view.set_string("status", "cruising")?;
        view.set("armed", true)?;
    }

    let bytes = codec.serialize(&message)?;
    println!("[Encode] {} bytes", bytes.len());
    println!("[Encode] {}", hex(&bytes));

    let decoded = codec.decode(&bytes)?;
    let view = decoded.view(schema)?;
    let header = view.message("header")?;
    println!(
        "[Decode] frame={} sec={} position={:?}",
        String::from_utf8_lossy(header.string("frame_id")?),
        header.message("stamp")?.get::<i32>("sec")?,
        view.array::<f64>("position")?,
    );
    println!(
        "[Decode] voltages={:?} tags={} armed={}",
        view.sequence::<f32>("cell_voltages")?,
        view.len("tags")?,
        view.get::<bool>("armed")?,
    );
    println!("[Decode] equal to original: {}", decoded == message);

    // A truncated frame is rejected instead of read past its end.
    let truncated = &bytes[..bytes.len() - 3];
    match codec.decode(truncated) {
        Ok(_) => println!("[Decode] truncated frame unexpectedly accepted"),
        Err(e) => println!("[Decode] truncated frame rejected: {e}"),
    }

    Ok(())
}
