//! Publish/subscribe example.
//!
//! A publisher and several subscribers share one [`TypeRegistry`]. Each side
//! resolves the codec for the type on first use; the registry builds it once
//! and hands every thread the same instance. Frames travel over a channel as
//! plain byte buffers.
//!
//! Run with: `RUST_LOG=dyncodec_registry=debug cargo run --example pubsub`

use dyncodec::prelude::*;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

const SUBSCRIBERS: usize = 3;
const MESSAGES: u32 = 5;

fn type_supports() -> Vec<TypeSupport> {
    let reading = MembersBuilder::new("sensor_msgs::msg", "Temperature")
        .field("sequence", type_id::UINT32)
        .field("temperature", type_id::DOUBLE)
        .field("variance", type_id::DOUBLE)
        .field("frame_id", type_id::STRING)
        .build();
    // Middlewares usually offer several handles; only introspection ones are usable.
    vec![
        TypeSupport::new("rosidl_typesupport_fastrtps_cpp", Arc::clone(&reading)),
        TypeSupport::new(INTROSPECTION_CPP, reading),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = Arc::new(TypeRegistry::new());
    let handles = type_supports();
    let type_support = select_type_support(&handles)?.clone();

    let mut senders = Vec::with_capacity(SUBSCRIBERS);
    let mut workers = Vec::with_capacity(SUBSCRIBERS);
    for id in 0..SUBSCRIBERS {
        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        senders.push(tx);
        let registry = Arc::clone(&registry);
        let type_support = type_support.clone();
        workers.push(thread::spawn(move || -> Result<u32, String> {
            let codec = registry
                .get_or_create(&type_support)
                .map_err(|e| e.to_string())?;
            let mut message = codec.new_instance();
            let mut received = 0;
            for frame in rx {
                codec
                    .deserialize(&frame, &mut message)
                    .map_err(|e| e.to_string())?;
                let view = message.view(codec.schema()).map_err(|e| e.to_string())?;
                let sequence = view.get::<u32>("sequence").map_err(|e| e.to_string())?;
                let celsius = view.get::<f64>("temperature").map_err(|e| e.to_string())?;
                println!("[Subscriber {id}] #{sequence} {celsius:.2} C");
                received += 1;
            }
            Ok(received)
        }));
    }

    let codec = registry.get_or_create(&type_support)?;
    println!("[Publisher] type {}", codec.type_name());

    let mut message = codec.new_instance();
    let mut frame = Vec::with_capacity(codec.config().capacity_hint());
    for sequence in 0..MESSAGES {
        {
            let mut view = message.view_mut(codec.schema())?;
            view.set("sequence", sequence)?;
            view.set("temperature", 21.5 + f64::from(sequence) * 0.25)?;
            view.set("variance", 0.01f64)?;
            view.set_string("frame_id", "rover")?;
        }
        frame.clear();
        let written = codec.serialize_into(&message, &mut frame)?;
        println!("[Publisher] #{sequence} {written} bytes");
        for tx in &senders {
            tx.send(frame.clone())?;
        }
    }
    drop(senders);

    for (id, worker) in workers.into_iter().enumerate() {
        match worker.join() {
            Ok(Ok(count)) => println!("[Subscriber {id}] received {count} messages"),
            Ok(Err(e)) => println!("[Subscriber {id}] failed: {e}"),
            Err(_) => println!("[Subscriber {id}] panicked"),
        }
    }

    let stats = registry.stats();
    println!(
        "[Registry] {} type(s), {} construction(s), {} hit(s)",
        registry.len(),
        stats.constructions,
        stats.hits
    );

    Ok(())
}
