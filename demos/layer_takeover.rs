//! # Example: layer_takeover
//!
//! Producers append to a [`Layer`] before the bus exists; the walker attaches
//! on `run` and from then on every append is dispatched.
//!
//! Shows how to:
//! - Hand a pre-existing layer to the builder.
//! - Opt into replaying entries appended before attachment.
//! - Register a destination by name through the `walker destination` command.
//!
//! ## Run
//! ```bash
//! RUST_LOG=walkerbus=debug cargo run --example layer_takeover
//! ```

use serde_json::json;
use tracing_subscriber::EnvFilter;
use walkerbus::{Config, DestinationFn, Layer, LayerEntry, Walker};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // A script wrote to the layer before the bus was loaded.
    let layer = Layer::new();
    layer.push(LayerEntry::new("walker destination").with_data(
        json!({"name": "console", "config": {"channel": "stdout"}})
            .as_object()
            .cloned()
            .unwrap_or_default(),
    ));
    layer.push(LayerEntry::new("page view").with_trigger("load"));

    let console = DestinationFn::arc("console", |ev| {
        println!(
            "[console] #{} {} {} trigger={:?} id={}",
            ev.count, ev.entity, ev.action, ev.trigger, ev.id
        );
        Ok(())
    });

    let cfg = Config {
        layer_capacity: 100,
        replay_predefined: true,
    };
    let walker = Walker::builder(cfg)
        .with_layer(layer.clone())
        .with_named_destination("console", console)
        .build();

    walker.push("walker run", None, None, None);

    layer.push(
        LayerEntry::new("cart add")
            .with_data(json!({"sku": "B-7"}).as_object().cloned().unwrap_or_default())
            .with_trigger("click"),
    );

    println!(
        "layer holds {} entries, walker dispatched {} events",
        layer.len(),
        walker.count()
    );
}
