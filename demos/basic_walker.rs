//! # Example: basic_walker
//!
//! Minimal setup: a logging destination, one run, a few events.
//!
//! Shows how to:
//! - Start the bus with [`Walker::go`].
//! - Set user identifiers through the `walker user` command.
//! - See malformed events being dropped silently.
//!
//! ## Flow
//! ```text
//! Walker::go(GoConfig::with_destination(LogDestination))
//!     ├─► add_destination
//!     └─► run() ─► attach layer ─► handlers
//! push("walker user", {id})     ─► User::merge
//! push("page view", {..}, load) ─► stamp ─► LogDestination::push
//! push("badinput")              ─► dropped
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=walkerbus=trace cargo run --example basic_walker --features logging
//! ```

use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::EnvFilter;
use walkerbus::{Config, GoConfig, LogDestination, Walker};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let walker = Walker::builder(Config::default())
        .with_globals(|| {
            json!({"pagegroup": "docs", "lang": "en"})
                .as_object()
                .cloned()
                .unwrap_or_default()
        })
        .build();

    walker.go(GoConfig::with_destination(Arc::new(LogDestination::new())));

    walker.push("walker user", json!({"id": "user-42"}).as_object().cloned(), None, None);
    walker.push(
        "page view",
        json!({"title": "Getting started"}).as_object().cloned(),
        Some("load"),
        None,
    );
    walker.push(
        "product add",
        json!({"sku": "A-1", "price": 9.5}).as_object().cloned(),
        Some("click"),
        None,
    );
    walker.push("badinput", None, None, None);

    println!("dispatched {} events in group {}", walker.count(), walker.group());
}
