//! # Example: async_init
//!
//! A destination whose initialization completes asynchronously (e.g. a
//! remote script being loaded). Events pushed while it is pending are not
//! delivered to it; once the future resolves, later events are.
//!
//! A handler registrar spawns a Tokio task that produces events, the way a
//! UI or network event source would.
//!
//! ## Run
//! ```bash
//! RUST_LOG=walkerbus=trace cargo run --example async_init
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing_subscriber::EnvFilter;
use walkerbus::{Config, DestinationFn, InitStatus, Walker};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let remote = DestinationFn::new("remote", |ev| {
        println!("[remote] {} {} count={}", ev.entity, ev.action, ev.count);
        Ok(())
    })
    .with_init(|| {
        let loading = async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            true
        };
        Ok(InitStatus::Pending(loading.boxed()))
    });

    let walker = Walker::builder(Config::default())
        .with_handlers(|w: &Walker| {
            let w = w.clone();
            tokio::spawn(async move {
                for i in 0..6 {
                    let trigger = format!("tick-{i}");
                    w.push("timer tick", None, Some(&trigger), None);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            });
        })
        .build();

    walker.add_destination(Arc::new(remote), None);
    walker.run();

    tokio::time::sleep(Duration::from_millis(400)).await;
    println!(
        "dispatched {} events; remote initialized: {:?}",
        walker.count(),
        walker.destinations().is_initialized(0)
    );
}
