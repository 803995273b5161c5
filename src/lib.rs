//! # walkerbus
//!
//! **walkerbus** is an in-process event bus for `"entity action"` events.
//!
//! Callers push semantically typed events with payload data; the bus
//! normalizes each one into a canonical [`EventRecord`] and fans it out to a
//! dynamically registered, ordered set of [`Destination`]s. Every destination
//! gets its own copy of the record and its failures (errors or panics) are
//! contained to itself.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producers            Layer (external queue)        handlers (per run)
//!      │                        │ interceptor                 │
//!      ▼                        ▼                             ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Walker::push(event, data, trigger, nested)                       │
//! │   - EventName::parse  ("entity action", else dropped)             │
//! │   - "walker <action>" ──► Command (destination / run / user)      │
//! │   - RunState (count, group, globals)  User (id, device, hash)     │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼ EventRecord (stamped once)
//!                       ┌────────────────────────┐
//!                       │   Registry::dispatch   │
//!                       └───┬────────┬───────┬───┘
//!                           ▼        ▼       ▼      (owned clone each)
//!                         dest1    dest2   destN
//!                        init?→push init?→push ...  (Err/panic contained)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Walker::builder(cfg).build() ──► group = IdGenerator::generate()
//!
//! go(GoConfig)
//!   ├─ project_id  ─► ProjectLoader::load(id, &walker)
//!   └─ otherwise   ─► add_destination(dest) ─► run()
//!
//! run()  (re-entrant, full reset)
//!   ├─► count = 0, new group, globals snapshot, timing origin
//!   ├─► attach Layer (replace interceptor)
//!   └─► HandlerRegistrar::register(&walker)
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                        |
//! |-------------------|-----------------------------------------------------------|-------------------------------------------|
//! | **Dispatch**      | Normalize, stamp and fan out events.                      | [`Walker`], [`EventRecord`]               |
//! | **Destinations**  | Pluggable sinks with lazy, retried initialization.        | [`Destination`], [`DestinationFn`]        |
//! | **Commands**      | Reserved `walker` namespace reconfiguring the bus.        | [`Command`]                               |
//! | **Layer**         | Bridge for a queue producers wrote to before attachment.  | [`Layer`], [`LayerEntry`]                 |
//! | **Collaborators** | Clock, ids, globals, handlers, project loading.           | [`Clock`], [`IdGenerator`], ...           |
//! | **Errors**        | Typed destination errors, never surfaced to producers.    | [`DestinationError`]                      |
//! | **Configuration** | Bus-wide and entry-point settings.                        | [`Config`], [`GoConfig`]                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogDestination`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use serde_json::json;
//! use walkerbus::{Config, DestinationFn, EventRecord, GoConfig, Walker};
//!
//! let seen: Arc<Mutex<Vec<EventRecord>>> = Arc::default();
//! let sink = Arc::clone(&seen);
//! let dest = DestinationFn::arc("memory", move |ev| {
//!     sink.lock().unwrap().push(ev);
//!     Ok(())
//! });
//!
//! let walker = Walker::new(Config::default());
//! walker.go(GoConfig::with_destination(dest));
//!
//! walker.push("walker user", json!({"id": "u1"}).as_object().cloned(), None, None);
//! walker.push("product view", json!({"sku": "A"}).as_object().cloned(), Some("load"), None);
//! walker.push("badinput", None, None, None);
//!
//! let seen = seen.lock().unwrap();
//! assert_eq!(seen.len(), 1);
//! assert_eq!(seen[0].entity, "product");
//! assert_eq!(seen[0].count, 1);
//! assert_eq!(seen[0].user.id.as_deref(), Some("u1"));
//! ```
mod core;
mod destinations;
mod error;
mod events;
mod layer;
mod providers;

// ---- Public re-exports ----

pub use core::{COMMAND_ENTITY, Command, Config, GoConfig, Walker, WalkerBuilder};
pub use destinations::{
    Destination, DestinationConfig, DestinationFn, DestinationRef, InitStatus, Registry,
};
pub use error::DestinationError;
pub use events::{Data, EventName, EventRecord, Nested, User, coarse_timing};
pub use layer::{Layer, LayerEntry};
pub use providers::{
    Clock, GlobalsProvider, HandlerRegistrar, IdGenerator, ProjectLoader, RandomId,
    StaticGlobals, SystemClock,
};

// Optional: expose a simple built-in logging destination (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use destinations::LogDestination;
