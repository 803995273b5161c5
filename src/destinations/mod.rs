//! # Event destinations for the walker bus.
//!
//! This module provides the [`Destination`] trait, the ordered [`Registry`]
//! that fans records out to destinations, and built-in implementations.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Walker::push ── stamp(EventRecord) ──► Registry::dispatch
//!                                              │
//!                                              ├──► Destination::init (lazy, retried)
//!                                              │
//!                                              └──► Destination::push(owned copy)
//!                                                        │
//!                                                   ┌────┴────┬─────────┬───────┐
//!                                                   ▼         ▼         ▼       ▼
//!                                          LogDestination   Tag mgr   Custom   ...
//! ```
//!
//! ## Implementing custom destinations
//! ```no_run
//! use walkerbus::{Destination, DestinationError, EventRecord};
//!
//! struct OrderCounter;
//!
//! impl Destination for OrderCounter {
//!     fn push(&self, event: EventRecord) -> Result<(), DestinationError> {
//!         if event.entity == "order" && event.action == "complete" {
//!             // increment counter
//!         }
//!         Ok(())
//!     }
//! }
//! ```

mod config;
mod destination;
mod destination_fn;
mod registry;

#[cfg(feature = "logging")]
mod embedded;

pub use config::DestinationConfig;
pub use destination::{Destination, DestinationRef, InitStatus};
pub use destination_fn::DestinationFn;
pub use registry::Registry;

#[cfg(feature = "logging")]
pub use embedded::LogDestination;
