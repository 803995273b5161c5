//! Event data model.
//!
//! This module groups the types that describe what flows through the bus.
//!
//! ## Contents
//! - [`EventRecord`] canonical stamped record delivered to destinations
//! - [`EventName`] parser for the raw `"entity action"` string
//! - [`User`] additive user identity store
//! - [`Data`], [`Nested`] payload aliases over `serde_json`

mod event;
mod name;
mod user;

pub use event::{Data, EventRecord, Nested, coarse_timing};
pub use name::EventName;
pub use user::User;
