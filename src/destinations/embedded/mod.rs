//! # Built-in destinations
//!
//! Small, self-contained implementations useful for demos.
//!
//! - [`LogDestination`]: writes every record through `tracing` (demo/debug).

mod log;

pub use log::LogDestination;
