//! Bus core: dispatch, commands and run lifecycle.
//!
//! The public API from this module is [`Walker`] (with [`WalkerBuilder`]),
//! its configuration types and the [`Command`] enum.
//!
//! Internal modules:
//! - [`walker`]: push entry point, stamping, run lifecycle, layer attachment;
//! - [`command`]: the reserved `walker` command namespace;
//! - [`state`]: per-run counter, group and globals;
//! - [`builder`]: wiring of collaborators;
//! - [`config`]: bus and entry-point configuration.

mod builder;
mod command;
mod config;
mod state;
mod walker;

pub use builder::WalkerBuilder;
pub use command::{COMMAND_ENTITY, Command};
pub use config::{Config, GoConfig};
pub use walker::Walker;
