//! # Walker configuration.
//!
//! Provides [`Config`], the bus-wide settings passed to
//! [`Walker::builder`](crate::Walker::builder), and [`GoConfig`], the argument
//! of the [`Walker::go`](crate::Walker::go) entry point.
//!
//! ## Sentinel values
//! - `layer_capacity = 0` → unbounded layer buffer

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::destinations::DestinationRef;

/// Bus-wide configuration.
///
/// ## Field semantics
/// - `layer_capacity`: maximum number of entries kept in the layer buffer (`0` = unbounded)
/// - `replay_predefined`: forward entries appended before the first attachment
///
/// Deserializable from any serde format; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of entries retained in the layer buffer.
    ///
    /// - `0` = unbounded
    /// - `n > 0` = oldest entries are evicted past `n`
    pub layer_capacity: usize,

    /// Replay layer entries that were appended before the walker attached.
    ///
    /// Replay happens once, on the first attachment, in append order.
    pub replay_predefined: bool,
}

impl Config {
    /// Returns the layer buffer limit as an `Option`.
    ///
    /// - `None` → unbounded
    /// - `Some(n)` → at most `n` entries retained
    #[inline]
    pub fn layer_limit(&self) -> Option<usize> {
        if self.layer_capacity == 0 {
            None
        } else {
            Some(self.layer_capacity)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `layer_capacity = 0` (unbounded)
    /// - `replay_predefined = false` (pre-attachment entries stay in the buffer only)
    fn default() -> Self {
        Self {
            layer_capacity: 0,
            replay_predefined: false,
        }
    }
}

/// Argument of [`Walker::go`](crate::Walker::go).
///
/// - With `project_id`: the project loader is invoked and nothing else happens.
/// - Without: `destination` (if any) is registered and a run starts.
#[derive(Clone, Default)]
pub struct GoConfig {
    pub project_id: Option<String>,
    pub destination: Option<DestinationRef>,
}

impl GoConfig {
    /// Load a remote project instead of setting up locally.
    pub fn project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            destination: None,
        }
    }

    /// Register `destination` and start a run.
    pub fn with_destination(destination: DestinationRef) -> Self {
        Self {
            project_id: None,
            destination: Some(destination),
        }
    }
}

impl fmt::Debug for GoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoConfig")
            .field("project_id", &self.project_id)
            .field("destination", &self.destination.as_ref().map(|d| d.name()))
            .finish()
    }
}
