//! # Core destination trait
//!
//! `Destination` is the extension point for plugging event sinks into the bus.
//! Each registered destination receives its own copy of every dispatched
//! [`EventRecord`], synchronously, in registration order.
//!
//! ## Contract
//! - `push` receives an owned record; mutating it affects nobody else.
//! - Errors and panics from `init`/`push` are contained by the
//!   [`Registry`](crate::destinations::Registry): they never reach the caller
//!   of `push` and never stop delivery to other destinations.
//! - A destination that reports [`has_init`](Destination::has_init) only
//!   receives events once its initialization reported [`InitStatus::Ready`].
//!
//! ## Example (skeleton)
//! ```rust
//! use walkerbus::{Destination, DestinationError, EventRecord, InitStatus};
//!
//! struct Audit;
//!
//! impl Destination for Audit {
//!     fn name(&self) -> &str { "audit" }
//!
//!     fn has_init(&self) -> bool { true }
//!
//!     fn init(&self) -> Result<InitStatus, DestinationError> {
//!         Ok(InitStatus::Ready)
//!     }
//!
//!     fn push(&self, ev: EventRecord) -> Result<(), DestinationError> {
//!         let _ = ev; // write audit record...
//!         Ok(())
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::DestinationError;
use crate::events::EventRecord;

/// Shared handle to a destination (`Arc<dyn Destination>`).
pub type DestinationRef = Arc<dyn Destination>;

/// Outcome of a destination initialization attempt.
pub enum InitStatus {
    /// Destination is ready; it will not be initialized again.
    Ready,
    /// Not ready yet; `init` is called again on the next dispatch.
    NotReady,
    /// Initialization is in flight.
    ///
    /// The registry polls the future once per dispatch without blocking.
    /// `true` marks the destination ready, `false` discards the attempt.
    Pending(BoxFuture<'static, bool>),
}

impl From<bool> for InitStatus {
    fn from(ready: bool) -> Self {
        if ready {
            InitStatus::Ready
        } else {
            InitStatus::NotReady
        }
    }
}

impl fmt::Debug for InitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitStatus::Ready => f.write_str("Ready"),
            InitStatus::NotReady => f.write_str("NotReady"),
            InitStatus::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Contract for event destinations.
///
/// Called synchronously from [`Walker::push`](crate::Walker::push).
/// Implementations should return quickly; hand heavy work to a queue or task
/// of their own.
pub trait Destination: Send + Sync + 'static {
    /// Deliver one event.
    ///
    /// # Parameters
    /// - `event`: owned copy of the record, independent of other destinations
    fn push(&self, event: EventRecord) -> Result<(), DestinationError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether this destination needs [`init`](Destination::init) before
    /// receiving events.
    fn has_init(&self) -> bool {
        false
    }

    /// Attempt initialization.
    ///
    /// Only called while the destination is not yet initialized.
    fn init(&self) -> Result<InitStatus, DestinationError> {
        Ok(InitStatus::Ready)
    }
}
