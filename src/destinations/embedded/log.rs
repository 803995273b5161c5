//! # LogDestination: simple event printer
//!
//! A minimal destination that writes incoming [`EventRecord`]s through
//! `tracing` at `INFO`. Use it for test or demo.
//!
//! ## Example output
//! ```text
//! INFO walkerbus::event: [page view] id="1700000000000-k3x9qa-1" count=1 trigger="load" timing=0.12
//! INFO walkerbus::event: [product add] id="1700000000512-k3x9qa-2" count=2 trigger="click" timing=0.63 user="u1"
//! ```

use crate::destinations::Destination;
use crate::error::DestinationError;
use crate::events::EventRecord;

/// Event writer destination.
#[derive(Default, Debug)]
pub struct LogDestination;

impl LogDestination {
    /// Construct a new [`LogDestination`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Destination for LogDestination {
    fn push(&self, e: EventRecord) -> Result<(), DestinationError> {
        match e.user.id.as_deref() {
            Some(user) => tracing::info!(
                target: "walkerbus::event",
                id = %e.id,
                count = e.count,
                trigger = %e.trigger,
                timing = e.timing,
                user,
                "[{} {}]",
                e.entity,
                e.action
            ),
            None => tracing::info!(
                target: "walkerbus::event",
                id = %e.id,
                count = e.count,
                trigger = %e.trigger,
                timing = e.timing,
                "[{} {}]",
                e.entity,
                e.action
            ),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "LogDestination"
    }
}
