//! # Ordered destination registry with isolated, synchronous fan-out.
//!
//! Provides [`Registry`], which delivers every dispatched [`EventRecord`] to
//! each registered destination in registration order.
//!
//! ## Architecture
//! ```text
//! dispatch(&record)
//!     │                  (owned clone per destination)
//!     ├──► entry 1 ──► ensure_ready() ──► push() ──► Err/panic → contained
//!     ├──► entry 2 ──► ensure_ready() ──► push()
//!     └──► entry N ──► not ready      ──► skipped
//! ```
//!
//! ## Rules
//! - **Order**: destinations are visited in registration order
//! - **Append-only**: no removal, no deduplication; registering the same
//!   destination twice delivers every event twice
//! - **Isolation**: an `Err` or panic in one destination never reaches the
//!   caller and never stops delivery to the next one
//! - **Lazy init**: a destination with an initializer is initialized on the
//!   first dispatch that finds it uninitialized, and retried on every dispatch
//!   until it reports ready
//! - **No replay**: events dispatched while a destination is not ready are
//!   never delivered to it later
//! - **Single init in flight**: while `init` runs or its pending future is
//!   polled, other dispatches (re-entrant or from another thread) treat the
//!   destination as not ready instead of starting a second initialization
//! - **Walker-only dispatch**: records reach destinations only through
//!   [`Walker::push`](crate::Walker::push), which stamps them
//!
//! ## Locking
//! Internal locks are released before calling into a destination, so
//! destinations may push new events from inside `push` or `init`.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave a destination's own
//! shared state inconsistent if it panics while holding one of its locks.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::destinations::config::DestinationConfig;
use crate::destinations::destination::{DestinationRef, InitStatus};
use crate::error::DestinationError;
use crate::events::EventRecord;

/// Runs `f`, converting a panic into [`DestinationError::Panicked`].
pub(crate) fn isolate<T>(
    f: impl FnOnce() -> Result<T, DestinationError>,
) -> Result<T, DestinationError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(DestinationError::from_panic(payload)),
    }
}

/// Initialization future kept across dispatches.
type PendingInit = BoxFuture<'static, bool>;

/// Mutable per-destination state.
struct EntryState {
    config: DestinationConfig,
    pending: Option<PendingInit>,
    initializing: bool,
}

/// One registration of a destination.
struct Entry {
    destination: DestinationRef,
    state: Mutex<EntryState>,
}

impl Entry {
    fn deliver(&self, record: &EventRecord) {
        let name = self.destination.name();

        match self.ensure_ready() {
            Ok(true) => {}
            Ok(false) => {
                trace!(destination = name, id = %record.id, "destination not ready, event skipped");
                return;
            }
            Err(err) => {
                debug!(
                    destination = name,
                    id = %record.id,
                    error = err.as_label(),
                    reason = %err.as_message(),
                    "destination init failed"
                );
                return;
            }
        }

        if let Err(err) = isolate(|| self.destination.push(record.clone())) {
            debug!(
                destination = name,
                id = %record.id,
                error = err.as_label(),
                reason = %err.as_message(),
                "destination push failed"
            );
        }
    }

    /// Completes initialization if needed; returns whether the destination
    /// may receive the current event.
    fn ensure_ready(&self) -> Result<bool, DestinationError> {
        if !self.destination.has_init() {
            return Ok(true);
        }

        let pending = {
            let mut state = self.state.lock();
            if state.config.init {
                return Ok(true);
            }
            if state.initializing {
                return Ok(false);
            }
            state.initializing = true;
            state.pending.take()
        };

        let outcome = self.advance_init(pending);

        let mut state = self.state.lock();
        state.initializing = false;
        let (ready, pending) = outcome?;
        state.pending = pending;
        if ready {
            state.config.init = true;
        }
        Ok(ready)
    }

    /// Calls `init` or polls the in-flight initialization once.
    ///
    /// Returns readiness and the future to keep if it is still pending.
    fn advance_init(
        &self,
        pending: Option<PendingInit>,
    ) -> Result<(bool, Option<PendingInit>), DestinationError> {
        let status = match pending {
            Some(fut) => InitStatus::Pending(fut),
            None => isolate(|| self.destination.init())?,
        };

        match status {
            InitStatus::Ready => Ok((true, None)),
            InitStatus::NotReady => Ok((false, None)),
            InitStatus::Pending(mut fut) => match isolate(|| Ok(fut.as_mut().now_or_never()))? {
                Some(ready) => Ok((ready, None)),
                None => Ok((false, Some(fut))),
            },
        }
    }
}

/// Ordered, append-only collection of destinations.
///
/// Only the owning walker dispatches; callers can register and inspect.
///
/// ```compile_fail
/// use walkerbus::{EventRecord, Walker};
///
/// let walker = Walker::default();
/// let forged: EventRecord = serde_json::from_str("{}").unwrap();
/// walker.destinations().dispatch(&forged);
/// ```
#[derive(Default)]
pub struct Registry {
    entries: Mutex<Vec<Arc<Entry>>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a destination.
    ///
    /// `config` defaults to an uninitialized [`DestinationConfig`].
    pub fn add(&self, destination: DestinationRef, config: Option<DestinationConfig>) {
        let name = destination.name().to_string();
        let entry = Arc::new(Entry {
            destination,
            state: Mutex::new(EntryState {
                config: config.unwrap_or_default(),
                pending: None,
                initializing: false,
            }),
        });

        let mut entries = self.entries.lock();
        entries.push(entry);
        debug!(destination = %name, position = entries.len(), "destination registered");
    }

    /// Delivers `record` to every destination, in registration order.
    ///
    /// Destinations registered while this call is in progress do not receive
    /// `record`.
    pub(crate) fn dispatch(&self, record: &EventRecord) {
        let entries: Vec<Arc<Entry>> = self.entries.lock().clone();
        for entry in &entries {
            entry.deliver(record);
        }
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Destination names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|e| e.destination.name().to_string())
            .collect()
    }

    /// Snapshot of the config of the registration at `index`.
    #[must_use]
    pub fn config(&self, index: usize) -> Option<DestinationConfig> {
        let entry = self.entries.lock().get(index).cloned()?;
        let config = entry.state.lock().config.clone();
        Some(config)
    }

    /// Whether the registration at `index` finished initialization.
    #[must_use]
    pub fn is_initialized(&self, index: usize) -> Option<bool> {
        self.config(index).map(|c| c.init)
    }
}
