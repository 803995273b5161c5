//! # Layer: external append-only queue bridged into the walker.
//!
//! Producers may start appending to a [`Layer`] before any
//! [`Walker`](crate::Walker) exists. When a run starts, the walker *attaches*
//! to the layer by installing an interceptor on its append operation.
//!
//! ## Architecture
//! ```text
//! producer ── Layer::push(entry) ──► interceptor? ──► Walker::push(event, data, trigger)
//!                   │
//!                   └──────────────► buffer (append, stays inspectable)
//! ```
//!
//! ## Rules
//! - Entries appended **after** attachment are forwarded once, then appended.
//! - Entries appended **before** attachment are not forwarded, unless the
//!   walker was configured with `replay_predefined`.
//! - `nested` is kept in the buffer but not forwarded.
//! - Re-attaching replaces the interceptor; there is never more than one.
//! - With a capacity limit, the oldest entries are evicted from the buffer.
//!   Forwarding is not affected by eviction.
//!
//! ## Example
//! ```rust
//! use walkerbus::{Layer, LayerEntry};
//!
//! let layer = Layer::new();
//! layer.push(LayerEntry::new("page view").with_trigger("load"));
//! assert_eq!(layer.len(), 1);
//! assert!(!layer.is_attached());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::events::{Data, Nested};

/// Callback installed by an attached walker.
pub(crate) type Interceptor = Arc<dyn Fn(&LayerEntry) + Send + Sync>;

/// One appended call: the positional arguments of a push.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<Nested>,
}

impl LayerEntry {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = Some(data);
        self
    }

    #[inline]
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    #[inline]
    pub fn with_nested(mut self, nested: Nested) -> Self {
        self.nested = Some(nested);
        self
    }
}

struct LayerInner {
    entries: Mutex<VecDeque<LayerEntry>>,
    interceptor: Mutex<Option<Interceptor>>,
    /// `0` = unbounded.
    capacity: AtomicUsize,
}

/// Shared append-only buffer of push calls.
///
/// Cheap to clone; all clones refer to the same buffer.
#[derive(Clone)]
pub struct Layer {
    inner: Arc<LayerInner>,
}

impl Layer {
    /// Creates an empty, unbounded, unattached layer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LayerInner {
                entries: Mutex::new(VecDeque::new()),
                interceptor: Mutex::new(None),
                capacity: AtomicUsize::new(0),
            }),
        }
    }

    /// Appends an entry, forwarding it first if a walker is attached.
    ///
    /// Returns the buffer length after the append.
    pub fn push(&self, entry: LayerEntry) -> usize {
        let interceptor = self.inner.interceptor.lock().clone();
        if let Some(forward) = interceptor {
            forward(&entry);
        }
        self.append(entry)
    }

    /// Snapshot of the buffered entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LayerEntry> {
        self.inner.entries.lock().iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }

    /// True once a walker installed its interceptor.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.interceptor.lock().is_some()
    }

    /// True if both handles refer to the same buffer.
    #[must_use]
    pub fn same_as(&self, other: &Layer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Replaces the interceptor (never composes with a previous one).
    pub(crate) fn intercept(&self, interceptor: Interceptor) {
        *self.inner.interceptor.lock() = Some(interceptor);
    }

    /// Sets the buffer limit (`None` = unbounded) and evicts overflow.
    pub(crate) fn set_limit(&self, limit: Option<usize>) {
        self.inner
            .capacity
            .store(limit.unwrap_or(0), Ordering::Relaxed);
        let mut entries = self.inner.entries.lock();
        Self::evict(&mut entries, limit);
    }

    fn append(&self, entry: LayerEntry) -> usize {
        let limit = match self.inner.capacity.load(Ordering::Relaxed) {
            0 => None,
            n => Some(n),
        };
        let mut entries = self.inner.entries.lock();
        entries.push_back(entry);
        Self::evict(&mut entries, limit);
        entries.len()
    }

    fn evict(entries: &mut VecDeque<LayerEntry>, limit: Option<usize>) {
        if let Some(limit) = limit {
            while entries.len() > limit {
                entries.pop_front();
            }
        }
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("len", &self.len())
            .field("attached", &self.is_attached())
            .finish()
    }
}
