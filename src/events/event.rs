//! # Canonical event record delivered to destinations.
//!
//! An [`EventRecord`] is built once per dispatched (non-command) event by
//! [`Walker::push`](crate::Walker::push) and then cloned for every destination,
//! so each destination owns an independent copy of `data`, `globals`, `user`
//! and `nested`.
//!
//! ## Stamped fields
//! - `count`: 1-based sequence number within the current run
//! - `group`: identifier shared by all events of one run
//! - `timestamp`: wall-clock milliseconds since the epoch
//! - `timing`: seconds since run start, coarsened to two decimals
//! - `id`: `{timestamp}-{group}-{count}`
//!
//! Records are only ever built and stamped inside the walker; callers observe
//! them from a destination.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use walkerbus::{DestinationFn, EventRecord, Walker};
//!
//! let seen: Arc<Mutex<Vec<EventRecord>>> = Arc::default();
//! let sink = Arc::clone(&seen);
//! let walker = Walker::default();
//! walker.add_destination(
//!     DestinationFn::arc("memory", move |ev| {
//!         sink.lock().unwrap().push(ev);
//!         Ok(())
//!     }),
//!     None,
//! );
//! walker.run();
//! walker.push("product view", None, Some("load"), None);
//!
//! let ev = &seen.lock().unwrap()[0];
//! assert_eq!(ev.count, 1);
//! assert_eq!(ev.id, format!("{}-{}-1", ev.timestamp, walker.group()));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::user::User;

/// Free-form event properties.
pub type Data = Map<String, Value>;

/// Nested entities, passed through untouched.
pub type Nested = Vec<Value>;

/// Canonical, stamped representation of one dispatched event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Raw event string as passed to `push`.
    pub event: String,
    /// First token of the event string.
    pub entity: String,
    /// Second token of the event string.
    pub action: String,
    /// Event properties.
    pub data: Data,
    /// Global properties snapshotted at run start.
    pub globals: Data,
    /// User identifiers known at dispatch time.
    pub user: User,
    /// Sub-entities (opaque).
    pub nested: Nested,
    /// `{timestamp}-{group}-{count}`.
    pub id: String,
    /// Caller-supplied provenance tag; empty if none.
    pub trigger: String,
    /// Milliseconds since the Unix epoch at dispatch time.
    pub timestamp: i64,
    /// Seconds since run start, rounded to two decimals.
    pub timing: f64,
    /// Run group identifier.
    pub group: String,
    /// 1-based sequence number within the run.
    pub count: u64,
}

impl EventRecord {
    /// Starts a record for an already parsed event name.
    pub(crate) fn builder(
        event: impl Into<String>,
        entity: impl Into<String>,
        action: impl Into<String>,
    ) -> RecordBuilder {
        RecordBuilder {
            event: event.into(),
            entity: entity.into(),
            action: action.into(),
            data: Data::new(),
            globals: Data::new(),
            user: User::default(),
            nested: Nested::new(),
            trigger: String::new(),
        }
    }
}

/// Collects the caller-provided parts of an [`EventRecord`].
///
/// The identity fields (`id`, `count`, `group`, timing) are only set by
/// [`RecordBuilder::stamp`].
#[derive(Debug, Clone)]
pub(crate) struct RecordBuilder {
    event: String,
    entity: String,
    action: String,
    data: Data,
    globals: Data,
    user: User,
    nested: Nested,
    trigger: String,
}

impl RecordBuilder {
    /// Attaches event properties.
    #[inline]
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    /// Attaches the run's global properties.
    #[inline]
    pub fn with_globals(mut self, globals: Data) -> Self {
        self.globals = globals;
        self
    }

    /// Attaches the user identifiers.
    #[inline]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    /// Attaches nested entities.
    #[inline]
    pub fn with_nested(mut self, nested: Nested) -> Self {
        self.nested = nested;
        self
    }

    /// Attaches a provenance tag.
    #[inline]
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = trigger.into();
        self
    }

    /// Stamps identity and timing metadata and finishes the record.
    pub fn stamp(self, timestamp: i64, timing: f64, group: &str, count: u64) -> EventRecord {
        EventRecord {
            id: format!("{timestamp}-{group}-{count}"),
            event: self.event,
            entity: self.entity,
            action: self.action,
            data: self.data,
            globals: self.globals,
            user: self.user,
            nested: self.nested,
            trigger: self.trigger,
            timestamp,
            timing,
            group: group.to_string(),
            count,
        }
    }
}

/// Converts time since run start into coarse seconds.
///
/// Milliseconds are divided by ten and rounded before scaling, so the result
/// carries two decimals at most.
pub fn coarse_timing(since_start: Duration) -> f64 {
    let ms = since_start.as_secs_f64() * 1000.0;
    (ms / 10.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stamp_builds_id_from_parts() {
        let ev = EventRecord::builder("page view", "page", "view").stamp(42, 0.0, "grp", 3);
        assert_eq!(ev.id, "42-grp-3");
        assert_eq!(ev.group, "grp");
        assert_eq!(ev.count, 3);
        assert_eq!(ev.trigger, "");
        assert!(ev.nested.is_empty());
    }

    #[test]
    fn builder_carries_payload() {
        let mut data = Data::new();
        data.insert("sku".into(), json!("A"));
        let ev = EventRecord::builder("product add", "product", "add")
            .with_data(data.clone())
            .with_nested(vec![json!({"type": "variant"})])
            .with_trigger("click")
            .stamp(1, 0.5, "g", 1);

        assert_eq!(ev.data, data);
        assert_eq!(ev.nested.len(), 1);
        assert_eq!(ev.trigger, "click");
    }

    #[test]
    fn timing_is_coarsened_to_two_decimals() {
        assert_eq!(coarse_timing(Duration::ZERO), 0.0);
        assert_eq!(coarse_timing(Duration::from_millis(1234)), 1.23);
        assert_eq!(coarse_timing(Duration::from_millis(1236)), 1.24);
        assert_eq!(coarse_timing(Duration::from_micros(4_999)), 0.0);
        assert_eq!(coarse_timing(Duration::from_secs(90)), 90.0);
    }

    #[test]
    fn record_serializes_with_field_names() {
        let ev = EventRecord::builder("page view", "page", "view").stamp(7, 0.1, "g", 1);
        let value = serde_json::to_value(&ev).unwrap();
        assert_eq!(value["entity"], json!("page"));
        assert_eq!(value["id"], json!("7-g-1"));
        assert_eq!(value["user"], json!({}));
    }
}
