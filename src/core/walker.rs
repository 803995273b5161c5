//! # Walker: event normalization and dispatch.
//!
//! The [`Walker`] is the single ingestion point of the bus. It owns the run
//! state, the user identity store, the destination registry and the layer
//! bridge.
//!
//! ## Push flow
//! ```text
//! push(event, data, trigger, nested)
//!   ├─► empty event                 ─► dropped
//!   ├─► EventName::parse fails      ─► dropped
//!   ├─► entity == "walker"          ─► command(Command::parse(action, data))
//!   └─► otherwise
//!         ├─► count += 1 (run state)
//!         ├─► stamp timestamp / timing / id / group / user / globals
//!         └─► Registry::dispatch(&record)  (isolated, registration order)
//! ```
//!
//! ## Run lifecycle
//! ```text
//! run()
//!   ├─► count = 0, group = IdGenerator::generate()
//!   ├─► globals = GlobalsProvider::globals(), timing origin = now
//!   ├─► attach layer (replace interceptor; optional one-time replay)
//!   └─► HandlerRegistrar::register(&walker)
//! ```
//!
//! ## Rules
//! - Nothing is ever returned or raised to the caller of `push`/`go`.
//! - No internal lock is held while calling a destination or a collaborator,
//!   so any of them may call back into the walker.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::builder::WalkerBuilder;
use super::command::{COMMAND_ENTITY, Command};
use super::config::{Config, GoConfig};
use super::state::RunState;
use crate::destinations::{DestinationConfig, DestinationRef, Registry};
use crate::events::{Data, EventName, EventRecord, Nested, User, coarse_timing};
use crate::layer::{Layer, LayerEntry};
use crate::providers::{Clock, GlobalsProvider, HandlerRegistrar, IdGenerator, ProjectLoader};

pub(crate) struct Inner {
    pub(crate) config: Config,
    pub(crate) registry: Registry,
    pub(crate) run: Mutex<RunState>,
    pub(crate) user: Mutex<User>,
    pub(crate) layer: Mutex<Option<Layer>>,
    pub(crate) replayed: AtomicBool,
    pub(crate) catalog: HashMap<String, DestinationRef>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) globals: Arc<dyn GlobalsProvider>,
    pub(crate) handlers: Option<Arc<dyn HandlerRegistrar>>,
    pub(crate) projects: Option<Arc<dyn ProjectLoader>>,
}

/// Handle to one event bus instance.
///
/// Cheap to clone; all clones share the same state. Independent instances
/// are fully isolated from each other.
#[derive(Clone)]
pub struct Walker {
    inner: Arc<Inner>,
}

impl Walker {
    /// Returns a builder for a walker with custom collaborators.
    pub fn builder(cfg: Config) -> WalkerBuilder {
        WalkerBuilder::new(cfg)
    }

    /// Creates a walker with default collaborators.
    pub fn new(cfg: Config) -> Self {
        WalkerBuilder::new(cfg).build()
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Entry point: load a project, or register a destination and run.
    ///
    /// An empty `project_id` counts as absent.
    pub fn go(&self, config: GoConfig) {
        match config.project_id.filter(|id| !id.is_empty()) {
            Some(project_id) => match &self.inner.projects {
                Some(loader) => {
                    debug!(project_id = %project_id, "loading project");
                    loader.load(&project_id, self);
                }
                None => debug!(project_id = %project_id, "no project loader configured"),
            },
            None => {
                if let Some(destination) = config.destination {
                    self.add_destination(destination, None);
                }
                self.run();
            }
        }
    }

    /// Ingests one event.
    ///
    /// `event` must have the shape `"entity action"`; anything else is
    /// silently dropped. `walker` events are interpreted as [`Command`]s.
    pub fn push(
        &self,
        event: &str,
        data: Option<Data>,
        trigger: Option<&str>,
        nested: Option<Nested>,
    ) {
        if event.is_empty() {
            trace!("empty event dropped");
            return;
        }
        let Some(name) = EventName::parse(event) else {
            trace!(event, "malformed event dropped");
            return;
        };

        if name.entity == COMMAND_ENTITY {
            let data = data.unwrap_or_default();
            self.command(Command::parse(name.action, &data));
            return;
        }

        let record = self.stamp(event, name, data, trigger, nested);
        trace!(id = %record.id, count = record.count, "dispatching event");
        self.inner.registry.dispatch(&record);
    }

    /// Shorthand for `push(event, Some(data), None, None)`.
    pub fn push_event(&self, event: &str, data: Data) {
        self.push(event, Some(data), None, None);
    }

    /// Executes a bus command.
    pub fn command(&self, command: Command) {
        debug!(command = command.as_label(), "walker command");
        match command {
            Command::Destination { name, config } => match self.inner.catalog.get(&name) {
                Some(destination) => self.add_destination(Arc::clone(destination), config),
                None => debug!(destination = %name, "unknown destination ignored"),
            },
            Command::Run => self.run(),
            Command::User(update) => self.set_user(&update),
            Command::Unknown(action) => trace!(action = %action, "unknown command ignored"),
        }
    }

    /// Registers a destination at the end of the registry.
    ///
    /// No deduplication: registering the same destination twice delivers
    /// every event to it twice.
    pub fn add_destination(&self, destination: DestinationRef, config: Option<DestinationConfig>) {
        self.inner.registry.add(destination, config);
    }

    /// Starts a new run; restarting while running is a full reset.
    pub fn run(&self) {
        let group = self.inner.ids.generate();
        let globals = self.inner.globals.globals();
        let started = self.inner.clock.elapsed();
        self.inner.run.lock().reset(group.clone(), globals, started);
        debug!(group = %group, "run started");

        self.attach_layer();

        if let Some(handlers) = &self.inner.handlers {
            handlers.register(self);
        }
    }

    /// Merges user identifiers; present fields overwrite, absent ones stay.
    pub fn set_user(&self, update: &User) {
        self.inner.user.lock().merge(update);
    }

    /// The layer bridged into this walker.
    ///
    /// Created on first use if none was provided to the builder.
    pub fn layer(&self) -> Layer {
        self.inner
            .layer
            .lock()
            .get_or_insert_with(Layer::new)
            .clone()
    }

    /// The destination registry.
    pub fn destinations(&self) -> &Registry {
        &self.inner.registry
    }

    /// Current user identifiers.
    pub fn user(&self) -> User {
        self.inner.user.lock().clone()
    }

    /// Number of events dispatched in the current run.
    pub fn count(&self) -> u64 {
        self.inner.run.lock().count
    }

    /// Group identifier of the current run.
    pub fn group(&self) -> String {
        self.inner.run.lock().group.clone()
    }

    /// Global properties snapshotted at the last run start.
    pub fn globals(&self) -> Data {
        self.inner.run.lock().globals.clone()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    fn stamp(
        &self,
        event: &str,
        name: EventName<'_>,
        data: Option<Data>,
        trigger: Option<&str>,
        nested: Option<Nested>,
    ) -> EventRecord {
        let timestamp = self.inner.clock.now_millis();
        let elapsed = self.inner.clock.elapsed();

        let (count, group, globals, started) = {
            let mut run = self.inner.run.lock();
            let count = run.next();
            (count, run.group.clone(), run.globals.clone(), run.started)
        };
        let user = self.inner.user.lock().clone();

        EventRecord::builder(event, name.entity, name.action)
            .with_data(data.unwrap_or_default())
            .with_globals(globals)
            .with_user(user)
            .with_nested(nested.unwrap_or_default())
            .with_trigger(trigger.unwrap_or_default())
            .stamp(
                timestamp,
                coarse_timing(elapsed.saturating_sub(started)),
                &group,
                count,
            )
    }

    /// Installs this walker's interceptor on the layer.
    ///
    /// The replay snapshot is taken before the capacity limit applies, so a
    /// small buffer never loses entries that have not been forwarded yet.
    fn attach_layer(&self) {
        let layer = self.layer();
        let replay = self.inner.config.replay_predefined
            && !self.inner.replayed.swap(true, Ordering::SeqCst);
        let predefined = if replay { layer.entries() } else { Vec::new() };

        layer.set_limit(self.inner.config.layer_limit());

        let weak = Arc::downgrade(&self.inner);
        layer.intercept(Arc::new(move |entry: &LayerEntry| {
            if let Some(inner) = weak.upgrade() {
                Walker { inner }.forward(entry);
            }
        }));
        debug!(buffered = layer.len(), "layer attached");

        if replay {
            debug!(entries = predefined.len(), "replaying predefined layer entries");
            for entry in &predefined {
                self.forward(entry);
            }
        }
    }

    /// Forwards a layer entry; `nested` is not forwarded.
    fn forward(&self, entry: &LayerEntry) {
        self.push(
            &entry.event,
            entry.data.clone(),
            entry.trigger.as_deref(),
            None,
        );
    }
}

impl Default for Walker {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("group", &self.group())
            .field("count", &self.count())
            .field("destinations", &self.inner.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, AtomicUsize};
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::destinations::{DestinationFn, InitStatus};
    use crate::error::DestinationError;

    /// Clock whose readings only move when told to.
    #[derive(Clone, Default)]
    struct ManualClock {
        millis: Arc<AtomicU64>,
    }

    impl ManualClock {
        fn advance(&self, ms: u64) {
            self.millis.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            1_700_000_000_000 + self.millis.load(Ordering::SeqCst) as i64
        }

        fn elapsed(&self) -> Duration {
            Duration::from_millis(self.millis.load(Ordering::SeqCst))
        }
    }

    /// Deterministic group ids: `g0`, `g1`, ...
    #[derive(Default)]
    struct SequenceIds(AtomicUsize);

    impl IdGenerator for SequenceIds {
        fn generate(&self) -> String {
            format!("g{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    type Seen = Arc<Mutex<Vec<EventRecord>>>;

    fn recorder(name: &'static str) -> (DestinationRef, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let dest = DestinationFn::arc(name, move |ev| {
            sink.lock().push(ev);
            Ok(())
        });
        (dest, seen)
    }

    fn walker_with(clock: ManualClock) -> Walker {
        Walker::builder(Config::default())
            .with_clock(clock)
            .with_id_generator(SequenceIds::default())
            .build()
    }

    fn data(v: serde_json::Value) -> Data {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn stamps_records_with_run_identity() {
        let clock = ManualClock::default();
        let walker = walker_with(clock.clone());
        let (dest, seen) = recorder("rec");
        walker.add_destination(dest, None);
        walker.run();

        clock.advance(1_234);
        walker.push("product view", Some(data(json!({"sku": "A"}))), Some("load"), None);
        walker.push("product add", None, None, Some(vec![json!({"type": "size"})]));

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        let first = &seen[0];
        assert_eq!(first.event, "product view");
        assert_eq!(first.entity, "product");
        assert_eq!(first.action, "view");
        assert_eq!(first.data["sku"], json!("A"));
        assert_eq!(first.trigger, "load");
        assert_eq!(first.group, "g1");
        assert_eq!(first.count, 1);
        assert_eq!(first.timestamp, 1_700_000_001_234);
        assert_eq!(first.timing, 1.23);
        assert_eq!(first.id, "1700000001234-g1-1");

        let second = &seen[1];
        assert_eq!(second.count, 2);
        assert_eq!(second.trigger, "");
        assert_eq!(second.nested, vec![json!({"type": "size"})]);
    }

    #[test]
    fn malformed_events_are_noops() {
        let walker = walker_with(ManualClock::default());
        let (dest, seen) = recorder("rec");
        walker.add_destination(dest, None);
        walker.run();

        for event in ["", "badinput", "page ", " view"] {
            walker.push(event, None, None, None);
        }
        assert_eq!(walker.count(), 0);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn commands_are_never_dispatched() {
        let walker = walker_with(ManualClock::default());
        let (dest, seen) = recorder("rec");
        walker.add_destination(dest, None);
        walker.run();

        walker.push("walker user", Some(data(json!({"id": "u1"}))), None, None);
        walker.push("walker teleport", None, None, None);
        walker.push("walker destination", Some(data(json!({"name": "nope"}))), None, None);

        assert_eq!(walker.count(), 0);
        assert!(seen.lock().is_empty());
        assert_eq!(walker.destinations().len(), 1);
        assert_eq!(walker.user(), User::with_id("u1"));
    }

    #[test]
    fn run_resets_counter_and_group() {
        let clock = ManualClock::default();
        let walker = walker_with(clock.clone());
        assert_eq!(walker.group(), "g0");

        walker.run();
        walker.push("page view", None, None, None);
        walker.push("page view", None, None, None);
        assert_eq!(walker.count(), 2);
        let before = walker.group();

        clock.advance(5_000);
        walker.push("walker run", None, None, None);
        assert_eq!(walker.count(), 0);
        assert_ne!(walker.group(), before);

        let (dest, seen) = recorder("rec");
        walker.add_destination(dest, None);
        clock.advance(500);
        walker.push("page view", None, None, None);
        let seen = seen.lock();
        assert_eq!(seen[0].count, 1);
        assert_eq!(seen[0].timing, 0.5);
    }

    #[test]
    fn globals_are_snapshotted_per_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let walker = Walker::builder(Config::default())
            .with_globals(move || {
                let n = c.fetch_add(1, Ordering::SeqCst);
                data(json!({ "run": n }))
            })
            .build();
        let (dest, seen) = recorder("rec");
        walker.add_destination(dest, None);

        walker.run();
        walker.push("page view", None, None, None);
        walker.push("page view", None, None, None);
        walker.run();
        walker.push("page view", None, None, None);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let runs: Vec<_> = seen.lock().iter().map(|e| e.globals["run"].clone()).collect();
        assert_eq!(runs, vec![json!(0), json!(0), json!(1)]);
    }

    #[test]
    fn destinations_get_independent_copies() {
        let walker = walker_with(ManualClock::default());
        walker.set_user(&User::with_id("u1"));
        walker.add_destination(
            DestinationFn::arc("mutator", |mut ev| {
                ev.data.insert("sku".into(), json!("hacked"));
                ev.user.id = Some("evil".into());
                ev.globals.insert("g".into(), json!(true));
                Ok(())
            }),
            None,
        );
        let (dest, seen) = recorder("observer");
        walker.add_destination(dest, None);
        walker.run();

        walker.push_event("product view", data(json!({"sku": "A"})));

        let seen = seen.lock();
        assert_eq!(seen[0].data["sku"], json!("A"));
        assert_eq!(seen[0].user.id.as_deref(), Some("u1"));
        assert!(seen[0].globals.is_empty());
        assert_eq!(walker.user(), User::with_id("u1"));
    }

    #[test]
    fn failing_destination_does_not_block_later_ones() {
        let walker = walker_with(ManualClock::default());
        walker.add_destination(
            DestinationFn::arc("broken", |_ev| Err(DestinationError::fail("down"))),
            None,
        );
        walker.add_destination(DestinationFn::arc("panics", |_ev| panic!("boom")), None);
        let (dest, seen) = recorder("rec");
        walker.add_destination(dest, None);
        walker.run();

        walker.push("page view", None, None, None);
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn lazy_init_gates_delivery() {
        let ready = Arc::new(AtomicBool::new(false));
        let calls = Arc::new(AtomicUsize::new(0));
        let (inner, seen) = recorder("inner");
        let r = Arc::clone(&ready);
        let c = Arc::clone(&calls);
        let dest = DestinationFn::new("lazy", move |ev| inner.push(ev)).with_init(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(InitStatus::from(r.load(Ordering::SeqCst)))
        });

        let walker = walker_with(ManualClock::default());
        walker.add_destination(Arc::new(dest), None);
        walker.run();

        walker.push("page view", None, None, None);
        walker.push("page view", None, None, None);
        ready.store(true, Ordering::SeqCst);
        walker.push("page view", None, None, None);
        walker.push("page view", None, None, None);

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let counts: Vec<u64> = seen.lock().iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![3, 4]);
        assert_eq!(walker.destinations().is_initialized(0), Some(true));
    }

    #[test]
    fn named_destination_command_registers_from_catalog() {
        let (dest, seen) = recorder("gtm");
        let walker = Walker::builder(Config::default())
            .with_named_destination("gtm", dest)
            .build();

        walker.push(
            "walker destination",
            Some(data(json!({"name": "gtm", "config": {"containerId": "GTM-1"}}))),
            None,
            None,
        );
        walker.push("walker run", None, None, None);
        walker.push("page view", None, None, None);

        assert_eq!(walker.destinations().names(), vec!["gtm"]);
        assert_eq!(
            walker.destinations().config(0).map(|c| c.settings["containerId"].clone()),
            Some(json!("GTM-1"))
        );
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn layer_entries_after_attach_are_forwarded_once() {
        let layer = Layer::new();
        layer.push(LayerEntry::new("page early"));

        let walker = Walker::builder(Config::default()).with_layer(layer.clone()).build();
        let (dest, seen) = recorder("rec");
        walker.add_destination(dest, None);
        walker.run();
        walker.run();

        layer.push(
            LayerEntry::new("product view")
                .with_data(data(json!({"sku": "B"})))
                .with_trigger("click")
                .with_nested(vec![json!({"type": "size"})]),
        );

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].entity, "product");
        assert_eq!(seen[0].trigger, "click");
        assert!(seen[0].nested.is_empty());
        assert_eq!(layer.len(), 2);
        assert!(walker.layer().same_as(&layer));
    }

    #[test]
    fn replay_predefined_forwards_earlier_entries_once() {
        let layer = Layer::new();
        layer.push(LayerEntry::new("walker user").with_data(data(json!({"id": "early"}))));
        layer.push(LayerEntry::new("page view"));

        let cfg = Config {
            replay_predefined: true,
            ..Config::default()
        };
        let walker = Walker::builder(cfg).with_layer(layer.clone()).build();
        let (dest, seen) = recorder("rec");
        walker.add_destination(dest, None);
        walker.run();
        walker.run();

        assert_eq!(walker.user(), User::with_id("early"));
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(layer.len(), 2);
    }

    #[test]
    fn handlers_are_registered_every_run_and_may_push() {
        let registrations = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&registrations);
        let walker = Walker::builder(Config::default())
            .with_handlers(move |w: &Walker| {
                r.fetch_add(1, Ordering::SeqCst);
                w.push("page view", None, Some("load"), None);
            })
            .build();
        let (dest, seen) = recorder("rec");
        walker.add_destination(dest, None);

        walker.run();
        walker.run();

        assert_eq!(registrations.load(Ordering::SeqCst), 2);
        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|e| e.count == 1 && e.trigger == "load"));
        assert_ne!(seen[0].group, seen[1].group);
    }

    #[test]
    fn go_with_project_only_loads_project() {
        let loaded = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&loaded);
        let walker = Walker::builder(Config::default())
            .with_project_loader(move |id: &str, _w: &Walker| l.lock().push(id.to_string()))
            .with_id_generator(SequenceIds::default())
            .build();

        walker.go(GoConfig::project("P-123"));
        assert_eq!(*loaded.lock(), vec!["P-123".to_string()]);
        assert_eq!(walker.group(), "g0");
        assert!(walker.destinations().is_empty());
    }

    #[test]
    fn go_without_project_registers_and_runs() {
        let walker = walker_with(ManualClock::default());
        let (dest, seen) = recorder("default");
        walker.go(GoConfig::with_destination(dest));

        assert_eq!(walker.group(), "g1");
        assert!(walker.layer().is_attached());
        walker.push("page view", None, None, None);
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn dropped_walker_detaches_quietly() {
        let layer = Layer::new();
        {
            let walker = Walker::builder(Config::default()).with_layer(layer.clone()).build();
            walker.run();
        }
        assert_eq!(layer.push(LayerEntry::new("page view")), 1);
    }

    #[test]
    fn replay_predefined_survives_a_small_layer_capacity() {
        let layer = Layer::new();
        for n in 0..5 {
            layer.push(LayerEntry::new(format!("page e{n}")));
        }

        let cfg = Config {
            layer_capacity: 2,
            replay_predefined: true,
        };
        let walker = Walker::builder(cfg).with_layer(layer.clone()).build();
        let (dest, seen) = recorder("rec");
        walker.add_destination(dest, None);
        walker.run();

        let actions: Vec<String> = seen.lock().iter().map(|e| e.action.clone()).collect();
        assert_eq!(actions, vec!["e0", "e1", "e2", "e3", "e4"]);
        let kept: Vec<String> = layer.entries().into_iter().map(|e| e.event).collect();
        assert_eq!(kept, vec!["page e3", "page e4"]);
    }

    #[test]
    fn go_with_empty_project_id_registers_and_runs() {
        let loaded = Arc::new(AtomicUsize::new(0));
        let l = Arc::clone(&loaded);
        let walker = Walker::builder(Config::default())
            .with_project_loader(move |_id: &str, _w: &Walker| {
                l.fetch_add(1, Ordering::SeqCst);
            })
            .with_id_generator(SequenceIds::default())
            .build();
        let (dest, seen) = recorder("default");

        walker.go(GoConfig {
            project_id: Some(String::new()),
            destination: Some(dest),
        });
        walker.push("page view", None, None, None);

        assert_eq!(loaded.load(Ordering::SeqCst), 0);
        assert_eq!(walker.group(), "g1");
        assert_eq!(seen.lock().len(), 1);
    }
}
