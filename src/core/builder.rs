use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use parking_lot::Mutex;

use super::{config::Config, state::RunState, walker::Inner, walker::Walker};
use crate::{
    destinations::{DestinationRef, Registry},
    events::User,
    layer::Layer,
    providers::{
        Clock, GlobalsProvider, HandlerRegistrar, IdGenerator, ProjectLoader, RandomId,
        StaticGlobals, SystemClock,
    },
};

/// Builder for constructing a [`Walker`] with custom collaborators.
pub struct WalkerBuilder {
    cfg: Config,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    globals: Arc<dyn GlobalsProvider>,
    handlers: Option<Arc<dyn HandlerRegistrar>>,
    projects: Option<Arc<dyn ProjectLoader>>,
    layer: Option<Layer>,
    catalog: HashMap<String, DestinationRef>,
}

impl WalkerBuilder {
    /// Creates a new builder with the given configuration and default
    /// collaborators ([`SystemClock`], [`RandomId`], empty [`StaticGlobals`]).
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            clock: Arc::new(SystemClock::new()),
            ids: Arc::new(RandomId::default()),
            globals: Arc::new(StaticGlobals::default()),
            handlers: None,
            projects: None,
            layer: None,
            catalog: HashMap::new(),
        }
    }

    /// Sets the wall-clock / monotonic time source.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Sets the run group identifier source.
    pub fn with_id_generator(mut self, ids: impl IdGenerator) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Sets the global properties source, snapshotted once per run.
    pub fn with_globals(mut self, globals: impl GlobalsProvider) -> Self {
        self.globals = Arc::new(globals);
        self
    }

    /// Sets the registrar invoked on every run start.
    pub fn with_handlers(mut self, handlers: impl HandlerRegistrar) -> Self {
        self.handlers = Some(Arc::new(handlers));
        self
    }

    /// Sets the loader used by `go` when a project id is given.
    pub fn with_project_loader(mut self, loader: impl ProjectLoader) -> Self {
        self.projects = Some(Arc::new(loader));
        self
    }

    /// Uses an existing layer that producers may already be appending to.
    ///
    /// Without one, the first run creates an empty layer.
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Offers a destination under `name` to the `walker destination` command.
    ///
    /// Offering does not register it; the command (or
    /// [`Walker::add_destination`]) does.
    pub fn with_named_destination(
        mut self,
        name: impl Into<String>,
        destination: DestinationRef,
    ) -> Self {
        self.catalog.insert(name.into(), destination);
        self
    }

    /// Builds the walker.
    ///
    /// Generates the initial group identifier. No run is started: call
    /// [`Walker::run`] or [`Walker::go`].
    pub fn build(self) -> Walker {
        let run = RunState::new(self.ids.generate(), self.clock.elapsed());

        Walker::from_inner(Arc::new(Inner {
            config: self.cfg,
            registry: Registry::new(),
            run: Mutex::new(run),
            user: Mutex::new(User::default()),
            layer: Mutex::new(self.layer),
            replayed: AtomicBool::new(false),
            catalog: self.catalog,
            clock: self.clock,
            ids: self.ids,
            globals: self.globals,
            handlers: self.handlers,
            projects: self.projects,
        }))
    }
}
