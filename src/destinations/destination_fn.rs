//! # Function-backed destination (`DestinationFn`)
//!
//! [`DestinationFn`] wraps a closure `F: Fn(EventRecord) -> Result<(), DestinationError>`
//! and, optionally, an initializer closure.
//!
//! ## Example
//! ```rust
//! use walkerbus::{Destination, DestinationFn, DestinationRef, InitStatus};
//!
//! let d: DestinationRef = DestinationFn::arc("printer", |ev| {
//!     println!("{} {}", ev.entity, ev.action);
//!     Ok(())
//! });
//! assert_eq!(d.name(), "printer");
//!
//! let lazy = DestinationFn::new("lazy", |_ev| Ok(())).with_init(|| Ok(InitStatus::Ready));
//! assert!(lazy.has_init());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::destinations::destination::{Destination, InitStatus};
use crate::error::DestinationError;
use crate::events::EventRecord;

type InitFn = Box<dyn Fn() -> Result<InitStatus, DestinationError> + Send + Sync>;

/// Function-backed destination implementation.
pub struct DestinationFn<F> {
    name: Cow<'static, str>,
    push: F,
    init: Option<InitFn>,
}

impl<F> DestinationFn<F>
where
    F: Fn(EventRecord) -> Result<(), DestinationError> + Send + Sync + 'static,
{
    /// Creates a new function-backed destination without initializer.
    ///
    /// Prefer [`DestinationFn::arc`] when you immediately need a [`DestinationRef`](crate::DestinationRef).
    pub fn new(name: impl Into<Cow<'static, str>>, push: F) -> Self {
        Self {
            name: name.into(),
            push,
            init: None,
        }
    }

    /// Creates the destination and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, push: F) -> Arc<Self> {
        Arc::new(Self::new(name, push))
    }

    /// Attaches an initializer; the destination then only receives events
    /// once the initializer reports ready.
    pub fn with_init<I>(mut self, init: I) -> Self
    where
        I: Fn() -> Result<InitStatus, DestinationError> + Send + Sync + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }
}

impl<F> fmt::Debug for DestinationFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationFn")
            .field("name", &self.name)
            .field("has_init", &self.init.is_some())
            .finish()
    }
}

impl<F> Destination for DestinationFn<F>
where
    F: Fn(EventRecord) -> Result<(), DestinationError> + Send + Sync + 'static,
{
    fn push(&self, event: EventRecord) -> Result<(), DestinationError> {
        (self.push)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_init(&self) -> bool {
        self.init.is_some()
    }

    fn init(&self) -> Result<InitStatus, DestinationError> {
        match &self.init {
            Some(init) => init(),
            None => Ok(InitStatus::Ready),
        }
    }
}
