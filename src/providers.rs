//! # External collaborators consumed by the walker.
//!
//! The bus treats these as opaque capabilities. Each has a default
//! implementation so a [`Walker`](crate::Walker) works out of the box.
//!
//! | Trait                | Called                          | Default          |
//! |----------------------|---------------------------------|------------------|
//! | [`Clock`]            | every dispatch, every run start | [`SystemClock`]  |
//! | [`IdGenerator`]      | at build and every run start    | [`RandomId`]     |
//! | [`GlobalsProvider`]  | every run start                 | [`StaticGlobals`]|
//! | [`HandlerRegistrar`] | every run start                 | none             |
//! | [`ProjectLoader`]    | `go` with a project id          | none             |

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::core::Walker;
use crate::events::Data;

/// Wall-clock and monotonic time source.
pub trait Clock: Send + Sync + 'static {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;

    /// Monotonic time since an arbitrary fixed origin.
    fn elapsed(&self) -> Duration;
}

/// [`Clock`] backed by `SystemTime` and `Instant`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis().min(i64::MAX as u128) as i64)
            .unwrap_or(0)
    }

    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Source of run group identifiers.
pub trait IdGenerator: Send + Sync + 'static {
    fn generate(&self) -> String;
}

/// Random lowercase alphanumeric identifiers.
#[derive(Debug, Clone, Copy)]
pub struct RandomId {
    len: usize,
}

impl RandomId {
    /// Identifier length used by default.
    pub const DEFAULT_LEN: usize = 6;

    /// Generator producing `len` characters (minimum 1).
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self { len: len.max(1) }
    }
}

impl Default for RandomId {
    fn default() -> Self {
        Self::with_len(Self::DEFAULT_LEN)
    }
}

impl IdGenerator for RandomId {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.len)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect()
    }
}

/// Source of global properties, snapshotted once per run.
pub trait GlobalsProvider: Send + Sync + 'static {
    fn globals(&self) -> Data;
}

/// Fixed set of global properties.
#[derive(Debug, Clone, Default)]
pub struct StaticGlobals(pub Data);

impl GlobalsProvider for StaticGlobals {
    fn globals(&self) -> Data {
        self.0.clone()
    }
}

impl<F> GlobalsProvider for F
where
    F: Fn() -> Data + Send + Sync + 'static,
{
    fn globals(&self) -> Data {
        self()
    }
}

/// Registers external event producers; called on every run start.
///
/// Implementations typically keep a clone of the walker and call
/// [`Walker::push`] whenever their event source fires.
pub trait HandlerRegistrar: Send + Sync + 'static {
    fn register(&self, walker: &Walker);
}

impl<F> HandlerRegistrar for F
where
    F: Fn(&Walker) + Send + Sync + 'static,
{
    fn register(&self, walker: &Walker) {
        self(walker)
    }
}

/// Loads a remote project configuration by identifier.
pub trait ProjectLoader: Send + Sync + 'static {
    fn load(&self, project_id: &str, walker: &Walker);
}

impl<F> ProjectLoader for F
where
    F: Fn(&str, &Walker) + Send + Sync + 'static,
{
    fn load(&self, project_id: &str, walker: &Walker) {
        self(project_id, walker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_have_requested_shape() {
        let id = RandomId::default().generate();
        assert_eq!(id.len(), RandomId::DEFAULT_LEN);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_eq!(RandomId::with_len(0).generate().len(), 1);
    }

    #[test]
    fn random_ids_differ() {
        let ids = RandomId::with_len(12);
        assert_ne!(ids.generate(), ids.generate());
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(b >= a);
        assert!(clock.now_millis() > 1_600_000_000_000);
    }
}
