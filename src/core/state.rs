//! Per-run state: event counter, group identifier and global snapshot.

use std::time::Duration;

use crate::events::Data;

/// State scoped to one run.
///
/// Reset by every `run`; `count` only grows between resets.
#[derive(Debug, Clone)]
pub(crate) struct RunState {
    pub count: u64,
    pub group: String,
    pub globals: Data,
    /// Clock reading at run start; `timing` is measured from here.
    pub started: Duration,
}

impl RunState {
    pub fn new(group: String, started: Duration) -> Self {
        Self {
            count: 0,
            group,
            globals: Data::new(),
            started,
        }
    }

    /// Starts a new run.
    pub fn reset(&mut self, group: String, globals: Data, started: Duration) {
        self.count = 0;
        self.group = group;
        self.globals = globals;
        self.started = started;
    }

    /// Advances the counter and returns the new 1-based sequence number.
    pub fn next(&mut self) -> u64 {
        self.count += 1;
        self.count
    }
}
