//! Read registrations and their per-registration cadence state.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use contracts::Readable;

/// One registered read callback.
///
/// A complex registration carries its own interval override and tracks its own
/// last successful run, so the scheduler only invokes it once that interval
/// has elapsed. A simple registration runs on every tick.
///
/// The plugin's opaque state is the `Readable` trait object itself; dropping
/// the registration runs its destructor, which ownership guarantees happens
/// exactly once (overwrite, unregistration, or shutdown).
pub struct ReadRegistration {
    plugin: String,
    callback: Arc<dyn Readable>,
    interval: Option<Duration>,
    last_run: Mutex<Option<Instant>>,
}

impl ReadRegistration {
    pub(crate) fn simple(plugin: impl Into<String>, callback: Arc<dyn Readable>) -> Self {
        Self {
            plugin: plugin.into(),
            callback,
            interval: None,
            last_run: Mutex::new(None),
        }
    }

    pub(crate) fn complex(
        plugin: impl Into<String>,
        callback: Arc<dyn Readable>,
        interval: Option<Duration>,
    ) -> Self {
        Self {
            plugin: plugin.into(),
            callback,
            interval,
            last_run: Mutex::new(None),
        }
    }

    /// Plugin name this registration belongs to.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Interval override, if this is a complex registration with one.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// The registered callback.
    pub fn callback(&self) -> &Arc<dyn Readable> {
        &self.callback
    }

    /// Whether this registration is due at `now`.
    ///
    /// Registrations without an interval override follow the global tick. A
    /// never-run complex registration is due immediately.
    pub fn due(&self, now: Instant) -> bool {
        let Some(interval) = self.interval else {
            return true;
        };
        let last = self
            .last_run
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match *last {
            None => true,
            Some(at) => now.duration_since(at) >= interval,
        }
    }

    /// Record a successful invocation. Failed reads are not recorded, so a
    /// failing complex registration is retried on the next tick.
    pub fn mark_ran(&self, now: Instant) {
        let mut last = self
            .last_run
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *last = Some(now);
    }
}

impl std::fmt::Debug for ReadRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadRegistration")
            .field("plugin", &self.plugin)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
