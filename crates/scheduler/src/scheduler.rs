//! Scheduler - lifecycle state machine and tick loop

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument};

use contracts::{CoreError, Notification, Severity};
use dispatcher::{Dispatcher, DEFAULT_INTERVAL_SECS};
use observability::{complain, record_read_result, relief, Complaint};
use registry::PluginRegistry;

use crate::worker::WorkerSet;

/// Ticks a failing read callback stays quiet between logged complaints.
const READ_COMPLAIN_INTERVAL: u32 = 10;

/// Lifecycle of the runtime. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unstarted,
    Running,
    Stopped,
}

/// Drives registered plugins: init once, read on a wall-clock cadence,
/// shutdown once.
pub struct Scheduler {
    registry: Arc<PluginRegistry>,
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
    state: Mutex<Lifecycle>,
    read_complaints: Mutex<HashMap<String, Complaint>>,
    workers: Arc<WorkerSet>,
}

impl Scheduler {
    pub fn new(registry: Arc<PluginRegistry>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            registry,
            dispatcher,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            state: Mutex::new(Lifecycle::Unstarted),
            read_complaints: Mutex::new(HashMap::new()),
            workers: Arc::new(WorkerSet::new()),
        }
    }

    /// Set the global tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Background workers spawned by plugins; aborted at shutdown.
    pub fn workers(&self) -> &Arc<WorkerSet> {
        &self.workers
    }

    pub fn state(&self) -> Lifecycle {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: Lifecycle) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Invoke every registered init callback once, in registration order.
    ///
    /// An init failure is logged but does not disable the plugin's read
    /// registration; subsequent reads are still attempted.
    #[instrument(name = "scheduler_init_all", skip(self))]
    pub fn init_all(&self) -> Result<(), CoreError> {
        if self.state() != Lifecycle::Unstarted {
            return Err(CoreError::Lifecycle(format!(
                "init_all called in state {:?}",
                self.state()
            )));
        }

        let hooks = self.registry.init_hooks();
        info!(plugins = hooks.len(), "initializing plugins");
        for (name, hook) in hooks {
            if let Err(e) = hook.init() {
                error!(plugin = %name, error = %e, "plugin init failed, reads remain enabled");
            } else {
                debug!(plugin = %name, "plugin initialized");
            }
        }

        self.set_state(Lifecycle::Running);
        Ok(())
    }

    /// Run one tick: invoke every due read registration.
    ///
    /// Simple registrations run every tick; complex registrations only when
    /// their own interval has elapsed since their last successful run. A read
    /// failure is reported through flood control and produces no dispatch this
    /// tick; the next plugin is unaffected.
    #[instrument(name = "scheduler_read_all", skip(self))]
    pub fn read_all(&self) -> Result<(), CoreError> {
        if self.state() != Lifecycle::Running {
            return Err(CoreError::Lifecycle(format!(
                "read_all called in state {:?}",
                self.state()
            )));
        }

        let now = Instant::now();
        for slot in self.registry.read_registrations() {
            if !slot.due(now) {
                continue;
            }
            let plugin = slot.plugin().to_string();
            match slot.callback().read() {
                Ok(()) => {
                    slot.mark_ran(now);
                    record_read_result(&plugin, true);
                    self.relieve_read(&plugin);
                }
                Err(e) => {
                    record_read_result(&plugin, false);
                    self.complain_read(&plugin, &format!("plugin '{plugin}' read failed: {e}"));
                }
            }
        }
        Ok(())
    }

    /// Invoke every registered shutdown callback once (registration order),
    /// then drop all read registrations (running each outstanding destructor
    /// exactly once) and abort any background workers still running.
    ///
    /// A no-op once stopped.
    #[instrument(name = "scheduler_shutdown_all", skip(self))]
    pub async fn shutdown_all(&self) -> Result<(), CoreError> {
        if self.state() == Lifecycle::Stopped {
            return Ok(());
        }
        self.set_state(Lifecycle::Stopped);

        let hooks = self.registry.shutdown_hooks();
        info!(plugins = hooks.len(), "shutting down plugins");
        for (name, hook) in hooks {
            if let Err(e) = hook.shutdown() {
                error!(plugin = %name, error = %e, "plugin shutdown failed");
            }
        }

        let cleared = self.registry.clear_reads();
        debug!(read_slots = cleared, "read registrations cleared");

        self.workers.shutdown().await;
        info!("scheduler stopped");
        Ok(())
    }

    /// Drive the full lifecycle: init, tick until `shutdown` resolves, then
    /// shut down. A read callback performing blocking work stalls the
    /// remainder of its tick; offloading belongs to the plugin.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), CoreError>
    where
        F: Future<Output = ()>,
    {
        self.init_all()?;

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?self.interval, "scheduler running");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.read_all()?;
                }
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
            }
        }

        self.shutdown_all().await
    }

    fn complain_read(&self, plugin: &str, message: &str) {
        let mut map = self
            .read_complaints
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let state = map
            .entry(plugin.to_string())
            .or_insert_with(|| Complaint::new(READ_COMPLAIN_INTERVAL));
        complain(Severity::Failure, state, message);
    }

    /// Emit a one-shot recovery notice once a previously failing source reads
    /// successfully again.
    fn relieve_read(&self, plugin: &str) {
        let recovered = {
            let mut map = self
                .read_complaints
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match map.get_mut(plugin) {
                Some(state) => relief(
                    Severity::Okay,
                    state,
                    &format!("plugin '{plugin}' read callback is healthy again"),
                ),
                None => false,
            }
        };
        if recovered {
            let notice = Notification::new(
                Severity::Okay,
                format!("plugin '{plugin}' recovered"),
            )
            .with_plugin(plugin);
            // Best effort: the recovery notice must not fail the tick.
            let _ = self.dispatcher.dispatch_notification(&notice);
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("interval", &self.interval)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
