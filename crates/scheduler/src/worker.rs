//! WorkerSet - cancellable background tasks owned by plugins

use std::sync::{Mutex, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handle to one spawned background worker.
pub struct WorkerHandle {
    name: String,
    handle: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Tracked set of background workers.
///
/// Plugins with blocking sub-work (subprocess, serial line, remote socket)
/// spawn one worker per monitored resource here instead of detaching their own
/// threads, so the scheduler can enumerate and forcibly cancel everything
/// still outstanding at shutdown.
#[derive(Default)]
pub struct WorkerSet {
    workers: Mutex<Vec<WorkerHandle>>,
}

impl WorkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<WorkerHandle>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn and track a named background task.
    pub fn spawn<F>(&self, name: impl Into<String>, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        debug!(worker = %name, "background worker spawned");
        let handle = tokio::spawn(future);
        self.lock().push(WorkerHandle { name, handle });
    }

    /// Names of workers that have not finished yet. Finished handles are
    /// pruned as a side effect.
    pub fn outstanding(&self) -> Vec<String> {
        let mut workers = self.lock();
        workers.retain(|w| !w.is_finished());
        workers.iter().map(|w| w.name.clone()).collect()
    }

    /// Abort every outstanding worker and wait for each to wind down.
    pub async fn shutdown(&self) {
        let workers = std::mem::take(&mut *self.lock());
        for worker in workers {
            if !worker.handle.is_finished() {
                warn!(worker = %worker.name, "aborting outstanding background worker");
                worker.handle.abort();
            }
            match worker.handle.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => {}
                Err(e) => warn!(worker = %worker.name, error = ?e, "worker task panicked"),
            }
        }
    }
}

impl std::fmt::Debug for WorkerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerSet")
            .field("workers", &self.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn finished_workers_are_pruned() {
        let set = WorkerSet::new();
        set.spawn("quick", async {});
        sleep(Duration::from_millis(20)).await;
        assert!(set.outstanding().is_empty());
    }

    #[tokio::test]
    async fn shutdown_aborts_stuck_worker() {
        let set = WorkerSet::new();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        set.spawn("stuck", async move {
            sleep(Duration::from_secs(3600)).await;
            flag.store(true, Ordering::Relaxed);
        });

        assert_eq!(set.outstanding(), vec!["stuck".to_string()]);
        set.shutdown().await;
        assert!(!finished.load(Ordering::Relaxed));
        assert!(set.outstanding().is_empty());
    }
}
