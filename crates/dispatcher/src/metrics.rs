//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one dispatcher instance
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Value lists accepted and fanned out
    values_dispatched: AtomicU64,
    /// Value lists rejected (unknown type or count mismatch)
    values_rejected: AtomicU64,
    /// Individual write-subscriber failures
    write_failures: AtomicU64,
    /// Notifications fanned out
    notifications_dispatched: AtomicU64,
    /// Individual log-subscriber failures
    log_failures: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values_dispatched(&self) -> u64 {
        self.values_dispatched.load(Ordering::Relaxed)
    }

    pub fn inc_values_dispatched(&self) {
        self.values_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn values_rejected(&self) -> u64 {
        self.values_rejected.load(Ordering::Relaxed)
    }

    pub fn inc_values_rejected(&self) {
        self.values_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    pub fn inc_write_failures(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn notifications_dispatched(&self) -> u64 {
        self.notifications_dispatched.load(Ordering::Relaxed)
    }

    pub fn inc_notifications_dispatched(&self) {
        self.notifications_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn log_failures(&self) -> u64 {
        self.log_failures.load(Ordering::Relaxed)
    }

    pub fn inc_log_failures(&self) {
        self.log_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            values_dispatched: self.values_dispatched(),
            values_rejected: self.values_rejected(),
            write_failures: self.write_failures(),
            notifications_dispatched: self.notifications_dispatched(),
            log_failures: self.log_failures(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub values_dispatched: u64,
    pub values_rejected: u64,
    pub write_failures: u64,
    pub notifications_dispatched: u64,
    pub log_failures: u64,
}
