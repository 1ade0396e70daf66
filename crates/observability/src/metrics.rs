//! Runtime metrics recorded through the `metrics` facade.
//!
//! Exported by the Prometheus endpoint when enabled in
//! [`ObservabilityConfig`](crate::ObservabilityConfig).

use metrics::counter;

/// Record one accepted value-list dispatch.
pub fn record_values_dispatched(type_name: &str) {
    counter!(
        "harvestd_values_dispatched_total",
        "type" => type_name.to_string()
    )
    .increment(1);
}

/// Record a rejected dispatch (unknown type or value-count mismatch).
pub fn record_dispatch_rejected(reason: &'static str) {
    counter!(
        "harvestd_values_rejected_total",
        "reason" => reason
    )
    .increment(1);
}

/// Record the outcome of one write-subscriber invocation.
pub fn record_write_result(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "harvestd_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record the outcome of one read-callback invocation.
pub fn record_read_result(plugin: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "harvestd_reads_total",
        "plugin" => plugin.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record one dispatched notification.
pub fn record_notification(severity: &str) {
    counter!(
        "harvestd_notifications_total",
        "severity" => severity.to_string()
    )
    .increment(1);
}
