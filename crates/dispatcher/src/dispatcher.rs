//! Dispatcher - validated fan-out to write and log subscribers

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, instrument, warn};

use contracts::{CoreError, Notification, Severity, ValueList};
use observability::{
    complain, record_dispatch_rejected, record_notification, record_values_dispatched,
    record_write_result, relief, Complaint,
};
use registry::PluginRegistry;

use crate::metrics::DispatchMetrics;

/// Dispatch attempts a schema error stays quiet between logged complaints.
const SCHEMA_COMPLAIN_INTERVAL: u32 = 10;
/// Dispatches a failing sink stays quiet between logged complaints.
const SINK_COMPLAIN_INTERVAL: u32 = 10;

/// Fallback when the daemon interval was never configured.
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Validates produced value lists against the schema catalog and fans them out
/// to every registered write subscriber; fans notifications out to every log
/// subscriber.
///
/// Both dispatch calls are synchronous: subscriber code runs in the calling
/// context. The subscriber list is snapshotted under the registry lock and
/// invoked with the lock released, so a slow or reentrant subscriber cannot
/// block registration changes or other concurrent dispatches.
pub struct Dispatcher {
    registry: Arc<PluginRegistry>,
    hostname: String,
    default_interval: u64,
    metrics: DispatchMetrics,
    schema_complaints: Mutex<HashMap<String, Complaint>>,
    sink_complaints: Mutex<HashMap<String, Complaint>>,
}

impl Dispatcher {
    /// Create a dispatcher over the given registry.
    ///
    /// The local hostname is resolved once, here, and substituted for empty
    /// `host` fields at dispatch time.
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());
        Self {
            registry,
            hostname,
            default_interval: DEFAULT_INTERVAL_SECS,
            metrics: DispatchMetrics::new(),
            schema_complaints: Mutex::new(HashMap::new()),
            sink_complaints: Mutex::new(HashMap::new()),
        }
    }

    /// Override the substituted hostname (configuration wins over resolution).
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Override the interval substituted for `interval == 0`.
    pub fn with_default_interval(mut self, secs: u64) -> Self {
        self.default_interval = secs;
        self
    }

    /// Hostname substituted into dispatched data.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Counters for this dispatcher instance.
    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Validate `values` against the data set registered for `type_name` and
    /// deliver it to every write subscriber.
    ///
    /// Rejection (unknown type, value-count mismatch, over-long identifier)
    /// drops the list without forwarding partial data. Subscriber failures are
    /// logged and skipped; once every subscriber has been attempted the call
    /// succeeds regardless of individual outcomes.
    #[instrument(name = "dispatch_values", skip(self, values), fields(type_name))]
    pub fn dispatch_values(&self, type_name: &str, values: &ValueList) -> Result<(), CoreError> {
        values.check_identifiers().inspect_err(|e| {
            self.metrics.inc_values_rejected();
            record_dispatch_rejected("identifier");
            warn!(type_name, error = %e, "value list rejected");
        })?;

        let Some(data_set) = self.registry.get_data_set(type_name) else {
            self.metrics.inc_values_rejected();
            record_dispatch_rejected("schema_not_found");
            self.complain_schema(
                type_name,
                &format!("no data set registered for type '{type_name}', dropping value list"),
            );
            return Err(CoreError::SchemaNotFound {
                type_name: type_name.to_string(),
            });
        };

        if values.values.len() != data_set.len() {
            self.metrics.inc_values_rejected();
            record_dispatch_rejected("schema_mismatch");
            self.complain_schema(
                type_name,
                &format!(
                    "type '{type_name}' expects {} values, got {}, dropping value list",
                    data_set.len(),
                    values.values.len()
                ),
            );
            return Err(CoreError::SchemaMismatch {
                type_name: type_name.to_string(),
                expected: data_set.len(),
                actual: values.values.len(),
            });
        }

        let values = self.normalize_values(values);
        let subscribers = self.registry.write_subscribers();
        debug!(
            type_name,
            plugin = %values.plugin,
            subscribers = subscribers.len(),
            "value list accepted"
        );

        for (sink_name, sink) in subscribers {
            match sink.write(&data_set, &values) {
                Ok(()) => {
                    record_write_result(&sink_name, true);
                    self.relieve_sink(&sink_name);
                }
                Err(e) => {
                    self.metrics.inc_write_failures();
                    record_write_result(&sink_name, false);
                    self.complain_sink(&sink_name, &format!("sink '{sink_name}' write failed: {e}"));
                }
            }
        }

        self.metrics.inc_values_dispatched();
        record_values_dispatched(type_name);
        Ok(())
    }

    /// Deliver a notification to every log subscriber with the same fan-out
    /// and isolation semantics as [`dispatch_values`](Self::dispatch_values).
    #[instrument(name = "dispatch_notification", skip(self, notification))]
    pub fn dispatch_notification(&self, notification: &Notification) -> Result<(), CoreError> {
        let notification = self.normalize_notification(notification);

        for (sub_name, sub) in self.registry.log_subscribers() {
            if let Err(e) = sub.log(&notification) {
                self.metrics.inc_log_failures();
                warn!(subscriber = %sub_name, error = %e, "log subscriber failed, skipped");
            }
        }

        self.metrics.inc_notifications_dispatched();
        record_notification(notification.severity.as_str());
        Ok(())
    }

    /// Fill defaulted fields. Borrows unchanged lists, clones only when a
    /// field actually needs substituting.
    fn normalize_values<'a>(&self, values: &'a ValueList) -> Cow<'a, ValueList> {
        if values.time != 0 && values.interval != 0 && !values.host.is_empty() {
            return Cow::Borrowed(values);
        }
        let mut filled = values.clone();
        if filled.time == 0 {
            filled.time = now_epoch();
        }
        if filled.interval == 0 {
            filled.interval = self.default_interval;
        }
        if filled.host.is_empty() {
            filled.host = self.hostname.clone();
        }
        Cow::Owned(filled)
    }

    fn normalize_notification<'a>(&self, n: &'a Notification) -> Cow<'a, Notification> {
        if n.time != 0 && !n.host.is_empty() {
            return Cow::Borrowed(n);
        }
        let mut filled = n.clone();
        if filled.time == 0 {
            filled.time = now_epoch();
        }
        if filled.host.is_empty() {
            filled.host = self.hostname.clone();
        }
        Cow::Owned(filled)
    }

    fn complain_schema(&self, type_name: &str, message: &str) {
        let mut map = self
            .schema_complaints
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let state = map
            .entry(type_name.to_string())
            .or_insert_with(|| Complaint::new(SCHEMA_COMPLAIN_INTERVAL));
        complain(Severity::Failure, state, message);
    }

    fn complain_sink(&self, sink_name: &str, message: &str) {
        let mut map = self
            .sink_complaints
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let state = map
            .entry(sink_name.to_string())
            .or_insert_with(|| Complaint::new(SINK_COMPLAIN_INTERVAL));
        complain(Severity::Failure, state, message);
    }

    fn relieve_sink(&self, sink_name: &str) {
        let mut map = self
            .sink_complaints
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(state) = map.get_mut(sink_name) {
            relief(
                Severity::Okay,
                state,
                &format!("sink '{sink_name}' is healthy again"),
            );
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("hostname", &self.hostname)
            .field("default_interval", &self.default_interval)
            .finish_non_exhaustive()
    }
}

/// Seconds since the Unix epoch.
fn now_epoch() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    use contracts::{DataSet, DataSource, Value, Writable};

    struct RecordingSink {
        calls: AtomicU64,
        last_host: Mutex<Option<String>>,
        fail: bool,
    }

    impl RecordingSink {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU64::new(0),
                last_host: Mutex::new(None),
                fail,
            })
        }
        fn calls(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    impl Writable for RecordingSink {
        fn write(&self, _ds: &DataSet, vl: &ValueList) -> Result<(), CoreError> {
            if self.fail {
                return Err(CoreError::sink_write("recording", "mock failure"));
            }
            self.calls.fetch_add(1, Ordering::Relaxed);
            *self.last_host.lock().unwrap() = Some(vl.host.clone());
            Ok(())
        }
    }

    fn setup() -> (Arc<PluginRegistry>, Dispatcher) {
        let registry = Arc::new(PluginRegistry::new());
        registry
            .register_data_set(DataSet::new(
                "temperature",
                vec![DataSource::gauge("value")],
            ))
            .unwrap();
        let dispatcher = Dispatcher::new(Arc::clone(&registry)).with_hostname("testhost");
        (registry, dispatcher)
    }

    #[test]
    fn unknown_type_is_rejected() {
        let (_registry, dispatcher) = setup();
        let vl = ValueList::new("sensors", vec![Value::Gauge(21.5)]);
        assert!(matches!(
            dispatcher.dispatch_values("no_such_type", &vl),
            Err(CoreError::SchemaNotFound { .. })
        ));
        assert_eq!(dispatcher.metrics().values_rejected(), 1);
    }

    #[test]
    fn count_mismatch_invokes_no_subscriber() {
        let (registry, dispatcher) = setup();
        let sink = RecordingSink::new(false);
        registry.register_write("rec", sink.clone());

        let vl = ValueList::new("sensors", vec![Value::Gauge(1.0), Value::Gauge(2.0)]);
        assert!(matches!(
            dispatcher.dispatch_values("temperature", &vl),
            Err(CoreError::SchemaMismatch { .. })
        ));
        assert_eq!(sink.calls(), 0);
    }

    #[test]
    fn zero_subscribers_still_succeeds() {
        let (_registry, dispatcher) = setup();
        let vl = ValueList::new("sensors", vec![Value::Gauge(21.5)]);
        dispatcher.dispatch_values("temperature", &vl).unwrap();
        assert_eq!(dispatcher.metrics().values_dispatched(), 1);
    }

    #[test]
    fn empty_host_filled_with_local_hostname() {
        let (registry, dispatcher) = setup();
        let sink = RecordingSink::new(false);
        registry.register_write("rec", sink.clone());

        let vl = ValueList::new("sensors", vec![Value::Gauge(42.0)]);
        assert!(vl.host.is_empty());
        dispatcher.dispatch_values("temperature", &vl).unwrap();

        assert_eq!(sink.last_host.lock().unwrap().as_deref(), Some("testhost"));
    }

    #[test]
    fn explicit_host_is_preserved() {
        let (registry, dispatcher) = setup();
        let sink = RecordingSink::new(false);
        registry.register_write("rec", sink.clone());

        let vl = ValueList::new("sensors", vec![Value::Gauge(42.0)]).with_host("elsewhere");
        dispatcher.dispatch_values("temperature", &vl).unwrap();
        assert_eq!(sink.last_host.lock().unwrap().as_deref(), Some("elsewhere"));
    }

    #[test]
    fn zero_time_and_interval_are_filled() {
        let (registry, dispatcher) = setup();

        struct Capture(Mutex<Option<(u64, u64)>>);
        impl Writable for Capture {
            fn write(&self, _ds: &DataSet, vl: &ValueList) -> Result<(), CoreError> {
                *self.0.lock().unwrap() = Some((vl.time, vl.interval));
                Ok(())
            }
        }
        let cap = Arc::new(Capture(Mutex::new(None)));
        registry.register_write("cap", cap.clone());

        let vl = ValueList::new("sensors", vec![Value::Gauge(1.0)]);
        dispatcher.dispatch_values("temperature", &vl).unwrap();

        let (time, interval) = cap.0.lock().unwrap().unwrap();
        assert!(time > 0);
        assert_eq!(interval, DEFAULT_INTERVAL_SECS);
    }

    #[test]
    fn failing_subscriber_does_not_affect_healthy_one() {
        let (registry, dispatcher) = setup();
        let bad = RecordingSink::new(true);
        let good = RecordingSink::new(false);
        registry.register_write("bad", bad.clone());
        registry.register_write("good", good.clone());

        let vl = ValueList::new("sensors", vec![Value::Gauge(1.0)]);
        dispatcher.dispatch_values("temperature", &vl).unwrap();

        assert_eq!(good.calls(), 1);
        assert_eq!(bad.calls(), 0);
        assert_eq!(dispatcher.metrics().write_failures(), 1);
        assert_eq!(dispatcher.metrics().values_dispatched(), 1);
    }

    #[test]
    fn over_long_identifier_rejected_before_lookup() {
        let (_registry, dispatcher) = setup();
        let vl = ValueList::new("p".repeat(200), vec![Value::Gauge(1.0)]);
        assert!(matches!(
            dispatcher.dispatch_values("temperature", &vl),
            Err(CoreError::NameTooLong { .. })
        ));
    }

    #[test]
    fn notification_fan_out_isolates_failures() {
        use contracts::Loggable;

        let (registry, dispatcher) = setup();

        struct CountingLog {
            calls: AtomicU64,
            fail: bool,
        }
        impl Loggable for CountingLog {
            fn log(&self, _n: &Notification) -> Result<(), CoreError> {
                self.calls.fetch_add(1, Ordering::Relaxed);
                if self.fail {
                    return Err(CoreError::Other("mock log failure".into()));
                }
                Ok(())
            }
        }

        let bad = Arc::new(CountingLog {
            calls: AtomicU64::new(0),
            fail: true,
        });
        let good = Arc::new(CountingLog {
            calls: AtomicU64::new(0),
            fail: false,
        });
        registry.register_log("bad", bad.clone());
        registry.register_log("good", good.clone());

        let n = Notification::new(Severity::Warning, "load high").with_plugin("load");
        dispatcher.dispatch_notification(&n).unwrap();

        assert_eq!(bad.calls.load(Ordering::Relaxed), 1);
        assert_eq!(good.calls.load(Ordering::Relaxed), 1);
        assert_eq!(dispatcher.metrics().log_failures(), 1);
    }
}
