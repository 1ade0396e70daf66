//! # Integration Tests
//!
//! End-to-end coverage of the collection runtime.
//!
//! Covers:
//! - Schema-gated dispatch with all-or-nothing fan-out
//! - Sink failure isolation
//! - Scheduler lifecycle including destructors and recovery notices
//! - Configuration flowing from a TOML document into plugin callbacks

#[cfg(test)]
mod contract_tests {
    use contracts::{check_name, counter_delta, DATA_MAX_NAME_LEN};

    #[test]
    fn identifier_bound_is_enforced() {
        assert!(check_name("host", &"h".repeat(DATA_MAX_NAME_LEN - 1)).is_ok());
        assert!(check_name("host", &"h".repeat(DATA_MAX_NAME_LEN)).is_err());
    }

    #[test]
    fn counter_delta_handles_wrap() {
        assert_eq!(counter_delta(10, 15, 64), 5);
        // 32-bit counter wrapped past its maximum
        assert_eq!(counter_delta(u32::MAX as u64 - 1, 3, 32), 5);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use contracts::{
        CoreError, DataSet, DataSource, Initializable, Loggable, Notification, Readable,
        Shutdownable, Value, ValueList, Writable,
    };
    use dispatcher::Dispatcher;
    use registry::PluginRegistry;
    use scheduler::{Lifecycle, Scheduler};

    /// Write subscriber that records every list it receives.
    #[derive(Default)]
    struct CountingSink {
        writes: AtomicU64,
        hosts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Writable for CountingSink {
        fn write(&self, _data_set: &DataSet, values: &ValueList) -> Result<(), CoreError> {
            if self.fail {
                return Err(CoreError::sink_write("counting", "socket closed"));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.hosts.lock().unwrap().push(values.host.clone());
            Ok(())
        }
    }

    /// Log subscriber that records notification messages.
    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Loggable for RecordingNotifier {
        fn log(&self, n: &Notification) -> Result<(), CoreError> {
            self.messages.lock().unwrap().push(n.message.clone());
            Ok(())
        }
    }

    /// Read plugin that dispatches one gauge sample per tick.
    struct GaugeSource {
        dispatcher: Arc<Dispatcher>,
        reads: AtomicU64,
    }

    impl Readable for GaugeSource {
        fn read(&self) -> Result<(), CoreError> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            let vl = ValueList::new("load", vec![Value::Gauge(n as f64)]);
            self.dispatcher.dispatch_values("load_avg", &vl)
        }
    }

    /// Read plugin that fails a fixed number of times before recovering.
    struct FlakySource {
        remaining_failures: AtomicU64,
    }

    impl Readable for FlakySource {
        fn read(&self) -> Result<(), CoreError> {
            let left = self.remaining_failures.load(Ordering::SeqCst);
            if left > 0 {
                self.remaining_failures.store(left - 1, Ordering::SeqCst);
                return Err(CoreError::source_read("flaky", "device busy"));
            }
            Ok(())
        }
    }

    /// Counts drops, standing in for a plugin's owned state destructor.
    struct TracedSource {
        drops: Arc<AtomicU64>,
    }

    impl Readable for TracedSource {
        fn read(&self) -> Result<(), CoreError> {
            Ok(())
        }
    }

    impl Drop for TracedSource {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn load_schema() -> DataSet {
        DataSet::new("load_avg", vec![DataSource::gauge("value")])
    }

    #[tokio::test]
    async fn read_to_sink_pipeline_fills_hostname() {
        let registry = Arc::new(PluginRegistry::new());
        registry.register_data_set(load_schema()).unwrap();

        let dispatcher = Arc::new(
            Dispatcher::new(Arc::clone(&registry)).with_hostname("web01"),
        );

        let sink = Arc::new(CountingSink::default());
        registry.register_write("counting", sink.clone());

        let source = Arc::new(GaugeSource {
            dispatcher: Arc::clone(&dispatcher),
            reads: AtomicU64::new(0),
        });
        registry.register_read("load", source.clone());

        let scheduler = Scheduler::new(Arc::clone(&registry), Arc::clone(&dispatcher))
            .with_interval(Duration::from_millis(10));
        scheduler
            .run(tokio::time::sleep(Duration::from_millis(55)))
            .await
            .unwrap();

        assert_eq!(scheduler.state(), Lifecycle::Stopped);
        let writes = sink.writes.load(Ordering::SeqCst);
        assert!(writes >= 2, "expected several ticks, got {writes}");
        // The source left host empty; the dispatcher filled it in.
        for host in sink.hosts.lock().unwrap().iter() {
            assert_eq!(host, "web01");
        }
        assert_eq!(
            dispatcher.metrics().snapshot().values_dispatched,
            writes
        );
    }

    #[tokio::test]
    async fn schema_mismatch_reaches_no_sink() {
        let registry = Arc::new(PluginRegistry::new());
        registry.register_data_set(load_schema()).unwrap();
        let dispatcher = Dispatcher::new(Arc::clone(&registry)).with_hostname("h");

        let sink = Arc::new(CountingSink::default());
        registry.register_write("counting", sink.clone());

        // Two values against a one-source schema
        let vl = ValueList::new("load", vec![Value::Gauge(1.0), Value::Gauge(2.0)]);
        let err = dispatcher.dispatch_values("load_avg", &vl).unwrap_err();
        assert!(matches!(err, CoreError::SchemaMismatch { .. }));

        // Unknown type
        let vl = ValueList::new("load", vec![Value::Gauge(1.0)]);
        let err = dispatcher.dispatch_values("no_such_type", &vl).unwrap_err();
        assert!(matches!(err, CoreError::SchemaNotFound { .. }));

        assert_eq!(sink.writes.load(Ordering::SeqCst), 0);
        assert_eq!(dispatcher.metrics().snapshot().values_rejected, 2);
    }

    #[tokio::test]
    async fn duplicate_schema_registration_is_rejected() {
        let registry = PluginRegistry::new();
        registry.register_data_set(load_schema()).unwrap();
        let err = registry.register_data_set(load_schema()).unwrap_err();
        assert!(matches!(err, CoreError::RegistrationConflict { .. }));
        // The original schema is untouched.
        assert_eq!(registry.get_data_set("load_avg").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failing_sink_does_not_block_others() {
        let registry = Arc::new(PluginRegistry::new());
        registry.register_data_set(load_schema()).unwrap();
        let dispatcher = Dispatcher::new(Arc::clone(&registry)).with_hostname("h");

        let bad = Arc::new(CountingSink {
            fail: true,
            ..Default::default()
        });
        let good = Arc::new(CountingSink::default());
        registry.register_write("bad", bad.clone());
        registry.register_write("good", good.clone());

        let vl = ValueList::new("load", vec![Value::Gauge(0.5)]);
        // The dispatch itself succeeds even though one sink failed.
        dispatcher.dispatch_values("load_avg", &vl).unwrap();

        assert_eq!(good.writes.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.metrics().snapshot().write_failures, 1);
    }

    #[tokio::test]
    async fn recovered_source_emits_okay_notification() {
        let registry = Arc::new(PluginRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)).with_hostname("h"));

        let notifier = Arc::new(RecordingNotifier::default());
        registry.register_log("recorder", notifier.clone());

        let flaky = Arc::new(FlakySource {
            remaining_failures: AtomicU64::new(1),
        });
        registry.register_read("flaky", flaky.clone());

        let scheduler = Scheduler::new(Arc::clone(&registry), Arc::clone(&dispatcher));
        scheduler.init_all().unwrap();
        scheduler.read_all().unwrap(); // fails, arms flood control
        scheduler.read_all().unwrap(); // succeeds, triggers the recovery notice

        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("flaky"));
    }

    #[tokio::test]
    async fn re_registration_replaces_previous_callback() {
        let registry = Arc::new(PluginRegistry::new());
        registry.register_data_set(load_schema()).unwrap();
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)).with_hostname("h"));

        let first = Arc::new(GaugeSource {
            dispatcher: Arc::clone(&dispatcher),
            reads: AtomicU64::new(0),
        });
        let second = Arc::new(GaugeSource {
            dispatcher: Arc::clone(&dispatcher),
            reads: AtomicU64::new(0),
        });
        registry.register_read("load", first.clone());
        registry.register_read("load", second.clone());

        let scheduler = Scheduler::new(Arc::clone(&registry), dispatcher);
        scheduler.init_all().unwrap();
        scheduler.read_all().unwrap();

        assert_eq!(first.reads.load(Ordering::SeqCst), 0);
        assert_eq!(second.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn shutdown_runs_destructors_exactly_once() {
        let registry = Arc::new(PluginRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)).with_hostname("h"));

        let drops = Arc::new(AtomicU64::new(0));
        registry.register_read(
            "traced",
            Arc::new(TracedSource {
                drops: Arc::clone(&drops),
            }),
        );
        // Unknown names are a silent no-op.
        registry.unregister_read("nonexistent");

        let scheduler = Scheduler::new(Arc::clone(&registry), dispatcher);
        scheduler.init_all().unwrap();
        scheduler.shutdown_all().await.unwrap();
        scheduler.shutdown_all().await.unwrap();

        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert!(registry.read_registrations().is_empty());
    }

    #[tokio::test]
    async fn shutdown_aborts_plugin_workers() {
        let registry = Arc::new(PluginRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)).with_hostname("h"));
        let scheduler = Scheduler::new(Arc::clone(&registry), dispatcher);

        // A plugin with a blocking resource parks a worker instead of stalling
        // its read callback.
        let finished = Arc::new(AtomicU64::new(0));
        let flag = Arc::clone(&finished);
        scheduler.workers().spawn("serial-reader", async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            flag.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.init_all().unwrap();
        assert_eq!(scheduler.workers().outstanding(), vec!["serial-reader"]);

        scheduler.shutdown_all().await.unwrap();
        assert!(scheduler.workers().outstanding().is_empty());
        assert_eq!(finished.load(Ordering::SeqCst), 0, "worker was aborted, not run out");
    }

    /// Plugin collecting both lifecycle hooks, used for the config flow below.
    #[derive(Default)]
    struct ConfiguredPlugin {
        options: Mutex<Vec<(String, String)>>,
        inits: AtomicU64,
        shutdowns: AtomicU64,
    }

    impl contracts::Configurable for ConfiguredPlugin {
        fn keys(&self) -> &[&str] {
            &["Interval", "Device"]
        }
        fn configure(&self, key: &str, value: &str) -> Result<(), CoreError> {
            self.options
                .lock()
                .unwrap()
                .push((key.to_string(), value.to_string()));
            Ok(())
        }
    }
    impl Initializable for ConfiguredPlugin {
        fn init(&self) -> Result<(), CoreError> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
    impl Shutdownable for ConfiguredPlugin {
        fn shutdown(&self) -> Result<(), CoreError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn config_file_drives_plugin_lifecycle() {
        let toml_src = r#"
interval_secs = 1

[plugin.disk]
Device = "sda"
Interval = 30
Unknown = "ignored"
"#;
        let config = config_loader::ConfigLoader::load_from_str(
            toml_src,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let registry = Arc::new(PluginRegistry::new());
        let plugin = Arc::new(ConfiguredPlugin::default());
        registry.register_config("disk", plugin.clone()).unwrap();
        registry.register_init("disk", plugin.clone());
        registry.register_shutdown("disk", plugin.clone());

        config_loader::apply_to_registry(&config, &registry);

        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)).with_hostname("h"));
        let scheduler = Scheduler::new(Arc::clone(&registry), dispatcher);
        scheduler.init_all().unwrap();
        scheduler.shutdown_all().await.unwrap();

        let options = plugin.options.lock().unwrap();
        assert_eq!(options.len(), 2, "the unknown option is dropped");
        assert!(options.contains(&("Device".to_string(), "sda".to_string())));
        assert_eq!(plugin.inits.load(Ordering::SeqCst), 1);
        assert_eq!(plugin.shutdowns.load(Ordering::SeqCst), 1);
    }
}
