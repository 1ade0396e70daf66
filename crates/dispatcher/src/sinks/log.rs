//! LogWriter / LogNotifier - forward dispatched data to tracing

use contracts::{CoreError, DataSet, Loggable, Notification, Severity, ValueList, Writable};
use tracing::{error, info, warn};

/// Write subscriber that logs a one-line summary of each value list.
///
/// Useful as a debugging sink and as the minimal consumer a bare daemon
/// registers so dispatched data is visible somewhere.
pub struct LogWriter {
    name: String,
}

impl LogWriter {
    /// Create a new LogWriter with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Writable for LogWriter {
    fn write(&self, data_set: &DataSet, values: &ValueList) -> Result<(), CoreError> {
        info!(
            sink = %self.name,
            type_name = %data_set.name,
            host = %values.host,
            plugin = %values.plugin,
            plugin_instance = %values.plugin_instance,
            type_instance = %values.type_instance,
            time = values.time,
            values = ?values.values,
            "value list received"
        );
        Ok(())
    }
}

/// Log subscriber that maps notification severity onto tracing levels.
pub struct LogNotifier {
    name: String,
}

impl LogNotifier {
    /// Create a new LogNotifier with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Loggable for LogNotifier {
    fn log(&self, n: &Notification) -> Result<(), CoreError> {
        match n.severity {
            Severity::Failure => error!(
                sink = %self.name,
                host = %n.host,
                plugin = %n.plugin,
                "{}", n.message
            ),
            Severity::Warning => warn!(
                sink = %self.name,
                host = %n.host,
                plugin = %n.plugin,
                "{}", n.message
            ),
            Severity::Okay => info!(
                sink = %self.name,
                host = %n.host,
                plugin = %n.plugin,
                "{}", n.message
            ),
        }
        Ok(())
    }
}
