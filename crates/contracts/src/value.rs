//! Measurement values and value lists.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Maximum identifier length in bytes.
///
/// The bound includes the NUL terminator of the on-wire representation, so the
/// usable content is at most `DATA_MAX_NAME_LEN - 1` bytes.
pub const DATA_MAX_NAME_LEN: usize = 64;

/// Kind of a measurement slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Monotonically increasing count, compared across samples with
    /// wraparound-aware differencing.
    Counter,
    /// Instantaneous reading, directly comparable sample-to-sample.
    Gauge,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Counter => f.write_str("counter"),
            ValueKind::Gauge => f.write_str("gauge"),
        }
    }
}

/// A single measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Counter(u64),
    Gauge(f64),
}

impl Value {
    /// Kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Counter(_) => ValueKind::Counter,
            Value::Gauge(_) => ValueKind::Gauge,
        }
    }
}

/// One timestamped, identified vector of measurements conforming to one schema.
///
/// Value order matches the schema's data-source order. The list is owned by its
/// producer; the dispatcher and subscribers only borrow it for the duration of
/// one dispatch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueList {
    /// Measurements, in schema order.
    pub values: Vec<Value>,
    /// Seconds since epoch; `0` means "fill in at dispatch".
    pub time: u64,
    /// Sampling interval in seconds; `0` means "use the daemon interval".
    pub interval: u64,
    /// Originating host; empty means "fill in the local hostname at dispatch".
    pub host: String,
    /// Producing plugin name.
    pub plugin: String,
    /// Plugin instance (e.g. a device or partition), may be empty.
    pub plugin_instance: String,
    /// Type instance (e.g. a specific sensor), may be empty.
    pub type_instance: String,
}

impl ValueList {
    /// Create a value list with defaulted time, interval and host.
    pub fn new(plugin: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            values,
            time: 0,
            interval: 0,
            host: String::new(),
            plugin: plugin.into(),
            plugin_instance: String::new(),
            type_instance: String::new(),
        }
    }

    /// Set the plugin instance.
    pub fn with_plugin_instance(mut self, instance: impl Into<String>) -> Self {
        self.plugin_instance = instance.into();
        self
    }

    /// Set the type instance.
    pub fn with_type_instance(mut self, instance: impl Into<String>) -> Self {
        self.type_instance = instance.into();
        self
    }

    /// Set the originating host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the timestamp (seconds since epoch).
    pub fn with_time(mut self, time: u64) -> Self {
        self.time = time;
        self
    }

    /// Check every identifier against [`DATA_MAX_NAME_LEN`].
    ///
    /// An over-long identifier is a caller error; the dispatcher rejects the
    /// whole list rather than truncating.
    pub fn check_identifiers(&self) -> Result<(), CoreError> {
        check_name("host", &self.host)?;
        check_name("plugin", &self.plugin)?;
        check_name("plugin_instance", &self.plugin_instance)?;
        check_name("type_instance", &self.type_instance)?;
        Ok(())
    }
}

/// Validate one identifier field against the length bound.
pub fn check_name(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.len() >= DATA_MAX_NAME_LEN {
        return Err(CoreError::NameTooLong {
            field,
            len: value.len(),
            max: DATA_MAX_NAME_LEN - 1,
        });
    }
    Ok(())
}

/// Wraparound-aware difference between two monotonic counter samples.
///
/// `width_bits` is the width of the underlying counter (32 for e.g. SNMP-style
/// 32-bit counters, 64 for native ones). Both samples are masked to that width,
/// so a value that already wrapped in the source is handled uniformly.
pub fn counter_delta(previous: u64, current: u64, width_bits: u32) -> u64 {
    let mask = if width_bits >= 64 {
        u64::MAX
    } else {
        (1u64 << width_bits) - 1
    };
    let prev = previous & mask;
    let curr = current & mask;
    if curr >= prev {
        curr - prev
    } else {
        // Counter wrapped between samples.
        (mask - prev) + curr + 1
    }
}
