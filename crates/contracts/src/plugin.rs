//! Capability traits plugins implement to participate in the runtime.
//!
//! A plugin is modeled as an optional implementation of each narrow capability
//! rather than a single fat interface; the registry stores, per name, which
//! capabilities are present. All traits are object-safe and synchronous:
//! callback code runs in the calling context, and a plugin owning a blocking
//! resource is expected to offload the work to its own background worker.

use crate::{ConfigItem, CoreError, DataSet, Notification, ValueList};

/// Flat key/value configuration, guarded by a declared allow-list of keys.
pub trait Configurable: Send + Sync {
    /// Accepted option keys, matched case-insensitively.
    fn keys(&self) -> &[&str];

    /// Apply one option. On error the caller logs it, ignores the option and
    /// retains prior state.
    fn configure(&self, key: &str, value: &str) -> Result<(), CoreError>;
}

/// Structured configuration from a parsed tree of typed items.
///
/// Mutually exclusive with [`Configurable`] for the same plugin name.
pub trait TreeConfigurable: Send + Sync {
    fn configure(&self, item: &ConfigItem) -> Result<(), CoreError>;
}

/// One-time initialization, invoked before the first read.
pub trait Initializable: Send + Sync {
    fn init(&self) -> Result<(), CoreError>;
}

/// A data producer polled by the scheduler.
///
/// May call `dispatch_values` / `dispatch_notification` zero or more times per
/// invocation, synchronously or from a worker it owns. Per-plugin state lives
/// in the implementing type; its `Drop` impl is the destructor the runtime
/// guarantees to run exactly once.
pub trait Readable: Send + Sync {
    fn read(&self) -> Result<(), CoreError>;
}

/// A data consumer invoked by the dispatcher for every accepted value list.
///
/// Must not retain the borrowed data beyond the call. The return value is
/// recorded for logging only and never halts fan-out.
pub trait Writable: Send + Sync {
    fn write(&self, data_set: &DataSet, values: &ValueList) -> Result<(), CoreError>;
}

/// A notification consumer invoked by the dispatcher for every notification.
pub trait Loggable: Send + Sync {
    fn log(&self, notification: &Notification) -> Result<(), CoreError>;
}

/// Final teardown, invoked once when the runtime stops.
///
/// Responsible for releasing everything the plugin owns: signaling workers it
/// spawned to stop, closing its own descriptors.
pub trait Shutdownable: Send + Sync {
    fn shutdown(&self) -> Result<(), CoreError>;
}
