//! # Dispatcher
//!
//! Schema-validating fan-out of value lists and notifications.
//!
//! Responsibilities:
//! - Validate every produced value list against its registered data set
//! - Fill in defaulted time / hostname / interval fields
//! - Fan out to every write subscriber with per-subscriber failure isolation
//! - Fan out notifications to every log subscriber

pub mod dispatcher;
pub mod metrics;
pub mod sinks;

pub use dispatcher::{Dispatcher, DEFAULT_INTERVAL_SECS};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use sinks::{LogNotifier, LogWriter};
