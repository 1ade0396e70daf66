//! Built-in sink implementations
//!
//! Contains LogWriter and LogNotifier, which forward dispatched data to the
//! tracing pipeline. External sinks (round-robin databases, network transports)
//! implement the same traits out of tree.

mod log;

pub use self::log::{LogNotifier, LogWriter};
