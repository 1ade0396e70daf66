//! # Registry
//!
//! Process-wide plugin registry: per-name callback slots, global write/log
//! subscriber lists, and the schema catalog.
//!
//! The registry is an explicit context object injected into the dispatcher and
//! scheduler, never ambient global state, so multiple independent instances
//! can coexist under test.
//!
//! ## Locking discipline
//!
//! One `RwLock` guards all tables. Registration and unregistration take the
//! write lock; iteration (scheduler ticks, dispatch fan-out) clones `Arc`
//! handles out under the read lock and invokes callbacks with the lock
//! released, so a slow or reentrant callback cannot block registration
//! changes or other concurrent dispatches.

mod read_slot;
mod registry;

pub use read_slot::ReadRegistration;
pub use registry::{ConfigKind, PluginRegistry};
