//! # Scheduler
//!
//! Drives the plugin lifecycle on a wall-clock cadence:
//! `Unstarted → (init_all) → Running → (read_all)* → (shutdown_all) → Stopped`.
//!
//! One coordinating task drives `read_all` on a fixed tick; the core never
//! parallelizes read invocations itself. A plugin owning a blocking resource
//! spawns a background worker through the scheduler's [`WorkerSet`] and has
//! its read callback return immediately; the worker dispatches values on
//! completion and is forcibly cancelled at shutdown if still outstanding.

pub mod scheduler;
pub mod worker;

pub use scheduler::{Lifecycle, Scheduler};
pub use worker::{WorkerHandle, WorkerSet};
